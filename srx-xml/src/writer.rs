use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;

use crate::tree::XmlNode;

/// Errors that can occur while writing XML from an [`XmlNode`] tree.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to serialize XML bytes.
    #[error("failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Output layout for [`write_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` first.
    pub declaration: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            declaration: false,
        }
    }
}

/// Serialize an [`XmlNode`] tree into XML bytes.
pub fn write(node: &XmlNode) -> Result<Vec<u8>, WriteError> {
    write_with(node, WriteOptions::default())
}

/// Serialize an [`XmlNode`] tree into a complete UTF-8 document with an XML
/// declaration and a trailing newline.
pub fn write_document(node: &XmlNode, indent: usize) -> Result<Vec<u8>, WriteError> {
    let mut bytes = write_with(
        node,
        WriteOptions {
            indent,
            declaration: true,
        },
    )?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Serialize an [`XmlNode`] tree with explicit layout options.
///
/// Attributes are written in name order, so equal trees always produce
/// identical bytes.
pub fn write_with(node: &XmlNode, options: WriteOptions) -> Result<Vec<u8>, WriteError> {
    let mut writer = if options.indent == 0 {
        Writer::new(Vec::new())
    } else {
        Writer::new_with_indent(Vec::new(), b' ', options.indent)
    };
    if options.declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(quick_xml::Error::from)?;
        if options.indent == 0 {
            writer.get_mut().push(b'\n');
        }
    }
    write_node(&mut writer, node)?;
    Ok(writer.into_inner())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), quick_xml::Error> {
    let mut start = BytesStart::new(node.tag.as_str());

    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() && node.text.is_none() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;

    // Element content with children gets its whitespace from the indenter.
    if let Some(text) = &node.text {
        if node.children.is_empty() || !text.trim().is_empty() {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
    }

    for child in &node.children {
        write_node(writer, child)?;
    }

    writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
    Ok(())
}
