use std::fmt;
use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use thiserror::Error;

use crate::tree::XmlNode;

/// An XML parse failure together with the 1-based line it was detected on.
///
/// `line` is 0 when the failure happened before any byte was read.
#[derive(Debug)]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "line {}: {}", self.line, self.kind)
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

/// Reasons an XML document can fail to parse into an [`XmlNode`] tree.
#[derive(Debug, Error)]
pub enum ParseErrorKind {
    /// Input XML could not be decoded or tokenized.
    #[error("failed to parse XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// Input bytes were not valid UTF-8 for tag/attribute/text extraction.
    #[error("invalid UTF-8 while parsing XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// Failed to decode text entity or bytes.
    #[error("failed to decode XML text: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    /// Failed to read input file.
    #[error("failed to read XML file: {0}")]
    Io(#[from] std::io::Error),
    /// Structural issue in XML document.
    #[error("malformed XML: {0}")]
    Malformed(String),
}

/// Parse XML bytes into an [`XmlNode`] tree.
///
/// Character content is kept verbatim, whitespace included, and every element
/// records the line of its start tag.
pub fn parse(xml: &[u8]) -> Result<XmlNode, ParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut lines = LineTracker::new(xml);

    build_tree(&mut reader, &mut lines).map_err(|kind| ParseError {
        line: lines.line_at(reader.buffer_position() as usize),
        kind,
    })
}

/// Parse an XML file into an [`XmlNode`] tree.
pub fn parse_file(path: &Path) -> Result<XmlNode, ParseError> {
    let bytes = fs::read(path).map_err(|err| ParseError {
        line: 0,
        kind: ParseErrorKind::Io(err),
    })?;
    parse(&bytes)
}

fn build_tree(
    reader: &mut Reader<&[u8]>,
    lines: &mut LineTracker<'_>,
) -> Result<XmlNode, ParseErrorKind> {
    let mut buf = Vec::new();
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let offset = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let mut node = build_node_start(&e, reader)?;
                node.line = lines.line_at(offset);
                stack.push(node);
            }
            Event::Empty(e) => {
                let mut node = build_node_start(&e, reader)?;
                node.line = lines.line_at(offset);
                attach(&mut stack, &mut root, node)?;
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    let text = e.unescape()?;
                    append_text(current, &text);
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    let text = std::str::from_utf8(e.as_ref())?;
                    append_text(current, text);
                }
            }
            Event::End(_) => {
                let mut node = stack.pop().ok_or_else(|| {
                    ParseErrorKind::Malformed(
                        "encountered closing tag without open tag".to_string(),
                    )
                })?;
                // An explicit end tag with nothing inside is empty content, not absent content.
                if node.text.is_none() && node.children.is_empty() {
                    node.text = Some(String::new());
                }
                if !node.children.is_empty() && !node.has_significant_text() {
                    node.text = None;
                }
                attach(&mut stack, &mut root, node)?;
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ParseErrorKind::Malformed(
            "unclosed element(s) at end of document".to_string(),
        ));
    }

    root.ok_or_else(|| ParseErrorKind::Malformed("no root element found".to_string()))
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), ParseErrorKind> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_none() {
        *root = Some(node);
    } else {
        return Err(ParseErrorKind::Malformed(
            "multiple top-level elements found".to_string(),
        ));
    }
    Ok(())
}

fn append_text(node: &mut XmlNode, text: &str) {
    match &mut node.text {
        Some(existing) => existing.push_str(text),
        None => node.text = Some(text.to_string()),
    }
}

fn build_node_start(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<XmlNode, ParseErrorKind> {
    let tag = qname_to_string(e.name())?;
    let mut node = XmlNode::new(tag);

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = qname_to_string(attr.key)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();
        node.attributes.insert(key, value);
    }

    Ok(node)
}

fn qname_to_string(name: QName<'_>) -> Result<String, ParseErrorKind> {
    Ok(std::str::from_utf8(name.as_ref())?.to_string())
}

/// Converts byte offsets into line numbers, scanning forward only.
struct LineTracker<'a> {
    xml: &'a [u8],
    offset: usize,
    line: usize,
}

impl<'a> LineTracker<'a> {
    fn new(xml: &'a [u8]) -> Self {
        Self {
            xml,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, offset: usize) -> usize {
        let offset = offset.min(self.xml.len());
        if offset < self.offset {
            return 1 + self.xml[..offset].iter().filter(|b| **b == b'\n').count();
        }
        self.line += self.xml[self.offset..offset]
            .iter()
            .filter(|b| **b == b'\n')
            .count();
        self.offset = offset;
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, ParseErrorKind};

    #[test]
    fn rejects_multiple_roots() {
        let err = parse(b"<a/><b/>").expect_err("must fail");
        assert!(matches!(err.kind, ParseErrorKind::Malformed(_)));
        assert_eq!(err.to_string(), "line 1: malformed XML: multiple top-level elements found");
    }

    #[test]
    fn records_start_tag_lines() {
        let node = parse(b"<root>\n  <a/>\n  <b>x</b>\n</root>").expect("parse");
        assert_eq!(node.line, 1);
        assert_eq!(node.get_child("a").map(|n| n.line), Some(2));
        assert_eq!(node.get_child("b").map(|n| n.line), Some(3));
    }

    #[test]
    fn keeps_whitespace_only_text_verbatim() {
        let node = parse(b"<s> </s>").expect("parse");
        assert_eq!(node.text.as_deref(), Some(" "));
    }

    #[test]
    fn explicit_end_tag_yields_empty_text() {
        let node = parse(b"<r><a></a><b/></r>").expect("parse");
        assert_eq!(node.get_child("a").and_then(|n| n.text.as_deref()), Some(""));
        assert_eq!(node.get_child("b").and_then(|n| n.text.as_deref()), None);
    }

    #[test]
    fn reports_line_of_unclosed_document() {
        let err = parse(b"<root>\n<a>\n").expect_err("must fail");
        assert!(err.line >= 2);
    }
}
