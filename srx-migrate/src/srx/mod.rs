//! SRX 2.0 document model.
//!
//! [`SrxDocument`] mirrors the element structure of an SRX 2.0 file one to one:
//! a header with the cascading and format-handle flags, the named language
//! rules, and the language map that links patterns to those rules by name.
//! [`SrxDocument::to_xml_node`] produces the tree the schema binding writes.

pub mod mapper;
pub mod reader;
pub mod schema;

use serde::Serialize;
use srx_xml::XmlNode;

pub use mapper::{map, MappingError};
pub use reader::{load_srx, ReadError};
pub use schema::srx20_schema;

/// Default namespace of SRX 2.0 documents.
pub const SRX_NAMESPACE: &str = "http://www.lisa.org/srx20";
pub const SRX_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SrxDocument {
    pub header: Header,
    pub language_rules: Vec<LanguageRule>,
    pub map_rules: Vec<LanguageMap>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub segment_subflows: bool,
    pub cascade: bool,
    pub format_handles: Vec<FormatHandle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatHandleType {
    Start,
    End,
    Isolated,
}

/// Whether inline codes of one kind belong to the segment before a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatHandle {
    pub kind: FormatHandleType,
    pub include: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageRule {
    pub name: String,
    pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub is_breaking: bool,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageMap {
    pub pattern: String,
    pub rule_name: String,
}

impl FormatHandleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
            Self::Isolated => "isolated",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            "isolated" => Some(Self::Isolated),
            _ => None,
        }
    }
}

impl SrxDocument {
    /// Build the element tree, in the child order SRX 2.0 requires.
    pub fn to_xml_node(&self) -> XmlNode {
        let mut header = XmlNode::new("header")
            .with_attribute("segmentsubflows", yes_no(self.header.segment_subflows))
            .with_attribute("cascade", yes_no(self.header.cascade));
        for handle in &self.header.format_handles {
            header = header.with_child(
                XmlNode::new("formathandle")
                    .with_attribute("type", handle.kind.as_str())
                    .with_attribute("include", yes_no(handle.include)),
            );
        }

        let mut language_rules = XmlNode::new("languagerules");
        for group in &self.language_rules {
            let mut node = XmlNode::new("languagerule").with_attribute("languagerulename", &group.name);
            for rule in &group.rules {
                node = node.with_child(
                    XmlNode::new("rule")
                        .with_attribute("break", yes_no(rule.is_breaking))
                        .with_child(XmlNode::new("beforebreak").with_text(&rule.before))
                        .with_child(XmlNode::new("afterbreak").with_text(&rule.after)),
                );
            }
            language_rules = language_rules.with_child(node);
        }

        let mut map_rules = XmlNode::new("maprules");
        for entry in &self.map_rules {
            map_rules = map_rules.with_child(
                XmlNode::new("languagemap")
                    .with_attribute("languagepattern", &entry.pattern)
                    .with_attribute("languagerulename", &entry.rule_name),
            );
        }

        XmlNode::new("srx")
            .with_attribute("xmlns", SRX_NAMESPACE)
            .with_attribute("version", SRX_VERSION)
            .with_child(header)
            .with_child(
                XmlNode::new("body")
                    .with_child(language_rules)
                    .with_child(map_rules),
            )
    }
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
