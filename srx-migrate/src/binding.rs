//! Serialization and schema validation of SRX documents.
//!
//! [`SchemaBinding`] is the seam between the migration pipeline and the XML
//! layer. [`XmlSchemaBinding`] writes documents with `srx-xml` and checks them
//! against the embedded SRX 2.0 definition; tests can supply their own
//! binding to inspect the document the mapper produced.

use std::fmt::Write as _;

use srx_xml::{validate, write_document, Violation, WriteError};
use thiserror::Error;

use crate::srx::{srx20_schema, SrxDocument};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error(transparent)]
    Marshal(#[from] WriteError),
    #[error("generated document is not well-formed: {0}")]
    Malformed(#[from] srx_xml::ParseError),
    #[error("{}", render_violations(.0))]
    Violations(Vec<Violation>),
}

impl SchemaError {
    /// Schema violations carried by this error, if any.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Violations(list) => list,
            _ => &[],
        }
    }
}

fn render_violations(violations: &[Violation]) -> String {
    let mut out = format!("{} schema violation(s)", violations.len());
    for violation in violations {
        let _ = write!(out, "\n  {violation}");
    }
    out
}

pub trait SchemaBinding {
    /// Serialize a document to UTF-8 XML bytes.
    fn marshal(&self, document: &SrxDocument) -> Result<Vec<u8>, SchemaError>;

    /// Check serialized bytes against the SRX 2.0 schema.
    fn validate(&self, xml: &[u8]) -> Result<(), SchemaError>;
}

/// Default binding backed by the `srx-xml` writer and schema validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlSchemaBinding {
    pub indent: usize,
}

impl Default for XmlSchemaBinding {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl SchemaBinding for XmlSchemaBinding {
    fn marshal(&self, document: &SrxDocument) -> Result<Vec<u8>, SchemaError> {
        Ok(write_document(&document.to_xml_node(), self.indent)?)
    }

    fn validate(&self, xml: &[u8]) -> Result<(), SchemaError> {
        let root = srx_xml::parse(xml)?;
        let violations = validate(&root, &srx20_schema());
        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Violations(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{SchemaBinding, SchemaError, XmlSchemaBinding};
    use crate::model::{BreakRule, LanguageRuleGroup, MapRule, RuleSet};
    use crate::srx::map;

    #[test]
    fn marshalled_document_validates() {
        let set = RuleSet {
            map_rules: vec![MapRule::new("en.*", "default")],
            groups: vec![LanguageRuleGroup::new(
                "default",
                vec![BreakRule::new(".", "\\s", true), BreakRule::new(" ", "", false)],
            )],
            ..RuleSet::default()
        };
        let binding = XmlSchemaBinding::default();
        let xml = binding.marshal(&map(&set).expect("map")).expect("marshal");
        let text = String::from_utf8(xml.clone()).expect("utf-8");

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<beforebreak> </beforebreak>"));
        assert!(text.contains("<afterbreak></afterbreak>"));
        binding.validate(&xml).expect("valid");
    }

    #[test]
    fn empty_rule_set_is_a_schema_violation() {
        let binding = XmlSchemaBinding::default();
        let xml = binding
            .marshal(&map(&RuleSet::default()).expect("map"))
            .expect("marshal");
        let err = binding.validate(&xml).expect_err("must fail");

        assert!(matches!(err, SchemaError::Violations(_)));
        assert_eq!(err.violations().len(), 2);
        assert!(err.to_string().starts_with("2 schema violation(s)"));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = XmlSchemaBinding::default()
            .validate(b"<srx><body></srx>")
            .expect_err("must fail");
        assert!(matches!(err, SchemaError::Malformed(_)));
    }
}
