//! Load an SRX 2.0 document back into a [`RuleSet`].

use std::collections::HashSet;

use srx_xml::{validate, Violation, XmlNode};
use thiserror::Error;

use super::{srx20_schema, FormatHandleType};
use crate::model::{BreakRule, LanguageRuleGroup, MapRule, RuleSet, SegmentationOptions};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("malformed SRX document: {0}")]
    Xml(#[from] srx_xml::ParseError),
    #[error("SRX document does not conform to SRX 2.0 ({} violation(s)); first: {}", .0.len(), first(.0))]
    Schema(Vec<Violation>),
    #[error("line {line}: duplicate language rule '{name}'")]
    DuplicateGroup { line: usize, name: String },
    #[error("line {line}: language map references undefined language rule '{name}'")]
    DanglingReference { line: usize, name: String },
}

fn first(violations: &[Violation]) -> String {
    violations
        .first()
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// Parse and validate SRX bytes, then rebuild the rule set they describe.
pub fn load_srx(source: &[u8]) -> Result<RuleSet, ReadError> {
    let root = srx_xml::parse(source)?;
    let violations = validate(&root, &srx20_schema());
    if !violations.is_empty() {
        return Err(ReadError::Schema(violations));
    }
    read_tree(&root)
}

/// Rebuild a rule set from a tree that already passed schema validation.
fn read_tree(root: &XmlNode) -> Result<RuleSet, ReadError> {
    let mut set = RuleSet {
        options: read_header(root.get_child("header")),
        ..RuleSet::default()
    };
    let body = root.get_child("body");

    let mut names = HashSet::new();
    let language_rules = body
        .and_then(|b| b.get_child("languagerules"))
        .map(|l| l.get_children("languagerule"))
        .unwrap_or_default();
    for node in language_rules {
        let name = node.attribute("languagerulename").unwrap_or_default();
        if !names.insert(name.to_string()) {
            return Err(ReadError::DuplicateGroup {
                line: node.line,
                name: name.to_string(),
            });
        }
        let rules = node
            .get_children("rule")
            .into_iter()
            .map(|rule| {
                BreakRule::new(
                    pattern_text(rule, "beforebreak"),
                    pattern_text(rule, "afterbreak"),
                    rule.attribute("break") != Some("no"),
                )
            })
            .collect();
        set.groups.push(LanguageRuleGroup::new(name, rules));
    }

    let map_rules = body
        .and_then(|b| b.get_child("maprules"))
        .map(|m| m.get_children("languagemap"))
        .unwrap_or_default();
    for node in map_rules {
        let name = node.attribute("languagerulename").unwrap_or_default();
        if !names.contains(name) {
            return Err(ReadError::DanglingReference {
                line: node.line,
                name: name.to_string(),
            });
        }
        let pattern = node.attribute("languagepattern").unwrap_or_default();
        set.map_rules.push(MapRule::new(pattern, name));
    }

    Ok(set)
}

fn read_header(header: Option<&XmlNode>) -> SegmentationOptions {
    let mut options = SegmentationOptions::default();
    let Some(header) = header else {
        return options;
    };
    options.cascade = header.attribute("cascade").map(|v| v == "yes");
    options.segment_subflows = header.attribute("segmentsubflows").map(|v| v == "yes");

    for handle in header.get_children("formathandle") {
        let include = handle.attribute("include").map(|v| v == "yes");
        match handle.attribute("type").and_then(FormatHandleType::parse) {
            Some(FormatHandleType::Start) => options.include_starting_tags = include,
            Some(FormatHandleType::End) => options.include_ending_tags = include,
            Some(FormatHandleType::Isolated) => options.include_isolated_tags = include,
            None => {}
        }
    }
    options
}

/// An absent pattern element and an empty one both match unconditionally.
fn pattern_text(rule: &XmlNode, tag: &str) -> String {
    rule.get_child(tag)
        .and_then(|n| n.text.clone())
        .unwrap_or_default()
}
