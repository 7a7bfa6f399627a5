use std::collections::HashSet;

use thiserror::Error;

use super::{FormatHandle, FormatHandleType, Header, LanguageMap, LanguageRule, Rule, SrxDocument};
use crate::model::RuleSet;

/// A rule set reached the mapper in a state the legacy parser never produces.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("map rule {index} ('{pattern}') references undefined rule group '{group}'")]
    DanglingReference {
        index: usize,
        pattern: String,
        group: String,
    },
    #[error("rule group '{name}' is defined more than once")]
    DuplicateGroup { name: String },
}

/// Flatten a [`RuleSet`] into an SRX document: one `languagerule` per group,
/// one `languagemap` per map rule, both in their original order.
pub fn map(set: &RuleSet) -> Result<SrxDocument, MappingError> {
    let mut names = HashSet::new();
    for group in &set.groups {
        if !names.insert(group.name.as_str()) {
            return Err(MappingError::DuplicateGroup {
                name: group.name.clone(),
            });
        }
    }

    let mut map_rules = Vec::with_capacity(set.map_rules.len());
    for (index, rule) in set.map_rules.iter().enumerate() {
        if !names.contains(rule.group.as_str()) {
            return Err(MappingError::DanglingReference {
                index,
                pattern: rule.pattern.clone(),
                group: rule.group.clone(),
            });
        }
        map_rules.push(LanguageMap {
            pattern: rule.pattern.clone(),
            rule_name: rule.group.clone(),
        });
    }

    let language_rules = set
        .groups
        .iter()
        .map(|group| LanguageRule {
            name: group.name.clone(),
            rules: group
                .rules
                .iter()
                .map(|rule| Rule {
                    is_breaking: rule.is_breaking,
                    before: rule.before.clone(),
                    after: rule.after.clone(),
                })
                .collect(),
        })
        .collect();

    let options = &set.options;
    let header = Header {
        segment_subflows: options.segment_subflows(),
        cascade: options.cascade(),
        format_handles: vec![
            FormatHandle {
                kind: FormatHandleType::Start,
                include: options.include_starting_tags(),
            },
            FormatHandle {
                kind: FormatHandleType::End,
                include: options.include_ending_tags(),
            },
            FormatHandle {
                kind: FormatHandleType::Isolated,
                include: options.include_isolated_tags(),
            },
        ],
    };

    log::debug!(
        "mapped {} language rules and {} language maps",
        set.groups.len(),
        map_rules.len()
    );
    Ok(SrxDocument {
        header,
        language_rules,
        map_rules,
    })
}
