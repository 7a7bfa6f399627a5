//! Format-independent segmentation rule model.
//!
//! A [`RuleSet`] owns its language map and its named rule groups. Map rules
//! refer to groups by name only, so a group shared by several languages exists
//! exactly once. Every sequence is in evaluation order and is never reordered.

use std::collections::HashMap;

use serde::Serialize;

/// A complete segmentation rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    /// Language map in evaluation order: the first matching entry wins.
    pub map_rules: Vec<MapRule>,
    /// Rule groups in the order they were introduced.
    pub groups: Vec<LanguageRuleGroup>,
    pub options: SegmentationOptions,
}

/// Associates a language-code pattern with a rule group, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapRule {
    /// Regular expression matched against a language/locale code.
    pub pattern: String,
    /// Name of the [`LanguageRuleGroup`] to apply.
    pub group: String,
}

/// A named, ordered list of break rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageRuleGroup {
    pub name: String,
    pub rules: Vec<BreakRule>,
}

/// Decides whether a position between `before` and `after` text is a segment
/// boundary. An empty pattern matches unconditionally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakRule {
    pub before: String,
    pub after: String,
    /// `true` inserts a break, `false` suppresses one.
    pub is_breaking: bool,
}

/// Document-level flags. `None` means the source did not state a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentationOptions {
    pub cascade: Option<bool>,
    pub segment_subflows: Option<bool>,
    pub include_starting_tags: Option<bool>,
    pub include_ending_tags: Option<bool>,
    pub include_isolated_tags: Option<bool>,
    /// Version string of the source format, informational only.
    pub version: Option<String>,
}

impl SegmentationOptions {
    pub fn cascade(&self) -> bool {
        self.cascade.unwrap_or(true)
    }

    pub fn segment_subflows(&self) -> bool {
        self.segment_subflows.unwrap_or(true)
    }

    pub fn include_starting_tags(&self) -> bool {
        self.include_starting_tags.unwrap_or(false)
    }

    pub fn include_ending_tags(&self) -> bool {
        self.include_ending_tags.unwrap_or(true)
    }

    pub fn include_isolated_tags(&self) -> bool {
        self.include_isolated_tags.unwrap_or(false)
    }
}

impl BreakRule {
    pub fn new(before: impl Into<String>, after: impl Into<String>, is_breaking: bool) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            is_breaking,
        }
    }
}

impl LanguageRuleGroup {
    pub fn new(name: impl Into<String>, rules: Vec<BreakRule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }
}

impl MapRule {
    pub fn new(pattern: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            group: group.into(),
        }
    }
}

impl RuleSet {
    /// Look up a group by name.
    pub fn group(&self, name: &str) -> Option<&LanguageRuleGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Number of map rules pointing at each group, in one pass over the map.
    /// Groups no map rule points at are absent.
    pub fn reference_counts(&self) -> HashMap<&str, usize> {
        let mut counts = HashMap::with_capacity(self.groups.len());
        for rule in &self.map_rules {
            *counts.entry(rule.group.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Total number of break rules across all groups.
    pub fn rule_count(&self) -> usize {
        self.groups.iter().map(|g| g.rules.len()).sum()
    }
}
