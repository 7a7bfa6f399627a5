use std::collections::HashMap;

use serde::Serialize;

use crate::model::RuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub map_rules: usize,
    pub groups: usize,
    pub rules: usize,
    pub breaking_rules: usize,
    pub exception_rules: usize,
    /// Groups referenced by more than one map rule.
    pub shared_groups: usize,
    /// Groups no map rule points at.
    pub unmapped_groups: usize,
}

pub fn summarize(set: &RuleSet) -> MigrationSummary {
    let breaking_rules = set
        .groups
        .iter()
        .flat_map(|g| &g.rules)
        .filter(|r| r.is_breaking)
        .count();
    let rules = set.rule_count();
    let references = set.reference_counts();

    MigrationSummary {
        map_rules: set.map_rules.len(),
        groups: set.groups.len(),
        rules,
        breaking_rules,
        exception_rules: rules - breaking_rules,
        shared_groups: count_groups(set, &references, |refs| refs > 1),
        unmapped_groups: count_groups(set, &references, |refs| refs == 0),
    }
}

pub fn render(summary: MigrationSummary) -> String {
    format!(
        "migrate_summary map_rules={} groups={} rules={} breaking={} exceptions={} shared_groups={} unmapped_groups={}",
        summary.map_rules,
        summary.groups,
        summary.rules,
        summary.breaking_rules,
        summary.exception_rules,
        summary.shared_groups,
        summary.unmapped_groups
    )
}

fn count_groups(
    set: &RuleSet,
    references: &HashMap<&str, usize>,
    keep: impl Fn(usize) -> bool,
) -> usize {
    set.groups
        .iter()
        .filter(|g| keep(references.get(g.name.as_str()).copied().unwrap_or(0)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::{render, summarize, MigrationSummary};
    use crate::model::{BreakRule, LanguageRuleGroup, MapRule, RuleSet};

    #[test]
    fn counts_rules_and_sharing() {
        let set = RuleSet {
            map_rules: vec![MapRule::new("EN.*", "Latin"), MapRule::new("DE.*", "Latin")],
            groups: vec![
                LanguageRuleGroup::new(
                    "Latin",
                    vec![BreakRule::new("Mr\\.", "\\s", false), BreakRule::new("\\.", "\\s", true)],
                ),
                LanguageRuleGroup::new("Spare", vec![BreakRule::new("", "\\n", true)]),
            ],
            ..RuleSet::default()
        };

        assert_eq!(
            summarize(&set),
            MigrationSummary {
                map_rules: 2,
                groups: 2,
                rules: 3,
                breaking_rules: 2,
                exception_rules: 1,
                shared_groups: 1,
                unmapped_groups: 1,
            }
        );
    }

    #[test]
    fn renders_single_line() {
        let line = render(summarize(&RuleSet::default()));
        assert_eq!(
            line,
            "migrate_summary map_rules=0 groups=0 rules=0 breaking=0 exceptions=0 shared_groups=0 unmapped_groups=0"
        );
    }
}
