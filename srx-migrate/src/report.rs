//! Terminal rendering for command output.

use colored::Colorize;

use crate::batch::BatchReport;
use crate::model::RuleSet;
use crate::summary::{render, MigrationSummary};

/// Render the one-line summary for terminal output.
pub fn render_summary(summary: MigrationSummary) -> String {
    render(summary).cyan().to_string()
}

/// One line per language map, in evaluation order, followed by the groups.
pub fn render_rule_set(set: &RuleSet) -> String {
    let mut out = Vec::new();
    for (index, rule) in set.map_rules.iter().enumerate() {
        out.push(format!(
            "map[{}] pattern={:?} group={}",
            index + 1,
            rule.pattern,
            rule.group
        ));
    }
    let references = set.reference_counts();
    for group in &set.groups {
        let count = references.get(group.name.as_str()).copied().unwrap_or(0);
        let breaking = group.rules.iter().filter(|r| r.is_breaking).count();
        let line = format!(
            "group {} rules={} breaking={} exceptions={} references={}",
            group.name,
            group.rules.len(),
            breaking,
            group.rules.len() - breaking,
            count
        );
        if count == 0 {
            out.push(line.yellow().to_string());
        } else {
            out.push(line);
        }
    }
    out.join("\n")
}

/// One status line per batch entry plus a totals line.
pub fn render_batch(report: &BatchReport) -> String {
    let mut out = Vec::new();
    for entry in &report.entries {
        match (&entry.summary, &entry.failure) {
            (_, Some(failure)) => out.push(
                format!(
                    "FAIL {} stage={} {}",
                    entry.input.display(),
                    failure.stage.as_str(),
                    failure.message
                )
                .red()
                .to_string(),
            ),
            (Some(summary), None) => out.push(format!(
                "{} {} -> {} groups={} map_rules={} rules={}",
                "OK".green(),
                entry.input.display(),
                entry.output.display(),
                summary.groups,
                summary.map_rules,
                summary.rules
            )),
            (None, None) => {}
        }
    }
    out.push(format!(
        "batch_summary succeeded={} failed={}",
        report.succeeded, report.failed
    ));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{render_batch, render_rule_set};
    use crate::batch::{BatchEntry, BatchFailure, BatchReport};
    use crate::migrate::Stage;
    use crate::model::{BreakRule, LanguageRuleGroup, MapRule, RuleSet};

    #[test]
    fn rule_set_lines_follow_map_order() {
        colored::control::set_override(false);
        let set = RuleSet {
            map_rules: vec![MapRule::new("JA.*", "Japanese"), MapRule::new(".*", "Default")],
            groups: vec![
                LanguageRuleGroup::new("Japanese", vec![BreakRule::new("。", "", true)]),
                LanguageRuleGroup::new("Default", vec![BreakRule::new("Mr\\.", "\\s", false)]),
            ],
            ..RuleSet::default()
        };
        let text = render_rule_set(&set);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], r#"map[1] pattern="JA.*" group=Japanese"#);
        assert_eq!(lines[1], r#"map[2] pattern=".*" group=Default"#);
        assert_eq!(
            lines[3],
            "group Default rules=1 breaking=0 exceptions=1 references=1"
        );
    }

    #[test]
    fn batch_lines_name_failed_stage() {
        colored::control::set_override(false);
        let report = BatchReport {
            succeeded: 0,
            failed: 1,
            entries: vec![BatchEntry {
                input: PathBuf::from("bad.conf"),
                output: PathBuf::from("bad.srx"),
                summary: None,
                failure: Some(BatchFailure {
                    stage: Stage::Parse,
                    message: "parse error: boom".to_string(),
                }),
            }],
        };
        let text = render_batch(&report);

        assert!(text.starts_with("FAIL bad.conf stage=parse parse error: boom"));
        assert!(text.ends_with("batch_summary succeeded=0 failed=1"));
    }
}
