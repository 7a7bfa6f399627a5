use anyhow::{Context, Result};
use serde::Serialize;
use srx_migrate::config::MigrateConfig;
use srx_migrate::migrate::Migrator;
use srx_migrate::model::RuleSet;
use srx_migrate::pattern::PatternCheck;
use srx_migrate::report::{render_rule_set, render_summary};
use srx_migrate::summary::{summarize, MigrationSummary};

use crate::cli::{CheckArgs, OutputFormat};

#[derive(Serialize)]
struct CheckReport<'a> {
    summary: MigrationSummary,
    rules: &'a RuleSet,
}

pub fn run_check(args: CheckArgs, config: &MigrateConfig) -> Result<()> {
    let mut config = config.clone();
    if args.strict_patterns {
        config.pattern_check = PatternCheck::Strict;
    }

    let migrator = Migrator::new(config.legacy_parser()?, config.binding());
    let rules = migrator
        .check_file(&args.input)
        .with_context(|| format!("failed to check {}", args.input.display()))?;
    let summary = summarize(&rules);

    match args.format {
        OutputFormat::Text => {
            println!("{}", render_rule_set(&rules));
            println!("{}", render_summary(summary));
        }
        OutputFormat::Json => {
            let report = CheckReport {
                summary,
                rules: &rules,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
