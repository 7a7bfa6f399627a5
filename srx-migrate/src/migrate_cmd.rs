use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use srx_migrate::config::MigrateConfig;
use srx_migrate::migrate::{default_output_path, Migrator};
use srx_migrate::pattern::PatternCheck;
use srx_migrate::report::render_summary;
use srx_migrate::summary::{summarize, MigrationSummary};

use crate::cli::{MigrateArgs, OutputFormat};

#[derive(Serialize)]
struct MigrateReport<'a> {
    input: &'a Path,
    output: &'a Path,
    summary: MigrationSummary,
}

pub fn run_migrate(args: MigrateArgs, config: &MigrateConfig) -> Result<()> {
    let mut config = config.clone();
    if args.strict_patterns {
        config.pattern_check = PatternCheck::Strict;
    }
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input, &config.output_file_name));

    let migrator = Migrator::new(config.legacy_parser()?, config.binding());
    let migration = migrator
        .migrate_file(&args.input, &output)
        .with_context(|| format!("failed to migrate {}", args.input.display()))?;
    let summary = summarize(&migration.rules);

    match args.format {
        OutputFormat::Text => {
            println!("wrote {}", output.display());
            println!("{}", render_summary(summary));
        }
        OutputFormat::Json => {
            let report = MigrateReport {
                input: &args.input,
                output: &output,
                summary,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
