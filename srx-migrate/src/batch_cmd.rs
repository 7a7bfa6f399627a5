use anyhow::{bail, Context, Result};
use srx_migrate::batch::{migrate_all, plan};
use srx_migrate::config::MigrateConfig;
use srx_migrate::migrate::Migrator;
use srx_migrate::report::render_batch;

use crate::cli::{BatchArgs, OutputFormat};
use crate::ExitStatus;

pub fn run_batch(args: BatchArgs, config: &MigrateConfig) -> Result<()> {
    let migrator = Migrator::new(config.legacy_parser()?, config.binding());
    let jobs = plan(
        &args.inputs,
        args.out_dir.as_deref(),
        &config.output_file_name,
    );
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    let report = migrate_all(&migrator, &jobs, args.jobs);

    match args.format {
        OutputFormat::Text => println!("{}", render_batch(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if report.failed > 0 {
        bail!(ExitStatus {
            code: report.exit_code(),
            message: format!(
                "batch failed: {} of {} migrations failed",
                report.failed,
                report.entries.len()
            ),
        });
    }
    Ok(())
}
