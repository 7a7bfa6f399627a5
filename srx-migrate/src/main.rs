use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use srx_migrate::config::MigrateConfig;
use srx_migrate::migrate::MigrationError;

mod batch_cmd;
mod check_cmd;
mod cli;
mod migrate_cmd;
mod validate_cmd;

use cli::{Cli, Command};

/// A failure that carries its own process exit status.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ExitStatus {
    pub code: u8,
    pub message: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = MigrateConfig::load_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;

    match cli.command {
        Command::Migrate(args) => migrate_cmd::run_migrate(args, &config),
        Command::Check(args) => check_cmd::run_check(args, &config),
        Command::Batch(args) => batch_cmd::run_batch(args, &config),
        Command::Validate(args) => validate_cmd::run_validate(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(status) = err.downcast_ref::<ExitStatus>() {
        return status.code;
    }
    if let Some(migration) = err.downcast_ref::<MigrationError>() {
        return migration.exit_code();
    }
    1
}
