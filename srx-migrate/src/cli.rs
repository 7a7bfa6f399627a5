use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "srx-migrate")]
#[command(about = "Migrate legacy segmentation.conf rule sets to SRX 2.0", version)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    /// Optional TOML configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Convert one legacy file to SRX 2.0.
    Migrate(MigrateArgs),
    /// Parse one legacy file and report what it contains.
    Check(CheckArgs),
    /// Convert many legacy files concurrently.
    Batch(BatchArgs),
    /// Validate an existing SRX file against the SRX 2.0 schema.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Legacy segmentation.conf file.
    pub input: PathBuf,
    /// Output SRX path. Defaults to segmentation.srx next to the input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Require every pattern to compile with the Rust regex engine.
    #[arg(long)]
    pub strict_patterns: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Legacy segmentation.conf file.
    pub input: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Require every pattern to compile with the Rust regex engine.
    #[arg(long)]
    pub strict_patterns: bool,
}

#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// Legacy files, or directories holding a segmentation.conf.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Write all outputs into this directory, named after each input's file stem.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
    /// Worker threads (defaults to one per CPU).
    #[arg(long)]
    pub jobs: Option<usize>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// SRX file to validate.
    pub file: PathBuf,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
