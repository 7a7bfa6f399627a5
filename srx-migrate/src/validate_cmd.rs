use std::fs;

use anyhow::{bail, Context, Result};
use srx_migrate::report::{render_rule_set, render_summary};
use srx_migrate::srx::{load_srx, ReadError};
use srx_migrate::summary::summarize;

use crate::cli::{OutputFormat, ValidateArgs};
use crate::ExitStatus;

pub fn run_validate(args: ValidateArgs) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("failed to read {}", args.file.display()))?;

    let rules = match load_srx(&bytes) {
        Ok(rules) => rules,
        Err(ReadError::Schema(violations)) => {
            for violation in &violations {
                println!("violation {violation}");
            }
            bail!(ExitStatus {
                code: 4,
                message: format!(
                    "validate failed: {} has {} schema violation(s)",
                    args.file.display(),
                    violations.len()
                ),
            });
        }
        Err(err) => {
            let code = match err {
                ReadError::Xml(_) => 2,
                _ => 4,
            };
            bail!(ExitStatus {
                code,
                message: format!("validate failed: {}: {err}", args.file.display()),
            });
        }
    };

    let summary = summarize(&rules);
    match args.format {
        OutputFormat::Text => {
            println!("{}", render_rule_set(&rules));
            println!("{}", render_summary(summary));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(())
}
