//! Concurrent migration of many legacy files.
//!
//! Every job runs the full pipeline on its own; jobs share only the
//! read-only [`Migrator`]. Results come back in input order.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::binding::SchemaBinding;
use crate::legacy::LEGACY_FILE_NAME;
use crate::migrate::{default_output_path, Migrator, Stage};
use crate::path_guard::normalize_for_compare;
use crate::summary::{summarize, MigrationSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub stage: Stage,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<MigrationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<BatchFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    /// Exit status of the first failed entry, 0 when all succeeded.
    pub fn exit_code(&self) -> u8 {
        self.entries
            .iter()
            .find_map(|e| e.failure.as_ref())
            .map_or(0, |f| f.stage.exit_code())
    }
}

/// Pair every input with its output path.
///
/// A directory input stands for the legacy rules file inside it. Without
/// `out_dir` each output lands next to its input as `file_name`; with
/// `out_dir` outputs are named after the input's file stem, or after the
/// directory for directory inputs.
pub fn plan(inputs: &[PathBuf], out_dir: Option<&Path>, file_name: &str) -> Vec<BatchJob> {
    inputs
        .iter()
        .map(|given| {
            let input = if given.is_dir() {
                given.join(LEGACY_FILE_NAME)
            } else {
                given.clone()
            };
            let output = match out_dir {
                Some(dir) => {
                    let named_after = if given.is_dir() {
                        given.file_name()
                    } else {
                        given.file_stem()
                    };
                    let stem = named_after
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "segmentation".to_string());
                    dir.join(format!("{stem}.srx"))
                }
                None => default_output_path(&input, file_name),
            };
            BatchJob { input, output }
        })
        .collect()
}

/// Run every job, using at most `threads` worker threads when given.
pub fn migrate_all<B>(migrator: &Migrator<B>, jobs: &[BatchJob], threads: Option<usize>) -> BatchReport
where
    B: SchemaBinding + Sync,
{
    let collisions = find_collisions(jobs);
    let run = || -> Vec<BatchEntry> {
        jobs.par_iter()
            .enumerate()
            .map(|(index, job)| match collisions.get(&index) {
                Some(first) => BatchEntry {
                    input: job.input.clone(),
                    output: job.output.clone(),
                    summary: None,
                    failure: Some(BatchFailure {
                        stage: Stage::Io,
                        message: format!(
                            "output {} is already written for {}",
                            job.output.display(),
                            first.display()
                        ),
                    }),
                },
                None => run_job(migrator, job),
            })
            .collect()
    };

    let entries = match threads {
        Some(count) => match rayon::ThreadPoolBuilder::new().num_threads(count).build() {
            Ok(pool) => pool.install(run),
            Err(err) => {
                log::warn!("could not build a {count}-thread pool ({err}); using the global pool");
                run()
            }
        },
        None => run(),
    };

    let failed = entries.iter().filter(|e| e.failure.is_some()).count();
    log::info!("batch finished: {} succeeded, {failed} failed", entries.len() - failed);
    BatchReport {
        succeeded: entries.len() - failed,
        failed,
        entries,
    }
}

fn run_job<B: SchemaBinding>(migrator: &Migrator<B>, job: &BatchJob) -> BatchEntry {
    let (summary, failure) = match migrator.migrate_file(&job.input, &job.output) {
        Ok(migration) => (Some(summarize(&migration.rules)), None),
        Err(err) => {
            log::debug!("{} failed in {} stage", job.input.display(), err.stage().as_str());
            (
                None,
                Some(BatchFailure {
                    stage: err.stage(),
                    message: err.to_string(),
                }),
            )
        }
    };
    BatchEntry {
        input: job.input.clone(),
        output: job.output.clone(),
        summary,
        failure,
    }
}

/// Index of every job whose output an earlier job already claims, mapped to
/// that earlier job's input. Outputs are compared in normalized form, so
/// `out/x.srx` and `./out/x.srx` collide.
fn find_collisions(jobs: &[BatchJob]) -> HashMap<usize, PathBuf> {
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();
    let mut collisions = HashMap::new();
    for (index, job) in jobs.iter().enumerate() {
        let key = normalize_for_compare(&job.output).unwrap_or_else(|_| job.output.clone());
        match claimed.entry(key) {
            Entry::Occupied(first) => {
                collisions.insert(index, first.get().to_path_buf());
            }
            Entry::Vacant(slot) => {
                slot.insert(&job.input);
            }
        }
    }
    collisions
}
