//! Migration pipeline: legacy parser, SRX mapper, then schema binding.
//!
//! A run stops at the first failing stage and produces no output. The error
//! says which stage failed, and the CLI derives its exit status from that.
//! File-to-file runs write to a temporary file next to the destination and
//! rename it into place only after the document has validated.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::binding::{SchemaBinding, SchemaError, XmlSchemaBinding};
use crate::legacy::{self, LegacyParser};
use crate::model::RuleSet;
use crate::path_guard::is_same_path;
use crate::srx::{map, MappingError, SrxDocument};

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Io,
    Parse,
    Mapping,
    Schema,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Io => "io",
            Self::Parse => "parse",
            Self::Mapping => "mapping",
            Self::Schema => "schema",
        }
    }

    /// Process exit status for a run that failed in this stage.
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Io => 1,
            Self::Parse => 2,
            Self::Mapping => 3,
            Self::Schema => 4,
        }
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("refusing to overwrite source file: output {output} matches input {input}")]
    WouldOverwrite { input: String, output: String },
    #[error("parse error: {0}")]
    Parse(#[from] legacy::ParseError),
    #[error("mapping error: {0}")]
    Mapping(#[from] MappingError),
    #[error("schema validation failed: {0}")]
    Schema(#[from] SchemaError),
}

impl MigrationError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Read { .. } | Self::Write { .. } | Self::WouldOverwrite { .. } => Stage::Io,
            Self::Parse(_) => Stage::Parse,
            Self::Mapping(_) => Stage::Mapping,
            Self::Schema(_) => Stage::Schema,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.stage().exit_code()
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub rules: RuleSet,
    pub document: SrxDocument,
    /// The validated SRX document as written.
    pub xml: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Migrator<B = XmlSchemaBinding> {
    parser: LegacyParser,
    binding: B,
}

impl Default for Migrator<XmlSchemaBinding> {
    fn default() -> Self {
        Self::new(LegacyParser::default(), XmlSchemaBinding::default())
    }
}

impl<B: SchemaBinding> Migrator<B> {
    pub fn new(parser: LegacyParser, binding: B) -> Self {
        Self { parser, binding }
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Parse only.
    pub fn read_rules(&self, source: &[u8]) -> Result<RuleSet, MigrationError> {
        let rules = self.parser.parse(source)?;
        log::debug!(
            "parsed {} map rules, {} rule groups, {} rules",
            rules.map_rules.len(),
            rules.groups.len(),
            rules.rule_count()
        );
        Ok(rules)
    }

    /// Run the whole pipeline over in-memory legacy bytes.
    pub fn migrate_bytes(&self, source: &[u8]) -> Result<Migration, MigrationError> {
        let rules = self.read_rules(source)?;
        let document = map(&rules)?;
        let xml = self.binding.marshal(&document)?;
        log::debug!("serialized {} bytes of SRX", xml.len());
        self.binding.validate(&xml)?;

        Ok(Migration {
            rules,
            document,
            xml,
        })
    }

    /// Run the pipeline and deliver the document to `sink`. Nothing is written
    /// when any stage fails.
    pub fn migrate_to<W: Write>(
        &self,
        source: &[u8],
        sink: &mut W,
    ) -> Result<Migration, MigrationError> {
        let migration = self.migrate_bytes(source)?;
        sink.write_all(&migration.xml)
            .and_then(|()| sink.flush())
            .map_err(|source| MigrationError::Write {
                path: "output stream".to_string(),
                source,
            })?;
        Ok(migration)
    }

    /// Migrate `input` into `output`, replacing `output` atomically.
    pub fn migrate_file(&self, input: &Path, output: &Path) -> Result<Migration, MigrationError> {
        let same = is_same_path(output, input).map_err(|source| MigrationError::Read {
            path: input.display().to_string(),
            source,
        })?;
        if same {
            return Err(MigrationError::WouldOverwrite {
                input: input.display().to_string(),
                output: output.display().to_string(),
            });
        }

        let source = read_input(input)?;
        let migration = self.migrate_bytes(&source)?;
        write_atomic(output, &migration.xml).map_err(|source| MigrationError::Write {
            path: output.display().to_string(),
            source,
        })?;

        log::info!(
            "migrated {} -> {} ({} map rules, {} rule groups)",
            input.display(),
            output.display(),
            migration.rules.map_rules.len(),
            migration.rules.groups.len()
        );
        Ok(migration)
    }

    /// Parse a legacy file without producing output.
    pub fn check_file(&self, input: &Path) -> Result<RuleSet, MigrationError> {
        self.read_rules(&read_input(input)?)
    }
}

/// Where a migrated file goes when no output path is given: next to the input.
pub fn default_output_path(input: &Path, file_name: &str) -> PathBuf {
    match input.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_name),
        _ => PathBuf::from(file_name),
    }
}

fn read_input(input: &Path) -> Result<Vec<u8>, MigrationError> {
    fs::read(input).map_err(|source| MigrationError::Read {
        path: input.display().to_string(),
        source,
    })
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
