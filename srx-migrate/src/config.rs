//! Optional TOML configuration for migration runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::binding::XmlSchemaBinding;
use crate::language_names::{LanguageNames, LanguageNamesError};
use crate::legacy::LegacyParser;
use crate::pattern::PatternCheck;

/// Default name of a migrated rules file.
pub const SRX_FILE_NAME: &str = "segmentation.srx";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrateConfig {
    /// Rename rule groups to standard language names.
    pub normalize_language_names: bool,
    /// Replacement for the built-in language-name table. Relative paths are
    /// resolved against the directory of the configuration file.
    pub language_names: Option<PathBuf>,
    pub pattern_check: PatternCheck,
    pub output_file_name: String,
    pub indent: usize,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            normalize_language_names: true,
            language_names: None,
            pattern_check: PatternCheck::Lenient,
            output_file_name: SRX_FILE_NAME.to_string(),
            indent: 2,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error(transparent)]
    LanguageNames(#[from] LanguageNamesError),
}

impl MigrateConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;

        if let (Some(names), Some(dir)) = (&config.language_names, path.parent()) {
            if names.is_relative() {
                config.language_names = Some(dir.join(names));
            }
        }
        Ok(config)
    }

    /// Load `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Legacy reader configured from this file.
    pub fn legacy_parser(&self) -> Result<LegacyParser, ConfigError> {
        let names = if !self.normalize_language_names {
            None
        } else if let Some(path) = &self.language_names {
            Some(LanguageNames::load(path)?)
        } else {
            Some(LanguageNames::embedded())
        };

        Ok(LegacyParser::default()
            .with_language_names(names)
            .with_pattern_check(self.pattern_check))
    }

    pub fn binding(&self) -> XmlSchemaBinding {
        XmlSchemaBinding {
            indent: self.indent,
        }
    }
}
