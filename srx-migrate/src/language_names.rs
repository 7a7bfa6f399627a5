use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// One standard rule-group name and the legacy spellings that map onto it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageName {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Lookup table used to give legacy rule groups their standard names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageNames {
    entries: Vec<LanguageName>,
}

#[derive(Debug, Deserialize)]
struct NamesFile {
    #[serde(default)]
    language: Vec<LanguageName>,
}

/// Errors returned when loading language-name files.
#[derive(Debug, Error)]
pub enum LanguageNamesError {
    #[error("failed to read language names file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse language names file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl LanguageNames {
    /// Built-in table shipped with the crate.
    pub fn embedded() -> Self {
        let embedded = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/mappings/language_names.toml"
        ));
        match Self::from_toml_str(embedded, "embedded language names".to_string()) {
            Ok(names) => names,
            Err(err) => {
                log::warn!("{err}; language names will not be normalized");
                Self::default()
            }
        }
    }

    /// Load a table from a TOML file.
    pub fn load(path: &Path) -> Result<Self, LanguageNamesError> {
        let raw = fs::read_to_string(path).map_err(|source| LanguageNamesError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&raw, path.display().to_string())
    }

    pub fn from_toml_str(raw: &str, path: String) -> Result<Self, LanguageNamesError> {
        let parsed: NamesFile =
            toml::from_str(raw).map_err(|source| LanguageNamesError::Parse { path, source })?;
        Ok(Self {
            entries: parsed.language,
        })
    }

    pub fn entries(&self) -> &[LanguageName] {
        &self.entries
    }

    /// Resolve the standard name for a legacy map rule.
    ///
    /// The language pattern is tried first, then the legacy language name
    /// against standard names and aliases. Both comparisons are exact, so a
    /// user-defined group called `default` keeps its own name.
    pub fn standard_name(&self, pattern: &str, language: &str) -> Option<&str> {
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| e.patterns.iter().any(|p| p == pattern))
        {
            return Some(&entry.name);
        }

        let wanted = language.trim();
        self.entries
            .iter()
            .find(|e| e.name == wanted || e.aliases.iter().any(|a| a == wanted))
            .map(|e| e.name.as_str())
    }
}
