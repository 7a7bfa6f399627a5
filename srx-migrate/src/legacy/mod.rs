//! Reader for legacy `segmentation.conf` rule documents.
//!
//! The legacy file is a serialized object graph: an `SRX` object whose
//! `mappingRules` list holds `MapRule` objects, each carrying a language name,
//! a language pattern and its own list of `Rule` objects. The parser turns it
//! into a [`RuleSet`], using the (normalized) language name as the rule-group
//! name and resolving `id`/`idref` list sharing into group references.

mod class_guard;
mod decoder;

use thiserror::Error;

use crate::language_names::LanguageNames;
use crate::model::RuleSet;
use crate::pattern::PatternCheck;

/// File name the legacy tool stores its rules under.
pub const LEGACY_FILE_NAME: &str = "segmentation.conf";

/// Errors produced while reading a legacy document. Every variant names the
/// source line it was detected on.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed legacy document: {0}")]
    Xml(#[from] srx_xml::ParseError),
    #[error("line {line}: <{element}>: {reason}")]
    Structure {
        line: usize,
        element: String,
        reason: String,
    },
    #[error("line {line}: <{element}> is missing required property '{property}'")]
    MissingField {
        line: usize,
        element: String,
        property: &'static str,
    },
    #[error("line {line}: invalid regular expression in {field} {pattern:?}: {reason}")]
    InvalidPattern {
        line: usize,
        field: &'static str,
        pattern: String,
        reason: String,
    },
    #[error("line {line}: duplicate rule group name '{name}' (first defined on line {first_line})")]
    DuplicateGroup {
        line: usize,
        name: String,
        first_line: usize,
    },
    #[error("line {line}: reference to undefined rule group '{reference}'")]
    DanglingReference { line: usize, reference: String },
    #[error("line {line}: class name '{class}' is not from the expected package")]
    ForbiddenClass { line: usize, class: String },
}

impl ParseError {
    /// Source line of the defect; 0 when unknown.
    pub fn line(&self) -> usize {
        match self {
            Self::Xml(err) => err.line,
            Self::Structure { line, .. }
            | Self::MissingField { line, .. }
            | Self::InvalidPattern { line, .. }
            | Self::DuplicateGroup { line, .. }
            | Self::DanglingReference { line, .. }
            | Self::ForbiddenClass { line, .. } => *line,
        }
    }
}

/// Configurable legacy reader.
#[derive(Debug, Clone)]
pub struct LegacyParser {
    language_names: Option<LanguageNames>,
    pattern_check: PatternCheck,
}

impl Default for LegacyParser {
    /// Normalizes names with the embedded table and checks patterns leniently.
    fn default() -> Self {
        Self {
            language_names: Some(LanguageNames::embedded()),
            pattern_check: PatternCheck::default(),
        }
    }
}

impl LegacyParser {
    /// A parser that keeps legacy language names verbatim.
    pub fn verbatim() -> Self {
        Self {
            language_names: None,
            pattern_check: PatternCheck::default(),
        }
    }

    pub fn with_language_names(mut self, names: Option<LanguageNames>) -> Self {
        self.language_names = names;
        self
    }

    pub fn with_pattern_check(mut self, check: PatternCheck) -> Self {
        self.pattern_check = check;
        self
    }

    /// Parse legacy document bytes into a rule set.
    pub fn parse(&self, source: &[u8]) -> Result<RuleSet, ParseError> {
        let root = srx_xml::parse(source)?;
        class_guard::check_document(&root)?;
        decoder::decode(&root, self.language_names.as_ref(), self.pattern_check)
    }
}
