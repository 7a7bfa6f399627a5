//! Migration of legacy `segmentation.conf` rule sets to SRX 2.0.
//!
//! The legacy file is a serialized object graph in which every language
//! mapping owns its own list of break rules, and lists may be shared between
//! mappings. SRX 2.0 keeps the language map and the named rule groups as two
//! separate collections joined by name. This crate reads the former, links
//! groups by name, and writes the latter, validated against the SRX 2.0 schema.
//!
//! # Pipeline
//!
//! 1. [`legacy`]: read and guard the legacy document into a [`model::RuleSet`]
//! 2. [`srx::mapper`]: flatten the rule set into an [`srx::SrxDocument`]
//! 3. [`binding`]: serialize the document and validate it against SRX 2.0
//!
//! [`migrate`] runs the three stages and reports the first failure together
//! with the stage it came from. [`batch`] runs many migrations concurrently.
//!
//! # Supporting modules
//!
//! - [`language_names`]: standard rule-group names for localized languages
//! - [`pattern`]: regular-expression well-formedness checks
//! - [`config`]: optional TOML configuration
//! - [`summary`]: rule-set statistics for reports
//! - [`srx::reader`]: load an SRX 2.0 file back into a rule set
//!
//! # Examples
//!
//! ```ignore
//! use std::path::Path;
//! use srx_migrate::migrate::Migrator;
//!
//! let migration = Migrator::default()
//!     .migrate_file(Path::new("segmentation.conf"), Path::new("segmentation.srx"))?;
//! println!("{} language maps", migration.document.map_rules.len());
//! ```
//!
//! All generic XML handling lives in `srx-xml`.

pub mod batch;
pub mod binding;
pub mod config;
pub mod language_names;
pub mod legacy;
pub mod migrate;
pub mod model;
mod path_guard;
pub mod pattern;
pub mod report;
pub mod srx;
pub mod summary;
