//! XML tree parsing, deterministic writing and structural schema validation.
//!
//! This crate holds the format-agnostic XML plumbing used by `srx-migrate`:
//! an owned element tree that remembers source lines, a reader that keeps
//! character content verbatim, a writer whose output is byte-stable for equal
//! trees, and a small declarative schema language able to express the SRX 2.0
//! structure (element order, occurrence bounds, required and enumerated
//! attributes, default namespace).

pub mod parser;
pub mod schema;
pub mod tree;
pub mod writer;

pub use parser::{parse, parse_file, ParseError, ParseErrorKind};
pub use schema::{validate, AttributeSchema, Content, ElementSchema, Particle, Schema, Violation};
pub use tree::XmlNode;
pub use writer::{write, write_document, write_with, WriteError, WriteOptions};
