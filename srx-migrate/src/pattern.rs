//! Regular-expression well-formedness checks.
//!
//! Patterns are carried through a migration verbatim; this module only decides
//! whether a pattern is acceptable. Legacy rule sets were written for the Java
//! backtracking engine, so the default mode accepts look-around and
//! back-references, which the `regex` crate can parse but not execute. It also
//! accepts Java-only syntax: `\Q...\E` quoting, atomic groups, possessive
//! quantifiers and the `\h`, `\H`, `\R`, `\G` and `\Z` escapes.

use std::borrow::Cow;

use regex_syntax::ast::parse::ParserBuilder;
use regex_syntax::ast::ErrorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternCheck {
    /// Syntax check only; Java look-around, back-references and other
    /// backtracking-engine constructs are allowed.
    #[default]
    Lenient,
    /// The pattern must compile with the `regex` crate.
    Strict,
}

/// Check one pattern, returning a single-line reason on failure.
///
/// The empty pattern is always valid: it matches any position.
pub fn check_pattern(pattern: &str, mode: PatternCheck) -> Result<(), String> {
    if pattern.is_empty() {
        return Ok(());
    }

    let subject = match mode {
        PatternCheck::Lenient => Cow::Owned(neutralize_java(pattern)),
        PatternCheck::Strict => Cow::Borrowed(pattern),
    };
    let mut parser = ParserBuilder::new().build();
    if let Err(err) = parser.parse(&subject) {
        let tolerated = matches!(
            err.kind(),
            ErrorKind::UnsupportedLookAround | ErrorKind::UnsupportedBackreference
        );
        if mode == PatternCheck::Strict || !tolerated {
            return Err(err.kind().to_string());
        }
        return Ok(());
    }

    if mode == PatternCheck::Strict {
        regex::Regex::new(pattern).map_err(|err| last_line(&err.to_string()))?;
    }
    Ok(())
}

/// Rewrite Java-only constructs into syntax the AST parser knows, keeping the
/// surrounding structure intact so real syntax errors still surface.
fn neutralize_java(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut class_depth = 0usize;
    let mut after_quantifier = false;
    let mut after_open = false;

    while let Some(c) = chars.next() {
        let was_quantifier = std::mem::take(&mut after_quantifier);
        let was_open = std::mem::take(&mut after_open);
        match c {
            '\\' => match chars.next() {
                Some('Q') => {
                    let mut quoted = String::new();
                    while let Some(q) = chars.next() {
                        if q == '\\' && chars.peek() == Some(&'E') {
                            chars.next();
                            break;
                        }
                        quoted.push(q);
                    }
                    out.push_str(&regex_syntax::escape(&quoted));
                }
                Some('h' | 'H' | 'R' | 'G' | 'Z') => out.push_str("\\x00"),
                Some(class @ ('p' | 'P')) => {
                    out.push('\\');
                    out.push(class);
                    if chars.peek() == Some(&'{') {
                        for n in chars.by_ref() {
                            out.push(n);
                            if n == '}' {
                                break;
                            }
                        }
                    }
                }
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            '[' => {
                class_depth += 1;
                out.push(c);
            }
            ']' if class_depth > 0 => {
                class_depth -= 1;
                out.push(c);
            }
            _ if class_depth > 0 => out.push(c),
            // possessive quantifier
            '+' if was_quantifier => {}
            '(' => {
                after_open = true;
                out.push(c);
            }
            '?' if was_open => {
                if chars.peek() == Some(&'>') {
                    chars.next();
                    out.push_str("?:");
                } else {
                    out.push('?');
                }
            }
            '*' | '+' | '?' | '}' => {
                after_quantifier = true;
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

fn last_line(message: &str) -> String {
    message
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or(message)
        .trim()
        .trim_start_matches("error: ")
        .to_string()
}
