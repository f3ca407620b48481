//! Error types for the forge-markup transform.

use std::fmt;

use thiserror::Error;

/// A 1-based line/column location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
  pub line:   usize,
  pub column: usize,
}

impl Position {
  /// Compute the position of byte `offset` within `source`.
  pub fn locate(source: &str, offset: usize) -> Self {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    Self { line, column }
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.line, self.column)
  }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
  #[error("syntax error at {at}: {message}")]
  Syntax { message: String, at: Position },

  #[error("unsupported construct at {at}: {construct}")]
  Unsupported { construct: String, at: Position },

  #[error("unterminated {what} starting at {at}")]
  Unterminated { what: &'static str, at: Position },

  #[error("mismatched closing tag at {at}: expected </{expected}>, found </{found}>")]
  MismatchedTag {
    expected: String,
    found:    String,
    at:       Position,
  },

  #[error("`{name}` is declared twice at the top level")]
  DuplicateDeclaration { name: String },

  #[error("no component function found (expected `function GeneratedUI()` or a default export)")]
  NoEntryPoint,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
