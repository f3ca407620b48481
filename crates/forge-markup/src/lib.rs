//! Parser for UI descriptions written in a JSX dialect.
//!
//! [`transform`] turns a raw description into an immutable [`Definition`]:
//! module-level items, recorded imports, and the name of the component
//! function to render. Nothing here executes code or resolves names; that is
//! the sandbox's job.
//!
//! Three authoring shapes are accepted and normalise to the same result:
//!
//! ```text
//! function GeneratedUI() { return <Card title="Hi" />; }
//! export default function GeneratedUI() { return <Card title="Hi" />; }
//! const GeneratedUI = () => <Card title="Hi" />;
//! ```
//!
//! The expression language is a deliberately small subset: no loops,
//! classes, assignment, `new`, regular expressions or type annotations.
//! Rejections carry a `line:column` position.

pub mod ast;
pub mod error;
mod lexer;
mod parser;

pub use ast::Definition;
pub use error::{Error, Position, Result};

/// Parse `source` into an executable [`Definition`].
pub fn transform(source: &str) -> Result<Definition> {
  parser::Parser::new(source).parse_definition()
}
