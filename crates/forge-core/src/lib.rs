//! Core types and trait definitions for the forge artifact previewer.
//!
//! This crate is deliberately free of HTTP, parsing and rendering
//! dependencies. Every other crate depends on it.

pub mod artifact;
pub mod error;
pub mod generation;
pub mod history;
pub mod version;

pub use error::{Error, Result};
