//! Error types for `forge-engine`.
//!
//! Each pipeline stage has its own error; [`PipelineError`] unifies them and
//! records which stage failed. [`Error`] covers session operations.

use forge_core::version::{Stamp, VersionId};
use forge_markup::Position;
use thiserror::Error;

/// A source text that violates the validation policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
  pub message: String,
}

impl ValidationError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

pub type TransformError = forge_markup::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstantiationError {
  #[error("`{name}` is not defined in the sandbox")]
  Unbound { name: String },

  #[error("<{tag}> at {at} is not an allowed element")]
  UnknownTag { tag: String, at: Position },

  #[error("entry point `{entry}` is not a function")]
  NotCallable { entry: String },

  #[error("evaluating module scope: {0}")]
  Module(#[from] RenderError),
}

/// A failure while evaluating code or drawing the element tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
  #[error("TypeError: {0}")]
  Type(String),

  #[error("`{0}` is not defined")]
  NotDefined(String),

  #[error("<{0}> is not a component")]
  NotAComponent(String),

  #[error("maximum call depth of {limit} exceeded")]
  CallDepthExceeded { limit: usize },

  #[error("evaluation budget of {limit} steps exhausted")]
  FuelExhausted { limit: u64 },

  #[error("maximum nesting depth of {limit} exceeded")]
  NestingTooDeep { limit: usize },

  #[error("drawing more than {limit} elements")]
  TooManyElements { limit: usize },

  #[error("output larger than {limit} bytes")]
  OutputTooLarge { limit: usize },

  #[error("objects are not valid as a UI child (found {0})")]
  InvalidChild(&'static str),
}

/// The stage a pipeline run failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Validation,
  Transform,
  Instantiation,
  Render,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("transform failed: {0}")]
  Transform(#[from] TransformError),

  #[error("instantiation failed: {0}")]
  Instantiation(#[from] InstantiationError),

  #[error("render failed: {0}")]
  Render(#[from] RenderError),
}

impl PipelineError {
  pub fn stage(&self) -> Stage {
    match self {
      Self::Validation(_) => Stage::Validation,
      Self::Transform(_) => Stage::Transform,
      Self::Instantiation(_) => Stage::Instantiation,
      Self::Render(_) => Stage::Render,
    }
  }
}

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid validation rule: {0}")]
  Rule(#[from] regex::Error),

  #[error(transparent)]
  History(Box<dyn std::error::Error + Send + Sync>),

  #[error("version not found: {0}")]
  VersionNotFound(VersionId),

  #[error("result for request {0} was superseded by a newer request")]
  Superseded(Stamp),

  #[error(transparent)]
  Generation(#[from] forge_core::generation::GenerationError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
