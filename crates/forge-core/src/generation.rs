//! The boundary to the generation service.
//!
//! The service turns a natural-language request into UI description text. It
//! lives outside this workspace's core; the core only consumes the
//! [`GenerationService`] trait.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::version::VersionId;

/// A request sent to the generation service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
  pub intent:            String,
  /// The source currently on display, so the service can modify it instead
  /// of starting over.
  pub existing_code:     Option<String>,
  pub parent_version_id: Option<VersionId>,
}

impl GenerationRequest {
  pub fn new(intent: impl Into<String>) -> Self {
    Self {
      intent: intent.into(),
      ..Self::default()
    }
  }
}

/// What the service returns.
///
/// `id` is the service's own counter. It is kept for logging only; artifact
/// identity is issued by the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
  pub id:          u64,
  pub code:        String,
  pub explanation: String,
  pub timestamp:   DateTime<Utc>,
}

/// A failed generation, carried as a single user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generation failed: {message}")]
pub struct GenerationError {
  pub message: String,
}

impl GenerationError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

/// Abstraction over a generation backend (a live model, or canned responses).
pub trait GenerationService: Send + Sync {
  fn generate(
    &self,
    request: GenerationRequest,
  ) -> impl Future<Output = Result<Generation, GenerationError>> + Send + '_;
}
