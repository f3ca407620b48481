//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A newer request replaced this one before it finished.
  #[error("conflict: {0}")]
  Conflict(String),

  /// The generation service failed.
  #[error("{0}")]
  Upstream(String),

  #[error("session error: {0}")]
  Session(#[source] forge_engine::Error),
}

impl From<forge_engine::Error> for ApiError {
  fn from(err: forge_engine::Error) -> Self {
    use forge_engine::Error;
    match err {
      Error::VersionNotFound(id) => ApiError::NotFound(format!("version {id} not found")),
      Error::Superseded(_) => ApiError::Conflict(err.to_string()),
      Error::Generation(err) => ApiError::Upstream(err.to_string()),
      other => ApiError::Session(other),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Upstream(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Session(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    if status.is_server_error() {
      tracing::error!(%status, error = %message, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
