//! Handler for `POST /generations`.
//!
//! The session lock is released while the generation service runs, so
//! previews and rollbacks stay responsive. Whatever was requested last wins:
//! a result that comes back after a newer request is answered with `409`.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use forge_core::generation::GenerationService;
use serde::Deserialize;

use crate::{AppState, error::ApiError, view::ArtifactRun};

#[derive(Debug, Deserialize)]
pub struct GenerationBody {
  pub intent: String,
}

/// `POST /generations`, body: `{"intent":"a login form"}`
pub async fn create<G: GenerationService>(
  State(state): State<AppState<G>>,
  Json(body): Json<GenerationBody>,
) -> Result<impl IntoResponse, ApiError> {
  let intent = body.intent.trim();
  if intent.is_empty() {
    return Err(ApiError::BadRequest("intent must not be empty".to_string()));
  }

  let pending = state.session.lock().await.begin_generation(intent);
  let result = state.generator.generate(pending.request.clone()).await;
  let (artifact, run) = state
    .session
    .lock()
    .await
    .complete_generation(pending, result)?;

  Ok((StatusCode::CREATED, Json(ArtifactRun::new(artifact, &run))))
}
