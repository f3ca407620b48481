//! Handlers for `/history` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/history` | Newest first |
//! | `GET`  | `/history/{id}` | 404 if the version is unknown; order unchanged |
//! | `POST` | `/history/{id}/rollback` | 404 if the version is unknown |

use axum::{
  Json,
  extract::{Path, State},
};
use forge_core::{
  artifact::Artifact, generation::GenerationService, history::ArtifactHistory,
  version::VersionId,
};

use crate::{AppState, error::ApiError, view::ArtifactRun};

/// `GET /history`
pub async fn list<G: GenerationService>(
  State(state): State<AppState<G>>,
) -> Json<Vec<Artifact>> {
  Json(state.session.lock().await.current_history().to_vec())
}

/// `GET /history/{id}`
pub async fn get<G: GenerationService>(
  State(state): State<AppState<G>>,
  Path(id): Path<u64>,
) -> Result<Json<Artifact>, ApiError> {
  let id = VersionId(id);
  let session = state.session.lock().await;
  let artifact = session
    .history()
    .get(id)
    .cloned()
    .ok_or(forge_engine::Error::VersionNotFound(id))?;
  Ok(Json(artifact))
}

/// `POST /history/{id}/rollback`
pub async fn rollback<G: GenerationService>(
  State(state): State<AppState<G>>,
  Path(id): Path<u64>,
) -> Result<Json<ArtifactRun>, ApiError> {
  let id = VersionId(id);
  let mut session = state.session.lock().await;
  let artifact = session
    .rollback(id)
    .ok_or(forge_engine::Error::VersionNotFound(id))?;
  let displayed = session
    .displayed()
    .ok_or_else(|| ApiError::NotFound(format!("version {id} is not displayed")))?;
  Ok(Json(ArtifactRun::new(artifact, &displayed.run)))
}
