//! Handlers for `/preview`, `/edits` and `/current`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/preview` | Body: `{"source":"..."}`; never recorded |
//! | `POST` | `/edits` | Body: `{"source":"...","persist":false}` |
//! | `GET`  | `/current` | The displayed result, `idle` before the first run |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use forge_core::generation::GenerationService;
use serde::Deserialize;

use crate::{
  AppState,
  error::ApiError,
  view::{ArtifactRun, CurrentView, RunView},
};

// ─── Preview ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PreviewBody {
  pub source: String,
}

/// `POST /preview`
///
/// Pipeline failures are part of the result, not an HTTP error.
pub async fn submit<G: GenerationService>(
  State(state): State<AppState<G>>,
  Json(body): Json<PreviewBody>,
) -> Json<RunView> {
  let run = state.session.lock().await.submit(&body.source);
  Json(RunView::from(&run))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub source:  String,
  #[serde(default)]
  pub persist: bool,
}

/// `POST /edits`
pub async fn edit<G: GenerationService>(
  State(state): State<AppState<G>>,
  Json(body): Json<EditBody>,
) -> Result<impl IntoResponse, ApiError> {
  if body.source.trim().is_empty() {
    return Err(ApiError::BadRequest("source must not be empty".to_string()));
  }
  let (artifact, run) = state
    .session
    .lock()
    .await
    .edit(&body.source, body.persist)?;
  let status = if body.persist {
    StatusCode::CREATED
  } else {
    StatusCode::OK
  };
  Ok((status, Json(ArtifactRun::new(artifact, &run))))
}

// ─── Current ──────────────────────────────────────────────────────────────────

/// `GET /current`
pub async fn current<G: GenerationService>(
  State(state): State<AppState<G>>,
) -> Json<CurrentView> {
  let session = state.session.lock().await;
  Json(CurrentView::new(session.state(), session.displayed()))
}
