//! JSON API for the forge previewer.
//!
//! Exposes an axum [`Router`] over one [`Session`] and a
//! [`GenerationService`]. Transport concerns (tracing layers, listeners) are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", forge_api::api_router(state))
//! ```

pub mod error;
pub mod generations;
pub mod history;
pub mod preview;
pub mod view;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use forge_core::generation::GenerationService;
use forge_engine::Session;
use forge_history::MemoryHistory;
use tokio::sync::Mutex;

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct AppState<G> {
  pub session:   Arc<Mutex<Session<MemoryHistory>>>,
  pub generator: Arc<G>,
}

impl<G> AppState<G> {
  pub fn new(session: Session<MemoryHistory>, generator: G) -> Self {
    Self {
      session:   Arc::new(Mutex::new(session)),
      generator: Arc::new(generator),
    }
  }
}

impl<G> Clone for AppState<G> {
  fn clone(&self) -> Self {
    Self {
      session:   Arc::clone(&self.session),
      generator: Arc::clone(&self.generator),
    }
  }
}

/// Build a fully-materialised API router for `state`.
pub fn api_router<G>(state: AppState<G>) -> Router<()>
where
  G: GenerationService + 'static,
{
  Router::new()
    // Pipeline
    .route("/preview", post(preview::submit::<G>))
    .route("/edits", post(preview::edit::<G>))
    .route("/current", get(preview::current::<G>))
    // Generation
    .route("/generations", post(generations::create::<G>))
    // History
    .route("/history", get(history::list::<G>))
    .route("/history/{id}", get(history::get::<G>))
    .route("/history/{id}/rollback", post(history::rollback::<G>))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use std::future::Future;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use chrono::{TimeZone, Utc};
  use forge_core::generation::{Generation, GenerationError, GenerationRequest};
  use forge_engine::EngineConfig;
  use pretty_assertions::assert_eq;
  use serde_json::{Value, json};
  use tower::ServiceExt;

  use super::*;

  /// Answers every request with the same result.
  struct Fixed(Result<Generation, GenerationError>);

  impl GenerationService for Fixed {
    fn generate(
      &self,
      _request: GenerationRequest,
    ) -> impl Future<Output = Result<Generation, GenerationError>> + Send + '_ {
      let result = self.0.clone();
      async move { result }
    }
  }

  const CARD: &str = r#"function GeneratedUI() { return <Card title="Hello"><p>hi</p></Card>; }"#;

  fn state(result: Result<Generation, GenerationError>) -> AppState<Fixed> {
    let session = Session::new(MemoryHistory::new(), &EngineConfig::default()).unwrap();
    AppState::new(session, Fixed(result))
  }

  fn generated(code: &str) -> Result<Generation, GenerationError> {
    Ok(Generation {
      id:          1,
      code:        code.to_string(),
      explanation: "a card".to_string(),
      timestamp:   Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    })
  }

  async fn call(
    state: AppState<Fixed>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(state)
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
  }

  #[tokio::test]
  async fn current_is_idle_before_anything_runs() {
    let (status, body) = call(state(generated(CARD)), "GET", "/current", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "idle");
    assert_eq!(body["run"], Value::Null);
  }

  #[tokio::test]
  async fn preview_renders_whitelisted_source() {
    let (status, body) = call(
      state(generated(CARD)),
      "POST",
      "/preview",
      Some(json!({ "source": CARD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "rendered");
    assert_eq!(
      body["trace"],
      json!(["validating", "transforming", "instantiating", "rendering", "rendered"])
    );
    assert!(body["html"].as_str().unwrap().contains("<p>hi</p>"));
  }

  #[tokio::test]
  async fn preview_reports_the_failing_stage() {
    let source = "import { Foo } from 'some-lib';\nfunction GeneratedUI() { return <Foo />; }";
    let (status, body) = call(
      state(generated(CARD)),
      "POST",
      "/preview",
      Some(json!({ "source": source })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "rejected");
    assert_eq!(body["error"]["stage"], "validation");
    assert_eq!(
      body["error"]["message"],
      "Prohibited import: import { Foo } from 'some-lib'"
    );
    assert_eq!(body.get("html"), None);
  }

  #[tokio::test]
  async fn generation_is_recorded_and_displayed() {
    let state = state(generated(CARD));
    let (status, body) = call(
      state.clone(),
      "POST",
      "/generations",
      Some(json!({ "intent": "a greeting card" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["artifact"]["id"], 1);
    assert_eq!(body["artifact"]["intent"], "a greeting card");
    assert_eq!(body["run"]["state"], "rendered");

    let (_, history) = call(state.clone(), "GET", "/history", None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);

    let (_, current) = call(state, "GET", "/current", None).await;
    assert_eq!(current["version"], 1);
    assert_eq!(current["source"], CARD);
  }

  #[tokio::test]
  async fn failed_generation_is_a_bad_gateway_and_records_nothing() {
    let state = state(Err(GenerationError::new("model unavailable")));
    let (status, body) = call(
      state.clone(),
      "POST",
      "/generations",
      Some(json!({ "intent": "anything" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "generation failed: model unavailable");

    let (_, history) = call(state, "GET", "/history", None).await;
    assert_eq!(history, json!([]));
  }

  #[tokio::test]
  async fn empty_intents_and_edits_are_bad_requests() {
    let state = state(generated(CARD));
    let (status, _) = call(
      state.clone(),
      "POST",
      "/generations",
      Some(json!({ "intent": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(state, "POST", "/edits", Some(json!({ "source": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn persisted_edits_join_history() {
    let state = state(generated(CARD));
    let (status, body) = call(
      state.clone(),
      "POST",
      "/edits",
      Some(json!({ "source": CARD, "persist": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["artifact"]["origin"], "edited");

    let (status, _) = call(
      state.clone(),
      "POST",
      "/edits",
      Some(json!({ "source": CARD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, history) = call(state, "GET", "/history", None).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn rollback_reorders_history() {
    let state = state(generated(CARD));
    for _ in 0..3 {
      call(
        state.clone(),
        "POST",
        "/generations",
        Some(json!({ "intent": "card" })),
      )
      .await;
    }

    let (status, body) = call(state.clone(), "POST", "/history/1/rollback", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artifact"]["id"], 1);
    assert_eq!(body["run"]["cached"], true);

    let (_, history) = call(state.clone(), "GET", "/history", None).await;
    let ids: Vec<u64> = history
      .as_array()
      .unwrap()
      .iter()
      .map(|a| a["id"].as_u64().unwrap())
      .collect();
    assert_eq!(ids, vec![1, 3, 2]);

    let (status, body) = call(state, "POST", "/history/42/rollback", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "version 42 not found");
  }

  #[tokio::test]
  async fn single_versions_are_fetched_without_reordering() {
    let state = state(generated(CARD));
    for _ in 0..2 {
      call(
        state.clone(),
        "POST",
        "/generations",
        Some(json!({ "intent": "card" })),
      )
      .await;
    }

    let (status, body) = call(state.clone(), "GET", "/history/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["source"], CARD);
    assert_eq!(body["explanation"], "a card");

    let (_, history) = call(state.clone(), "GET", "/history", None).await;
    assert_eq!(history[0]["id"], 2);

    let (status, body) = call(state, "GET", "/history/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "version 42 not found");
  }
}
