//! JSON bodies returned by the handlers.

use forge_core::{artifact::Artifact, version::VersionId};
use forge_engine::{Displayed, PipelineRun, PipelineState, Stage};
use serde::Serialize;

/// A pipeline run as sent over the wire.
#[derive(Debug, Serialize)]
pub struct RunView {
  pub source_digest: String,
  pub state:         PipelineState,
  pub trace:         Vec<PipelineState>,
  pub cached:        bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub html:          Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub element_count: Option<usize>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error:         Option<StageError>,
}

#[derive(Debug, Serialize)]
pub struct StageError {
  pub stage:   Stage,
  pub message: String,
}

impl From<&PipelineRun> for RunView {
  fn from(run: &PipelineRun) -> Self {
    let (html, element_count, error) = match &run.outcome {
      Ok(output) => (Some(output.html.clone()), Some(output.element_count), None),
      Err(err) => (
        None,
        None,
        Some(StageError {
          stage:   err.stage(),
          message: err.to_string(),
        }),
      ),
    };
    Self {
      source_digest: run.source_digest.clone(),
      state: run.state,
      trace: run.trace.clone(),
      cached: run.cached,
      html,
      element_count,
      error,
    }
  }
}

/// An artifact together with the run that displayed it.
#[derive(Debug, Serialize)]
pub struct ArtifactRun {
  pub artifact: Artifact,
  pub run:      RunView,
}

impl ArtifactRun {
  pub fn new(artifact: Artifact, run: &PipelineRun) -> Self {
    Self {
      artifact,
      run: run.into(),
    }
  }
}

/// `GET /current`
#[derive(Debug, Serialize)]
pub struct CurrentView {
  pub state:   PipelineState,
  pub version: Option<VersionId>,
  pub source:  Option<String>,
  pub run:     Option<RunView>,
}

impl CurrentView {
  pub fn new(state: PipelineState, displayed: Option<&Displayed>) -> Self {
    Self {
      state,
      version: displayed.and_then(|d| d.version),
      source: displayed.map(|d| d.source.clone()),
      run: displayed.map(|d| RunView::from(&d.run)),
    }
  }
}
