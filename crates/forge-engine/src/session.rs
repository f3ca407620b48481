//! The session: one owner of history, pipeline, version issuer and the
//! displayed result.
//!
//! Every request that can change what is displayed is tagged with a
//! [`Stamp`]. Results are last-write-wins: a generation whose stamp is no
//! longer the latest is discarded instead of displayed.

use forge_core::{
  artifact::{Artifact, NewArtifact},
  generation::{Generation, GenerationError, GenerationRequest},
  history::ArtifactHistory,
  version::{Stamp, StampIssuer, VersionId, VersionIssuer},
};
use tracing::{debug, info, warn};

use crate::{
  config::EngineConfig,
  error::{Error, Result},
  pipeline::{Pipeline, PipelineRun, PipelineState},
};

/// What the session is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub struct Displayed {
  /// The artifact on display; `None` for unsaved previews and edits.
  pub version: Option<VersionId>,
  pub source:  String,
  pub run:     PipelineRun,
}

/// A generation request that has been stamped and handed out, but whose
/// result has not come back yet.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
  pub stamp:   Stamp,
  pub request: GenerationRequest,
}

pub struct Session<H: ArtifactHistory> {
  history:   H,
  pipeline:  Pipeline,
  versions:  VersionIssuer,
  stamps:    StampIssuer,
  displayed: Option<Displayed>,
}

impl<H: ArtifactHistory> Session<H> {
  /// Start a session over `history`. New versions continue after the
  /// highest id already present.
  pub fn new(history: H, config: &EngineConfig) -> Result<Self> {
    let versions = history
      .iter()
      .map(|artifact| artifact.id)
      .max()
      .map_or_else(VersionIssuer::new, VersionIssuer::after);
    Ok(Self {
      history,
      pipeline: Pipeline::new(config)?,
      versions,
      stamps: StampIssuer::new(),
      displayed: None,
    })
  }

  /// Preview arbitrary source without recording it.
  pub fn submit(&mut self, source: &str) -> PipelineRun {
    let stamp = self.stamps.issue();
    debug!(%stamp, "preview submitted");
    self.display(None, source)
  }

  /// Replace the displayed source with a hand edit. The edit becomes a new
  /// artifact; it only enters history when `persist` is set.
  pub fn edit(&mut self, source: &str, persist: bool) -> Result<(Artifact, PipelineRun)> {
    self.stamps.issue();
    let parent = self.displayed_version();
    let artifact = NewArtifact::edit(source, parent).issue(&mut self.versions);
    if persist {
      self.append(artifact.clone())?;
    }
    let run = self.display(persist.then_some(artifact.id), source);
    Ok((artifact, run))
  }

  /// Accept a generation result directly, outside the stamped flow.
  ///
  /// The artifact is appended to history even when its source fails to
  /// render; the failure is reported in the returned run.
  pub fn add_generation(
    &mut self,
    intent: &str,
    generation: Generation,
  ) -> Result<(Artifact, PipelineRun)> {
    self.stamps.issue();
    let parent = self.displayed_version();
    self.accept(intent, generation, parent)
  }

  /// Move `id` to the front of history and display it again.
  pub fn rollback(&mut self, id: VersionId) -> Option<Artifact> {
    let artifact = self.history.rollback(id)?;
    self.stamps.issue();
    info!(version = %id, "rolled back");
    self.display(Some(id), &artifact.source);
    Some(artifact)
  }

  /// Stamp a generation request for `intent`. The request carries the
  /// displayed source and version so the service can modify them.
  pub fn begin_generation(&mut self, intent: &str) -> PendingGeneration {
    let stamp = self.stamps.issue();
    let request = GenerationRequest {
      intent:            intent.to_string(),
      existing_code:     self.displayed.as_ref().map(|d| d.source.clone()),
      parent_version_id: self.displayed_version(),
    };
    debug!(%stamp, intent, "generation requested");
    PendingGeneration { stamp, request }
  }

  /// Deliver the result of a pending generation.
  ///
  /// A result for a request that has since been superseded is dropped. A
  /// failed generation leaves history untouched.
  pub fn complete_generation(
    &mut self,
    pending: PendingGeneration,
    result: std::result::Result<Generation, GenerationError>,
  ) -> Result<(Artifact, PipelineRun)> {
    if !self.stamps.is_latest(pending.stamp) {
      warn!(stamp = %pending.stamp, "discarding superseded generation result");
      return Err(Error::Superseded(pending.stamp));
    }
    let generation = result.inspect_err(|err| {
      warn!(stamp = %pending.stamp, error = %err, "generation failed");
    })?;
    self.accept(
      &pending.request.intent,
      generation,
      pending.request.parent_version_id,
    )
  }

  /// Newest first.
  pub fn current_history(&self) -> &[Artifact] { self.history.artifacts() }

  pub fn history(&self) -> &H { &self.history }

  pub fn displayed(&self) -> Option<&Displayed> { self.displayed.as_ref() }

  /// The state of the displayed run, or `Idle` before anything was shown.
  pub fn state(&self) -> PipelineState {
    self
      .displayed
      .as_ref()
      .map_or(PipelineState::Idle, |d| d.run.state)
  }

  fn displayed_version(&self) -> Option<VersionId> {
    self.displayed.as_ref().and_then(|d| d.version)
  }

  fn accept(
    &mut self,
    intent: &str,
    generation: Generation,
    parent: Option<VersionId>,
  ) -> Result<(Artifact, PipelineRun)> {
    let generation_id = generation.id;
    let artifact =
      NewArtifact::from_generation(intent, generation, parent).issue(&mut self.versions);
    self.append(artifact.clone())?;
    info!(
      version = %artifact.id,
      generation = generation_id,
      "generation accepted into history"
    );
    let run = self.display(Some(artifact.id), &artifact.source);
    Ok((artifact, run))
  }

  fn append(&mut self, artifact: Artifact) -> Result<()> {
    let id = artifact.id;
    self
      .history
      .append(artifact)
      .map_err(|err| Error::History(Box::new(err)))?;
    info!(version = %id, "appended to history");
    Ok(())
  }

  fn display(&mut self, version: Option<VersionId>, source: &str) -> PipelineRun {
    let run = self.pipeline.run(source);
    self.displayed = Some(Displayed {
      version,
      source: source.to_string(),
      run: run.clone(),
    });
    run
  }
}
