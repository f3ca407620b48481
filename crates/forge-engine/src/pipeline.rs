//! The render pipeline: validate, transform, instantiate, render.
//!
//! Each run walks the state machine
//!
//! ```text
//! Idle → Validating → Rejected
//!                   → Transforming → TransformFailed
//!                                  → Instantiating → InstantiateFailed
//!                                                  → Rendering → RenderFailed
//!                                                              → Rendered
//! ```
//!
//! and records the states it passed through. Outcomes are pure functions of
//! the source text, so they are memoised by exact text in a bounded LRU; a
//! failed source stays failed until the text changes.

use std::num::NonZeroUsize;

use forge_core::artifact::source_digest;
use lru::LruCache;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{
  config::EngineConfig,
  error::PipelineError,
  policy::Policy,
  sandbox::{self, Limits, RenderedOutput, SandboxBinding},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
  Idle,
  Validating,
  Rejected,
  Transforming,
  TransformFailed,
  Instantiating,
  InstantiateFailed,
  Rendering,
  RenderFailed,
  Rendered,
}

impl PipelineState {
  /// `true` for states a run stops in.
  pub fn is_terminal(self) -> bool {
    matches!(
      self,
      Self::Rejected
        | Self::TransformFailed
        | Self::InstantiateFailed
        | Self::RenderFailed
        | Self::Rendered
    )
  }
}

/// The record of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
  pub source_digest: String,
  /// The terminal state.
  pub state:         PipelineState,
  /// Every state entered, in order, ending with `state`.
  pub trace:         Vec<PipelineState>,
  pub outcome:       Result<RenderedOutput, PipelineError>,
  /// Whether the outcome came from the memo cache.
  pub cached:        bool,
}

impl PipelineRun {
  pub fn is_rendered(&self) -> bool { self.state == PipelineState::Rendered }
}

type Outcome = (Vec<PipelineState>, Result<RenderedOutput, PipelineError>);

pub struct Pipeline {
  policy: Policy,
  limits: Limits,
  /// `None` when the configured capacity is zero.
  cache:  Option<LruCache<String, Outcome>>,
}

impl Pipeline {
  pub fn new(config: &EngineConfig) -> Result<Self, regex::Error> {
    Ok(Self {
      policy: Policy::new()?,
      limits: config.limits(),
      cache:  NonZeroUsize::new(config.cache_capacity).map(LruCache::new),
    })
  }

  /// Drive `source` through every stage, or return the memoised outcome.
  pub fn run(&mut self, source: &str) -> PipelineRun {
    let digest = source_digest(source);

    if let Some((trace, outcome)) = self.cache.as_mut().and_then(|c| c.get(source)) {
      debug!(source = short(&digest), "pipeline outcome served from cache");
      return finish(digest, trace.clone(), outcome.clone(), true);
    }

    let mut trace = vec![PipelineState::Validating];
    let outcome = self.execute(source, &digest, &mut trace);
    if let Err(err) = &outcome {
      warn!(
        source = short(&digest),
        stage = ?err.stage(),
        error = %err,
        "pipeline run failed"
      );
    }

    if let Some(cache) = self.cache.as_mut() {
      cache.put(source.to_string(), (trace.clone(), outcome.clone()));
    }
    finish(digest, trace, outcome, false)
  }

  fn execute(
    &self,
    source: &str,
    digest: &str,
    trace: &mut Vec<PipelineState>,
  ) -> Result<RenderedOutput, PipelineError> {
    let digest = short(digest);

    debug!(source = digest, "validating");
    if let Err(err) = self.policy.validate(source) {
      trace.push(PipelineState::Rejected);
      return Err(err.into());
    }

    trace.push(PipelineState::Transforming);
    debug!(source = digest, "transforming");
    let definition = match forge_markup::transform(source) {
      Ok(definition) => definition,
      Err(err) => {
        trace.push(PipelineState::TransformFailed);
        return Err(err.into());
      }
    };

    trace.push(PipelineState::Instantiating);
    debug!(source = digest, entry = %definition.entry, "instantiating");
    let component = match sandbox::instantiate(&definition, SandboxBinding::new(), self.limits) {
      Ok(component) => component,
      Err(err) => {
        trace.push(PipelineState::InstantiateFailed);
        return Err(err.into());
      }
    };

    trace.push(PipelineState::Rendering);
    debug!(source = digest, "rendering");
    match sandbox::render(component) {
      Ok(output) => {
        trace.push(PipelineState::Rendered);
        debug!(source = digest, elements = output.element_count, "rendered");
        Ok(output)
      }
      Err(err) => {
        trace.push(PipelineState::RenderFailed);
        Err(err.into())
      }
    }
  }
}

fn finish(
  source_digest: String,
  trace: Vec<PipelineState>,
  outcome: Result<RenderedOutput, PipelineError>,
  cached: bool,
) -> PipelineRun {
  let state = trace.last().copied().unwrap_or(PipelineState::Idle);
  PipelineRun {
    source_digest,
    state,
    trace,
    outcome,
    cached,
  }
}

/// Enough of a digest to tell runs apart in logs.
fn short(digest: &str) -> &str { digest.get(..12).unwrap_or(digest) }

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::error::{InstantiationError, RenderError, Stage};
  use super::PipelineState::*;

  fn pipeline() -> Pipeline { Pipeline::new(&EngineConfig::default()).unwrap() }

  const CARD: &str = r#"
    import React from 'react';
    import { Card, Button } from '@/components/ui';
    function GeneratedUI() {
      return <Card title="Welcome"><Button>Start</Button></Card>;
    }
  "#;

  #[test]
  fn whitelisted_source_reaches_rendered() {
    let run = pipeline().run(CARD);
    assert_eq!(run.trace, vec![Validating, Transforming, Instantiating, Rendering, Rendered]);
    assert_eq!(run.state, Rendered);
    assert!(run.is_rendered());
    let html = run.outcome.unwrap().html;
    assert!(html.contains("Welcome"));
    assert!(html.contains(">Start</button>"));
  }

  #[test]
  fn prohibited_import_never_reaches_later_stages() {
    let run = pipeline().run(
      "import { Foo } from 'some-lib';\nfunction GeneratedUI() { return <Foo />; }",
    );
    assert_eq!(run.trace, vec![Validating, Rejected]);
    let err = run.outcome.unwrap_err();
    assert_eq!(err.stage(), Stage::Validation);
    assert!(err.to_string().contains("import { Foo } from 'some-lib'"));
  }

  #[test]
  fn each_stage_failure_is_classified() {
    let mut pipeline = pipeline();

    let run = pipeline.run("function GeneratedUI() { for (;;) {} }");
    assert_eq!(run.trace, vec![Validating, Transforming, TransformFailed]);
    assert_eq!(run.outcome.unwrap_err().stage(), Stage::Transform);

    let run = pipeline.run("function GeneratedUI() { return <iframe src=\"x\" />; }");
    assert_eq!(run.state, InstantiateFailed);
    assert!(matches!(
      run.outcome,
      Err(PipelineError::Instantiation(InstantiationError::UnknownTag { .. }))
    ));

    let run = pipeline.run("function GeneratedUI() { const a = null; return <p>{a.b}</p>; }");
    assert_eq!(run.trace.last(), Some(&RenderFailed));
    assert!(matches!(run.outcome, Err(PipelineError::Render(RenderError::Type(_)))));
  }

  #[test]
  fn repeated_sources_are_served_from_cache() {
    let mut pipeline = pipeline();
    let first = pipeline.run(CARD);
    let second = pipeline.run(CARD);
    assert!(!first.cached);
    assert!(second.cached);
    assert_eq!(first.outcome, second.outcome);
    assert_eq!(first.trace, second.trace);
    assert_eq!(first.source_digest, second.source_digest);

    let changed = pipeline.run(&CARD.replace("Welcome", "Hello"));
    assert!(!changed.cached);
    assert_ne!(changed.source_digest, first.source_digest);
  }

  #[test]
  fn failed_sources_stay_failed() {
    let mut pipeline = pipeline();
    let src = "<div style={{ color: 'red' }} />";
    assert_eq!(pipeline.run(src).state, Rejected);
    let again = pipeline.run(src);
    assert!(again.cached);
    assert_eq!(again.state, Rejected);
  }

  #[test]
  fn zero_capacity_disables_the_cache() {
    let config = EngineConfig {
      cache_capacity: 0,
      ..EngineConfig::default()
    };
    let mut pipeline = Pipeline::new(&config).unwrap();
    pipeline.run(CARD);
    assert!(!pipeline.run(CARD).cached);
  }

  #[test]
  fn only_final_states_are_terminal() {
    assert!(!Idle.is_terminal());
    assert!(!Rendering.is_terminal());
    assert!(Rejected.is_terminal());
    assert!(Rendered.is_terminal());
  }
}
