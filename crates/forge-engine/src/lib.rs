//! The forge preview engine.
//!
//! Untrusted UI description text flows through four stages:
//!
//! 1. [`policy`] scans the raw text against a fixed rule list.
//! 2. [`forge_markup::transform`] parses it into a [`forge_markup::Definition`].
//! 3. [`sandbox::instantiate`] evaluates the definition against an explicit
//!    [`sandbox::SandboxBinding`] (the runtime hooks and the [`Primitive`]
//!    whitelist) with no ambient scope.
//! 4. [`sandbox::render`] draws the component to escaped HTML.
//!
//! [`pipeline::Pipeline`] drives the stages and classifies failures;
//! [`session::Session`] ties the pipeline to an artifact history.

pub mod config;
pub mod error;
pub mod html;
pub mod pipeline;
pub mod policy;
pub mod primitive;
pub mod sandbox;
pub mod session;

pub use config::EngineConfig;
pub use error::{Error, PipelineError, Result, Stage};
pub use pipeline::{Pipeline, PipelineRun, PipelineState};
pub use primitive::Primitive;
pub use sandbox::{Limits, RenderedOutput};
pub use session::{Displayed, PendingGeneration, Session};
