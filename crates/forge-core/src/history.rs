//! The `ArtifactHistory` trait.
//!
//! The trait is implemented by history backends (e.g. `forge-history`). The
//! session depends on this abstraction, not on a concrete backend.

use crate::{artifact::Artifact, version::VersionId};

/// An ordered, newest-first sequence of accepted artifacts.
///
/// Both mutations are whole-sequence operations: after either returns, the
/// sequence is in its final state.
pub trait ArtifactHistory {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert `artifact` at the front.
  ///
  /// Returns an error if the id is already present or the source is empty.
  /// The sequence is unchanged on error.
  fn append(&mut self, artifact: Artifact) -> Result<(), Self::Error>;

  /// Move the artifact with `id` to the front and return a copy of it.
  ///
  /// All other artifacts keep their relative order. Returns `None` and leaves
  /// the sequence unchanged if `id` is absent.
  fn rollback(&mut self, id: VersionId) -> Option<Artifact>;

  /// Look up an artifact without reordering.
  fn get(&self, id: VersionId) -> Option<&Artifact>;

  /// The artifacts, front (newest) first.
  fn artifacts(&self) -> &[Artifact];

  fn len(&self) -> usize { self.artifacts().len() }

  fn is_empty(&self) -> bool { self.artifacts().is_empty() }

  /// Iterate front (newest) first.
  fn iter(&self) -> std::slice::Iter<'_, Artifact> { self.artifacts().iter() }
}
