//! [`MemoryHistory`]: the in-memory implementation of [`ArtifactHistory`].

use forge_core::{
  Error, Result, artifact::Artifact, history::ArtifactHistory, version::VersionId,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A newest-first artifact history held in a `Vec`.
///
/// Index 0 is the front. Histories are short (one entry per accepted
/// generation), so front insertion is a plain `Vec::insert`.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
  artifacts: Vec<Artifact>,
}

impl MemoryHistory {
  pub fn new() -> Self { Self::default() }

  /// Build a history from artifacts already in newest-first order.
  ///
  /// Fails on the first duplicate id or empty source; ids are checked the
  /// same way [`ArtifactHistory::append`] checks them.
  pub fn from_newest_first(artifacts: Vec<Artifact>) -> Result<Self> {
    let mut history = Self::new();
    for artifact in artifacts.into_iter().rev() {
      history.append(artifact)?;
    }
    Ok(history)
  }

  fn position(&self, id: VersionId) -> Option<usize> {
    self.artifacts.iter().position(|a| a.id == id)
  }
}

impl ArtifactHistory for MemoryHistory {
  type Error = Error;

  fn append(&mut self, artifact: Artifact) -> Result<()> {
    if artifact.source.trim().is_empty() {
      return Err(Error::MissingSource(artifact.id));
    }
    if self.position(artifact.id).is_some() {
      return Err(Error::DuplicateVersion(artifact.id));
    }
    self.artifacts.insert(0, artifact);
    Ok(())
  }

  fn rollback(&mut self, id: VersionId) -> Option<Artifact> {
    let index = self.position(id)?;
    let artifact = self.artifacts.remove(index);
    self.artifacts.insert(0, artifact.clone());
    Some(artifact)
  }

  fn get(&self, id: VersionId) -> Option<&Artifact> {
    self.artifacts.iter().find(|a| a.id == id)
  }

  fn artifacts(&self) -> &[Artifact] { &self.artifacts }
}
