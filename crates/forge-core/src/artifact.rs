//! Artifacts: the unit of generated UI.
//!
//! An artifact pairs a UI description text with the request that produced it.
//! Artifacts are never updated; an edit produces a new artifact with a new
//! [`VersionId`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
  generation::Generation,
  version::{VersionId, VersionIssuer},
};

// ─── Origin ──────────────────────────────────────────────────────────────────

/// How an artifact came into being.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactOrigin {
  /// Accepted from the generation service.
  #[default]
  Generated,
  /// Typed or pasted by the user over the displayed source.
  Edited,
}

// ─── Artifact ────────────────────────────────────────────────────────────────

/// An immutable, identified UI description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
  pub id:          VersionId,
  /// The natural-language request. Empty for direct edits.
  pub intent:      String,
  pub source:      String,
  pub explanation: String,
  pub created_at:  DateTime<Utc>,
  /// The version on display when this artifact was requested, if any.
  pub parent:      Option<VersionId>,
  pub origin:      ArtifactOrigin,
}

impl Artifact {
  /// Hex SHA-256 of the source text. Equal sources always share a digest.
  pub fn source_digest(&self) -> String { source_digest(&self.source) }
}

/// Hex SHA-256 of a UI description text.
pub fn source_digest(source: &str) -> String {
  hex::encode(Sha256::digest(source.as_bytes()))
}

// ─── NewArtifact ─────────────────────────────────────────────────────────────

/// An artifact that has not been given an identity yet.
///
/// Call [`NewArtifact::issue`] to turn it into an [`Artifact`]; the id always
/// comes from a [`VersionIssuer`], never from the caller.
#[derive(Debug, Clone)]
pub struct NewArtifact {
  pub intent:      String,
  pub source:      String,
  pub explanation: String,
  pub created_at:  DateTime<Utc>,
  pub parent:      Option<VersionId>,
  pub origin:      ArtifactOrigin,
}

impl NewArtifact {
  /// Draft an artifact from an accepted generation result.
  pub fn from_generation(
    intent: impl Into<String>,
    generation: Generation,
    parent: Option<VersionId>,
  ) -> Self {
    Self {
      intent: intent.into(),
      source: generation.code,
      explanation: generation.explanation,
      created_at: generation.timestamp,
      parent,
      origin: ArtifactOrigin::Generated,
    }
  }

  /// Draft an artifact from a direct edit of the displayed source.
  pub fn edit(source: impl Into<String>, parent: Option<VersionId>) -> Self {
    Self {
      intent: String::new(),
      source: source.into(),
      explanation: "Edited by hand.".to_string(),
      created_at: Utc::now(),
      parent,
      origin: ArtifactOrigin::Edited,
    }
  }

  pub fn issue(self, issuer: &mut VersionIssuer) -> Artifact {
    Artifact {
      id:          issuer.issue(),
      intent:      self.intent,
      source:      self.source,
      explanation: self.explanation,
      created_at:  self.created_at,
      parent:      self.parent,
      origin:      self.origin,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn generation(code: &str) -> Generation {
    Generation {
      id:          7,
      code:        code.to_string(),
      explanation: "made a card".to_string(),
      timestamp:   Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
    }
  }

  #[test]
  fn generated_artifact_takes_fields_from_generation() {
    let mut issuer = VersionIssuer::new();
    let artifact =
      NewArtifact::from_generation("a card", generation("<Card />"), None)
        .issue(&mut issuer);

    assert_eq!(artifact.id, VersionId(1));
    assert_eq!(artifact.intent, "a card");
    assert_eq!(artifact.source, "<Card />");
    assert_eq!(artifact.explanation, "made a card");
    assert_eq!(artifact.origin, ArtifactOrigin::Generated);
    assert_eq!(
      artifact.created_at,
      Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    );
  }

  #[test]
  fn edits_have_empty_intent_and_remember_parent() {
    let mut issuer = VersionIssuer::after(VersionId(3));
    let artifact =
      NewArtifact::edit("function A() {}", Some(VersionId(3))).issue(&mut issuer);
    assert_eq!(artifact.id, VersionId(4));
    assert!(artifact.intent.is_empty());
    assert_eq!(artifact.parent, Some(VersionId(3)));
    assert_eq!(artifact.origin, ArtifactOrigin::Edited);
  }

  #[test]
  fn digest_depends_only_on_source() {
    let mut issuer = VersionIssuer::new();
    let a = NewArtifact::edit("same", None).issue(&mut issuer);
    let b = NewArtifact::edit("same", None).issue(&mut issuer);
    assert_ne!(a.id, b.id);
    assert_eq!(a.source_digest(), b.source_digest());
    assert_eq!(a.source_digest().len(), 64);
    assert_ne!(a.source_digest(), source_digest("other"));
  }
}
