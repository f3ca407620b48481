//! Monotonic identities: artifact versions and request stamps.
//!
//! Both counters are explicit values with a single owner (the session), never
//! module-level state, so a fresh issuer starts a fresh sequence.

use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Versions ────────────────────────────────────────────────────────────────

/// The identity of an [`Artifact`](crate::artifact::Artifact).
///
/// Versions are issued in strictly increasing order by a [`VersionIssuer`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VersionId(pub u64);

impl VersionId {
  pub fn get(self) -> u64 { self.0 }
}

impl fmt::Display for VersionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hands out [`VersionId`]s. The first id issued is `1`.
#[derive(Debug, Clone, Default)]
pub struct VersionIssuer {
  last: u64,
}

impl VersionIssuer {
  pub fn new() -> Self { Self::default() }

  /// Continue a sequence after `last`, e.g. when seeding a session from
  /// previously exported artifacts.
  pub fn after(last: VersionId) -> Self { Self { last: last.0 } }

  pub fn issue(&mut self) -> VersionId {
    self.last += 1;
    VersionId(self.last)
  }

  /// The most recently issued id, if any.
  pub fn last(&self) -> Option<VersionId> {
    (self.last > 0).then_some(VersionId(self.last))
  }
}

// ─── Stamps ──────────────────────────────────────────────────────────────────

/// A tag attached to an in-flight request (a pipeline submission or a
/// generation call). Only the result carrying the latest stamp may be shown.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Stamp(u64);

impl fmt::Display for Stamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// Issues [`Stamp`]s and answers whether a given stamp is still the latest.
#[derive(Debug, Clone, Default)]
pub struct StampIssuer {
  latest: u64,
}

impl StampIssuer {
  pub fn new() -> Self { Self::default() }

  pub fn issue(&mut self) -> Stamp {
    self.latest += 1;
    Stamp(self.latest)
  }

  /// `true` iff no stamp has been issued after `stamp`.
  pub fn is_latest(&self, stamp: Stamp) -> bool { stamp.0 == self.latest }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn versions_start_at_one_and_increase() {
    let mut issuer = VersionIssuer::new();
    assert_eq!(issuer.last(), None);
    assert_eq!(issuer.issue(), VersionId(1));
    assert_eq!(issuer.issue(), VersionId(2));
    assert_eq!(issuer.last(), Some(VersionId(2)));
  }

  #[test]
  fn separate_issuers_do_not_share_state() {
    let mut a = VersionIssuer::new();
    let mut b = VersionIssuer::new();
    a.issue();
    a.issue();
    assert_eq!(b.issue(), VersionId(1));
  }

  #[test]
  fn issuer_can_resume_after_a_known_version() {
    let mut issuer = VersionIssuer::after(VersionId(41));
    assert_eq!(issuer.issue(), VersionId(42));
  }

  #[test]
  fn only_the_newest_stamp_is_latest() {
    let mut stamps = StampIssuer::new();
    let first = stamps.issue();
    assert!(stamps.is_latest(first));
    let second = stamps.issue();
    assert!(!stamps.is_latest(first));
    assert!(stamps.is_latest(second));
  }
}
