//! Behavioural tests for `MemoryHistory`.

use chrono::{TimeZone, Utc};
use forge_core::{
  Error,
  artifact::{Artifact, ArtifactOrigin},
  history::ArtifactHistory,
  version::VersionId,
};
use pretty_assertions::assert_eq;

use crate::MemoryHistory;

fn artifact(id: u64) -> Artifact {
  Artifact {
    id:          VersionId(id),
    intent:      format!("request {id}"),
    source:      format!("function GeneratedUI() {{ return <p>v{id}</p>; }}"),
    explanation: format!("version {id}"),
    created_at:  Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, id as u32).unwrap(),
    parent:      None,
    origin:      ArtifactOrigin::Generated,
  }
}

fn ids(history: &MemoryHistory) -> Vec<u64> {
  history.artifacts().iter().map(|a| a.id.get()).collect()
}

/// `[v3, v2, v1]`, front first.
fn three() -> MemoryHistory {
  let mut h = MemoryHistory::new();
  for id in 1..=3 {
    h.append(artifact(id)).unwrap();
  }
  h
}

// ─── Append ──────────────────────────────────────────────────────────────────

#[test]
fn append_places_newest_at_front() {
  let mut h = MemoryHistory::new();
  assert!(h.is_empty());

  h.append(artifact(1)).unwrap();
  assert_eq!(h.artifacts()[0].id, VersionId(1));

  h.append(artifact(2)).unwrap();
  assert_eq!(h.artifacts()[0].id, VersionId(2));
  assert_eq!(ids(&h), vec![2, 1]);
  assert_eq!(h.len(), 2);
}

#[test]
fn append_rejects_duplicate_id_and_leaves_history_unchanged() {
  let mut h = three();
  let err = h.append(artifact(2)).unwrap_err();
  assert!(matches!(err, Error::DuplicateVersion(VersionId(2))));
  assert_eq!(ids(&h), vec![3, 2, 1]);
}

#[test]
fn append_rejects_empty_source() {
  let mut h = MemoryHistory::new();
  let mut blank = artifact(1);
  blank.source = "  \n".to_string();
  let err = h.append(blank).unwrap_err();
  assert!(matches!(err, Error::MissingSource(VersionId(1))));
  assert!(h.is_empty());
}

// ─── Rollback ────────────────────────────────────────────────────────────────

#[test]
fn rollback_oldest_moves_it_to_front() {
  let mut h = three();
  let restored = h.rollback(VersionId(1)).expect("v1 present");
  assert_eq!(restored, artifact(1));
  assert_eq!(ids(&h), vec![1, 3, 2]);
}

#[test]
fn rollback_middle_keeps_others_in_order() {
  let mut h = three();
  h.append(artifact(4)).unwrap();
  h.rollback(VersionId(2)).unwrap();
  assert_eq!(ids(&h), vec![2, 4, 3, 1]);
}

#[test]
fn rollback_front_is_a_no_op_reorder() {
  let mut h = three();
  let restored = h.rollback(VersionId(3)).unwrap();
  assert_eq!(restored.id, VersionId(3));
  assert_eq!(ids(&h), vec![3, 2, 1]);
}

#[test]
fn rollback_absent_id_returns_none_and_preserves_history() {
  let mut h = three();
  let before = h.artifacts().to_vec();
  assert!(h.rollback(VersionId(99)).is_none());
  assert_eq!(h.artifacts(), before.as_slice());
}

#[test]
fn rollback_preserves_the_set_of_artifacts() {
  let mut h = three();
  h.rollback(VersionId(2)).unwrap();
  h.rollback(VersionId(1)).unwrap();
  let mut sorted = ids(&h);
  sorted.sort();
  assert_eq!(sorted, vec![1, 2, 3]);
}

// ─── Lookup and construction ─────────────────────────────────────────────────

#[test]
fn get_does_not_reorder() {
  let h = three();
  assert_eq!(h.get(VersionId(1)).map(|a| a.id), Some(VersionId(1)));
  assert!(h.get(VersionId(9)).is_none());
  assert_eq!(ids(&h), vec![3, 2, 1]);
}

#[test]
fn from_newest_first_keeps_order() {
  let h =
    MemoryHistory::from_newest_first(vec![artifact(5), artifact(2), artifact(1)])
      .unwrap();
  assert_eq!(ids(&h), vec![5, 2, 1]);
}

#[test]
fn from_newest_first_rejects_duplicates() {
  let err = MemoryHistory::from_newest_first(vec![artifact(1), artifact(1)])
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateVersion(_)));
}

#[test]
fn iter_walks_newest_first() {
  let h = three();
  let ids: Vec<u64> = h.iter().map(|a| a.id.get()).collect();
  assert_eq!(ids, vec![3, 2, 1]);
}
