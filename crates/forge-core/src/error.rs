//! Error types for `forge-core`.

use thiserror::Error;

use crate::version::VersionId;

#[derive(Debug, Error)]
pub enum Error {
  #[error("version {0} is already present in the history")]
  DuplicateVersion(VersionId),

  #[error("artifact {0} has no source text")]
  MissingSource(VersionId),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
