//! Engine settings, deserialised from the `[engine]` table of the server
//! configuration.

use serde::{Deserialize, Serialize};

use crate::sandbox::Limits;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Pipeline outcomes kept in the memo cache, by exact source text. Each
  /// entry holds at most `max_output_bytes` of HTML.
  pub cache_capacity:   usize,
  pub max_call_depth:   usize,
  pub max_nesting:      usize,
  /// Evaluation steps allowed per pipeline run.
  pub fuel:             u64,
  pub max_elements:     usize,
  pub max_output_bytes: usize,
}

impl EngineConfig {
  pub fn limits(&self) -> Limits {
    Limits {
      max_call_depth:   self.max_call_depth,
      max_nesting:      self.max_nesting,
      fuel:             self.fuel,
      max_elements:     self.max_elements,
      max_output_bytes: self.max_output_bytes,
    }
  }
}

impl Default for EngineConfig {
  fn default() -> Self {
    let limits = Limits::default();
    Self {
      cache_capacity:   64,
      max_call_depth:   limits.max_call_depth,
      max_nesting:      limits.max_nesting,
      fuel:             limits.fuel,
      max_elements:     limits.max_elements,
      max_output_bytes: limits.max_output_bytes,
    }
  }
}
