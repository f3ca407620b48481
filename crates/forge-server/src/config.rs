//! Server configuration: an optional TOML file plus `FORGE_` environment
//! overrides (`FORGE_PORT=8080`, `FORGE_ENGINE__FUEL=50000`).

use std::path::Path;

use anyhow::Context as _;
use forge_engine::EngineConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:      String,
  pub port:      u16,
  pub engine:    EngineConfig,
  pub generator: GeneratorConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:      "127.0.0.1".to_string(),
      port:      3001,
      engine:    EngineConfig::default(),
      generator: GeneratorConfig::default(),
    }
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
  /// Artificial delay before a canned response, to mimic a live service.
  pub latency_ms: u64,
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(environment())
      .build()
      .context("failed to read configuration")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// `FORGE_PORT`, `FORGE_ENGINE__FUEL` and so on, with numbers parsed.
fn environment() -> config::Environment {
  config::Environment::with_prefix("FORGE")
    .prefix_separator("_")
    .separator("__")
    .try_parsing(true)
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/forge.toml")).unwrap();
    assert_eq!(cfg.port, 3001);
    assert_eq!(cfg.engine, EngineConfig::default());
    assert_eq!(cfg.generator.latency_ms, 0);
  }

  #[test]
  fn partial_tables_keep_remaining_defaults() {
    let cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from_str(
        "port = 9000\n[engine]\nfuel = 500\n",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:9000");
    assert_eq!(cfg.engine.fuel, 500);
    assert_eq!(cfg.engine.cache_capacity, 64);
  }

  #[test]
  fn environment_overrides_the_file() {
    let vars = config::Map::from([
      ("FORGE_ENGINE__FUEL".to_string(), "2500".to_string()),
      ("FORGE_PORT".to_string(), "8080".to_string()),
      ("OTHER_PORT".to_string(), "1".to_string()),
    ]);
    let cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from_str(
        "port = 9000
[engine]
fuel = 500
max_elements = 20
",
        config::FileFormat::Toml,
      ))
      .add_source(environment().source(Some(vars)))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.engine.fuel, 2500);
    assert_eq!(cfg.engine.max_elements, 20);
    assert_eq!(cfg.engine.max_output_bytes, 1 << 20);
  }
}
