//! forge server binary.
//!
//! Reads `forge.toml` (or the path given with `--config`), builds an
//! in-memory session, and serves the preview API under `/api`.
//!
//! ```
//! cargo run -p forge-server --bin forge -- --config forge.toml
//! ```

mod canned;
mod config;

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use axum::{Json, Router, routing::get};
use clap::Parser;
use forge_api::AppState;
use forge_engine::Session;
use forge_history::MemoryHistory;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{canned::CannedGenerator, config::ServerConfig};

#[derive(Parser)]
#[command(author, version, about = "forge UI preview server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "forge.toml")]
  config: PathBuf,

  /// Listen on this port instead of the configured one.
  #[arg(short, long)]
  port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load {}", cli.config.display()))?;
  if let Some(port) = cli.port {
    server_cfg.port = port;
  }

  let session = Session::new(MemoryHistory::new(), &server_cfg.engine)
    .context("failed to build session")?;
  let generator =
    CannedGenerator::new(Duration::from_millis(server_cfg.generator.latency_ms));
  let state = AppState::new(session, generator);

  let app = Router::new()
    .route("/health", get(health))
    .nest("/api", forge_api::api_router(state))
    .layer(TraceLayer::new_for_http());

  let address = server_cfg.address();
  tracing::info!(
    cache = server_cfg.engine.cache_capacity,
    fuel = server_cfg.engine.fuel,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// `GET /health`
async fn health() -> Json<Value> { Json(json!({ "status": "ok", "mode": "canned" })) }
