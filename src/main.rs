//! CodeCase Detective Academy · Mission Validator Backend
//!
//! - Axum HTTP + WebSocket API around the mission validator
//! - Built-in cases, optionally extended by a TOML casebook
//! - Static editor fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   CASEBOOK_PATH : path to a TOML casebook (extra cases + scoring defaults)
//!   STATIC_DIR    : directory served as the frontend (default "./static")
//!   LOG_LEVEL     : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT    : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use codecase_backend::config::Settings;
use codecase_backend::routes::build_router;
use codecase_backend::state::AppState;
use codecase_backend::telemetry;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let settings = Settings::from_env();

  // Build shared application state (immutable case catalog).
  let state = Arc::new(AppState::new(&settings));

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state, &settings.static_dir);

  let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "codecase_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "codecase_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "codecase_backend", error = %e, "Failed to listen for Ctrl-C");
    std::future::pending::<()>().await;
  }
  info!(target: "codecase_backend", "Shutdown signal received");
}
