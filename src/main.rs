//! Prompt Trainer Backend
//!
//! - Axum HTTP + WebSocket API for prompt evaluation and phase progression
//! - Optional external grader (OpenAI-compatible, via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   OPENAI_API_KEY      : enables the external grader if present
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_GRADER_MODEL : default "gpt-4o"
//!   AGENT_CONFIG_PATH   : path to TOML config (grader prompts + rubric overrides)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use prompt_trainer::routes::build_router;
use prompt_trainer::state::AppState;
use prompt_trainer::telemetry;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared application state (progress and history stores, rubrics, grader).
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "prompt_trainer", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "prompt_trainer", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "prompt_trainer", error = %e, "Failed to listen for ctrl-c");
  }
}
