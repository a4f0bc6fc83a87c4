use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::prelude::*;

mod config;
mod handlers;
mod registry;
mod relay;
mod views;

use crate::config::MonitorConfig;
use crate::relay::EventRelay;

/// CloudEvents bodies are small; 2 MiB leaves generous headroom.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "beacon-monitor")]
#[command(about = "Live web transcript for the beacon pub/sub channel")]
struct Cli {
    /// Port for the web server (overrides DAPR_APP_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Host to bind to
    #[arg(short = 'b', long, default_value = "0.0.0.0")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub config: Arc<MonitorConfig>,
    pub relay: Arc<EventRelay>,
    pub started_at: Instant,
}

fn app(state: AppState) -> Router {
    let topic_route = state.config.topic_route();

    Router::new()
        .route("/", get(views::transcript_page))
        .route(&topic_route, post(handlers::ingest_event))
        .route("/dapr/subscribe", get(handlers::dapr_subscribe))
        .route("/events", get(handlers::event_stream))
        .route("/transcript/events", get(handlers::transcript_stream))
        .route("/health", get(handlers::health_handler))
        .route("/health/live", get(handlers::health_live_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = MonitorConfig::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }

    // Setup logging
    let default_directive = if cli.debug {
        "beacon_monitor=debug,tower_http=debug,info".to_string()
    } else {
        format!(
            "beacon_monitor={level},tower_http=warn,{level}",
            level = config.log_level
        )
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();

    info!("Starting Beacon Monitor");

    let state = AppState {
        config: Arc::new(config),
        relay: Arc::new(EventRelay::new()),
        started_at: Instant::now(),
    };

    // (host, port) resolves hostnames too, so `--host localhost` works.
    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), state.config.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", cli.host, state.config.port))?;
    let actual_addr = listener.local_addr()?;

    info!(
        "Beacon Monitor listening on http://{} | topic={} pubsub={}",
        actual_addr, state.config.topic, state.config.pubsub_name
    );

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received shutdown signal");
    };

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context("Server error")
}

/// Default-config state for handler tests.
#[cfg(test)]
pub(crate) fn test_state() -> AppState {
    AppState {
        config: Arc::new(MonitorConfig {
            port: 0,
            pubsub_name: "pubsub".to_string(),
            topic: "beacon_channel".to_string(),
            log_level: "info".to_string(),
        }),
        relay: Arc::new(EventRelay::new()),
        started_at: Instant::now(),
    }
}

/// Router over a default-config state, for handler tests.
#[cfg(test)]
pub(crate) fn test_app() -> Router {
    app(test_state())
}
