//! API gateway (v1)
//!
//! Forwards `/api/*` to the catering backend and serves the admin session
//! endpoints.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────┐
//!                       │                   API GATEWAY                    │
//!                       │                                                  │
//!   Client Request      │  ┌──────────┐   ┌──────────┐   ┌─────────────┐   │
//!   ────────────────────┼─▶│ listener │──▶│  router  │──▶│ /api/{*path}│   │
//!                       │  │ (tcp/tls)│   │ req id,  │   │   proxy     │   │
//!                       │  └──────────┘   │ trace    │   └──────┬──────┘   │
//!                       │                 └────┬─────┘          │          │
//!                       │                      ▼                ▼          │
//!                       │               ┌────────────┐   ┌─────────────┐   │
//!   Client Response     │               │  /admin    │   │  upstream   │◀──┼── Backend
//!   ◀───────────────────┼───────────────│  sessions  │   │  client     │   │   API
//!                       │               └────────────┘   └─────────────┘   │
//!                       │                                                  │
//!                       │  config (+ hot reload) · logging · metrics ·     │
//!                       │  shutdown                                        │
//!                       └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use api_gateway::config::watcher::ConfigWatcher;
use api_gateway::config::{load_config, load_default, validation::validate_config, ConfigError};
use api_gateway::http::HttpServer;
use api_gateway::lifecycle::{signals::spawn_signal_handler, Shutdown};
use api_gateway::observability::{logging::init_logging, metrics::init_metrics};
use api_gateway::upstream::EnvBackendUrl;

#[derive(Parser)]
#[command(name = "api-gateway", version, about = "Reverse proxy for the catering backend API")]
struct Args {
    /// TOML configuration file; watched for changes when given.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_default()?,
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "api-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        fallback_url = %config.upstream.fallback_url,
        request_timeout_secs = config.upstream.request_timeout_secs,
        environment = ?config.auth.environment,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config.clone())?;

    let backend = EnvBackendUrl::new(server.state().config.clone());
    if backend.using_fallback() {
        if config.auth.environment.is_production() {
            tracing::warn!(
                fallback_url = %config.upstream.fallback_url,
                "NEXT_PUBLIC_API_URL and BACKEND_API_URL are unset; using the fallback backend"
            );
        } else {
            tracing::info!(fallback_url = %config.upstream.fallback_url, "Using fallback backend URL");
        }
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    match &config.listener.tls {
        Some(tls) => {
            let addr: SocketAddr = config.listener.bind_address.parse()?;
            server.run_tls(addr, tls, config_updates, shutdown.subscribe()).await?;
        }
        None => {
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            tracing::info!(address = %listener.local_addr()?, "Listening for connections");
            server.run(listener, config_updates, shutdown.subscribe()).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
