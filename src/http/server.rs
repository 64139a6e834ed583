//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the proxy and admin handlers
//! - Wire up middleware (request ID, tracing)
//! - Serve on a plain TCP listener or behind TLS
//! - Apply configuration reloads to the live snapshot
//! - Drain in-flight requests on shutdown

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{body::Body, http::Request, middleware, routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::trace::TraceLayer;

use crate::admin::setup_admin_router;
use crate::auth::{TokenError, TokenSigner};
use crate::config::watcher::apply_updates;
use crate::config::{GatewayConfig, TlsConfig};
use crate::http::proxy::proxy_handler;
use crate::http::request_id::{assign_request_id, RequestIdExt};
use crate::lifecycle::shutdown;
use crate::net::tls::load_tls_config;
use crate::upstream::{BackendUrlProvider, EnvBackendUrl, UpstreamClient};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Live configuration, swapped on reload.
    pub config: Arc<ArcSwap<GatewayConfig>>,
    pub backend_url: Arc<dyn BackendUrlProvider>,
    pub client: UpstreamClient,
    pub tokens: Arc<TokenSigner>,
}

impl AppState {
    /// State with the environment-driven backend URL provider.
    pub fn new(config: GatewayConfig) -> Result<Self, TokenError> {
        let tokens = Arc::new(TokenSigner::from_config(&config.auth)?);
        let client = UpstreamClient::new(&config.upstream);
        let config = Arc::new(ArcSwap::from_pointee(config));
        let backend_url: Arc<dyn BackendUrlProvider> = Arc::new(EnvBackendUrl::new(config.clone()));

        Ok(Self {
            config,
            backend_url,
            client,
            tokens,
        })
    }

    /// Replace the backend URL provider.
    pub fn with_backend_url<P>(mut self, provider: P) -> Self
    where
        P: BackendUrlProvider + 'static,
    {
        self.backend_url = Arc::new(provider);
        self
    }
}

/// Build the Axum router with all middleware layers.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().route("/api/{*path}", any(proxy_handler));
    if state.config.load().admin.enabled {
        router = router.merge(setup_admin_router(state.clone()));
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request.request_id().map(ToString::to_string).unwrap_or_default();
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(middleware::from_fn(assign_request_id))
}

/// HTTP server for the gateway.
pub struct HttpServer {
    state: AppState,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, TokenError> {
        Ok(Self::from_state(AppState::new(config)?))
    }

    pub fn from_state(state: AppState) -> Self {
        let router = build_router(state.clone());
        Self { state, router }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server on a plain TCP listener until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        tokio::spawn(apply_updates(
            self.state.config.clone(),
            config_updates,
            shutdown.resubscribe(),
        ));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server behind TLS until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: &TlsConfig,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> io::Result<()> {
        let rustls = load_tls_config(tls).await?;
        let grace = Duration::from_secs(self.state.config.load().listener.shutdown_grace_secs);
        tracing::info!(address = %addr, "HTTPS server starting");

        tokio::spawn(apply_updates(
            self.state.config.clone(),
            config_updates,
            shutdown.resubscribe(),
        ));

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            shutdown::wait(shutdown).await;
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}
