//! HTTP client for the backend.
//!
//! Wraps the hyper-util pooled client over a rustls connector, so the
//! backend may be `http` or `https`. hyper never follows redirects and has
//! no response cache, so a 3xx from the backend reaches the caller as-is.
//! Request bodies are `axum::body::Body` and stream straight through.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{response, Request};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::UpstreamConfig;

/// Anything that prevents a complete upstream exchange.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream target: {0}")]
    InvalidTarget(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read upstream body: {0}")]
    Body(#[source] axum::Error),

    #[error("upstream did not answer within {0:?}")]
    Timeout(Duration),
}

impl UpstreamError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::InvalidTarget(_) => "invalid_target",
            UpstreamError::Request(e) if e.is_connect() => "connect",
            UpstreamError::Request(_) => "request",
            UpstreamError::Body(_) => "body",
            UpstreamError::Timeout(_) => "timeout",
        }
    }
}

/// Pooled client shared by all handlers.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpsConnector<HttpConnector>, Body>,
}

impl UpstreamClient {
    /// Build a client with the configured connect timeout.
    pub fn new(config: &UpstreamConfig) -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }

    /// Send one request and collect the response.
    ///
    /// The body is read into a single buffer unless `read_body` is false,
    /// in which case it is dropped unread. Both steps share `deadline`.
    pub async fn exchange(
        &self,
        request: Request<Body>,
        read_body: bool,
        deadline: Duration,
    ) -> Result<(response::Parts, Bytes), UpstreamError> {
        let attempt = async {
            let response = self.client.request(request).await?;
            let (parts, body) = response.into_parts();
            let bytes = if read_body {
                axum::body::to_bytes(Body::new(body), usize::MAX)
                    .await
                    .map_err(UpstreamError::Body)?
            } else {
                Bytes::new()
            };
            Ok::<_, UpstreamError>((parts, bytes))
        };

        tokio::time::timeout(deadline, attempt)
            .await
            .map_err(|_| UpstreamError::Timeout(deadline))?
    }
}
