//! The `/api/{*path}` forwarding handler.
//!
//! Every method goes through [`forward`]: resolve the backend, rebuild the
//! URL, filter headers, stream the body, relay the answer. There is no
//! per-method logic and no state kept between requests.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request},
    response::{IntoResponse, Response},
};

use crate::http::request_id::RequestIdExt;
use crate::http::request::{build_target_url, build_upstream_request, path_segments, API_PREFIX};
use crate::http::response::relay_response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::upstream::UpstreamError;

/// Entry point mounted on `/api/{*path}`.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .request_id()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown".to_string());
    let method = request.method().clone();
    let segments = path_segments(request.uri().path(), API_PREFIX);

    match forward(&state, request, &segments).await {
        Ok(response) => {
            tracing::debug!(
                request_id = %request_id,
                method = %method,
                status = response.status().as_u16(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Relayed upstream response"
            );
            metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                method = %method,
                kind = e.kind(),
                error = %e,
                "Backend unavailable"
            );
            metrics::record_upstream_failure(e.kind());
            let response = e.into_response();
            metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
            response
        }
    }
}

/// Forward one request to the backend and build the relayed response.
pub async fn forward(
    state: &AppState,
    request: Request<Body>,
    segments: &[Vec<u8>],
) -> Result<Response, UpstreamError> {
    let base = state.backend_url.backend_url();
    let deadline = Duration::from_secs(state.config.load().upstream.request_timeout_secs);

    let (parts, body) = request.into_parts();
    let target = build_target_url(&base, segments, parts.uri.query());
    tracing::debug!(method = %parts.method, target = %target, "Forwarding request");

    let outbound = build_upstream_request(&parts.method, &parts.headers, body, &target)?;
    let is_head = parts.method == Method::HEAD;

    let (upstream, bytes) = state.client.exchange(outbound, !is_head, deadline).await?;
    Ok(relay_response(upstream, (!is_head).then_some(bytes)))
}
