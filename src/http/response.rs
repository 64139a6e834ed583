//! Response relay to the original caller.
//!
//! # Responsibilities
//! - Reproduce the upstream status and body bytes exactly
//! - Drop hop-by-hop headers and force `Cache-Control: no-store`
//! - Map any upstream failure to one fixed 503 JSON response
//!
//! # Design Decisions
//! - The upstream body is opaque; it is never parsed
//! - HEAD responses carry no body
//! - Failures are attempt-once: no retry, no fallback backend

use axum::{
    body::{Body, Bytes},
    http::{response, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::security::headers::{filter_hop_by_hop, force_no_store};
use crate::upstream::UpstreamError;

/// Body of the 503 returned when the backend cannot be reached.
pub const BACKEND_UNAVAILABLE: &str = "Backend unavailable (check that it is running on port 3001)";

/// Build the client response from upstream parts and the buffered body.
pub fn relay_response(upstream: response::Parts, body: Option<Bytes>) -> Response {
    let mut headers = filter_hop_by_hop(&upstream.headers);
    force_no_store(&mut headers);

    let mut response = Response::new(body.map(Body::from).unwrap_or_else(Body::empty));
    *response.status_mut() = upstream.status;
    *response.headers_mut() = headers;
    response
}

/// The fixed 503 response.
pub fn backend_unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": BACKEND_UNAVAILABLE })),
    )
        .into_response()
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        backend_unavailable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    fn upstream_parts(status: StatusCode, headers: &[(&'static str, &'static str)]) -> response::Parts {
        let mut builder = axum::http::Response::builder().status(status);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_relay_keeps_status_headers_and_bytes() {
        let parts = upstream_parts(
            StatusCode::CREATED,
            &[
                ("content-type", "application/octet-stream"),
                ("x-total-count", "42"),
                ("transfer-encoding", "chunked"),
                ("connection", "keep-alive"),
                ("cache-control", "public, max-age=600"),
            ],
        );
        let payload = Bytes::from_static(&[0, 159, 146, 150, 255]);

        let response = relay_response(parts, Some(payload.clone()));
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-total-count"], "42");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert!(!response.headers().contains_key(header::TRANSFER_ENCODING));
        assert!(!response.headers().contains_key(header::CONNECTION));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, payload);
    }

    #[tokio::test]
    async fn test_relay_without_body() {
        let parts = upstream_parts(StatusCode::OK, &[("content-length", "128")]);
        let response = relay_response(parts, None);
        assert!(!response.headers().contains_key(header::CONTENT_LENGTH));
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_backend_unavailable_shape() {
        let response = UpstreamError::Timeout(std::time::Duration::from_secs(1)).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static("application/json")
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "error": BACKEND_UNAVAILABLE }));
    }
}
