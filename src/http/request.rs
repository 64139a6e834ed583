//! Outbound request construction.
//!
//! # Responsibilities
//! - Recover the path segments captured under `/api/`
//! - Percent-encode each segment and join them onto the backend base URL
//! - Carry the query string over verbatim
//! - Copy method and headers (minus hop-by-hop) and attach the body
//!
//! # Design Decisions
//! - Segments are taken from the raw path and decoded one by one, so an
//!   encoded `/` inside a segment never becomes a path boundary
//! - Decoded segments stay raw bytes; escapes that are not UTF-8 reach the
//!   backend unchanged
//! - Segment encoding matches JavaScript's `encodeURIComponent`
//! - GET and HEAD never carry a body; other methods stream the inbound body

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request};
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::security::headers::filter_hop_by_hop;

/// Route prefix owned by the gateway.
pub const API_PREFIX: &str = "/api";

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decoded path segments following `prefix`. Empty segments are skipped.
pub fn path_segments(path: &str, prefix: &str) -> Vec<Vec<u8>> {
    let rest = path.strip_prefix(prefix).unwrap_or(path);
    rest.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).collect())
        .collect()
}

pub fn encode_segment(segment: &[u8]) -> String {
    percent_encode(segment, SEGMENT).to_string()
}

/// `base` + `/` + encoded segments joined by `/`, then `?query` if any.
pub fn build_target_url<S: AsRef<[u8]>>(base: &str, segments: &[S], query: Option<&str>) -> String {
    let mut target = String::with_capacity(base.len() + 64);
    target.push_str(base.trim_end_matches('/'));
    target.push('/');
    let encoded: Vec<String> = segments.iter().map(|s| encode_segment(s.as_ref())).collect();
    target.push_str(&encoded.join("/"));
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    target
}

/// True for methods whose body is never forwarded.
pub fn is_bodiless(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

/// Assemble the request sent to the backend.
pub fn build_upstream_request(
    method: &Method,
    headers: &HeaderMap,
    body: Body,
    target: &str,
) -> Result<Request<Body>, axum::http::Error> {
    let body = if is_bodiless(method) { Body::empty() } else { body };

    let mut builder = Request::builder().method(method.clone()).uri(target);
    if let Some(outbound) = builder.headers_mut() {
        *outbound = filter_hop_by_hop(headers);
    }
    builder.body(body)
}
