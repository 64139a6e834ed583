//! Header hygiene between client, gateway and backend.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from forwarded requests
//! - Strip hop-by-hop headers from relayed responses
//! - Force `Cache-Control: no-store` on relayed responses
//!
//! # Design Decisions
//! - One fixed list serves both directions
//! - Multi-valued headers are copied value by value
//! - `host` and `content-length` are recomputed by the client, never copied

use axum::http::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL};

/// Headers that belong to a single connection and are never relayed.
pub const HOP_BY_HOP_HEADERS: [&str; 10] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "host",
    "content-length",
];

/// Returns true if `name` is in [`HOP_BY_HOP_HEADERS`].
///
/// `HeaderName` is always lowercase, so a plain comparison is enough.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP_HEADERS.contains(&name.as_str())
}

/// Copy every header except the hop-by-hop ones.
pub fn filter_hop_by_hop(source: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(source.len());
    for (name, value) in source.iter() {
        if !is_hop_by_hop(name) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

/// Replace any upstream caching directive with `no-store`.
pub fn force_no_store(headers: &mut HeaderMap) {
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
}
