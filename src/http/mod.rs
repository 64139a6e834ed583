//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, trace span)
//!     → request_id.rs (reuse or generate x-request-id, extensions only)
//!     → proxy.rs (/api/{*path}, any method)
//!         → request.rs (segments, target URL, filtered headers, body)
//!         → upstream client (single attempt, deadline)
//!         → response.rs (filtered headers, no-store, status, bytes | 503)
//!     → Send to client
//! ```

pub mod proxy;
pub mod request;
pub mod request_id;
pub mod response;
pub mod server;

pub use request_id::{RequestId, RequestIdExt, X_REQUEST_ID};
pub use server::{build_router, AppState, HttpServer};
