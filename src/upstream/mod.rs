//! Upstream backend subsystem.
//!
//! # Data Flow
//! ```text
//! proxy handler
//!     → backend_url.rs (env / config → base URL, per request)
//!     → client.rs (single attempt, deadline, no redirects)
//!     → backend
//! ```

pub mod backend_url;
pub mod client;

pub use backend_url::{BackendUrlProvider, EnvBackendUrl, FixedBackendUrl};
pub use client::{UpstreamClient, UpstreamError};
