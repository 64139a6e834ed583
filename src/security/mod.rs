//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → headers.rs (drop hop-by-hop headers before forwarding)
//!     → upstream
//! Upstream response:
//!     → headers.rs (drop hop-by-hop headers, force no-store)
//!     → client
//! ```
//!
//! Admin authentication lives in `crate::auth`.

pub mod headers;

pub use headers::{filter_hop_by_hop, force_no_store, is_hop_by_hop, HOP_BY_HOP_HEADERS};
