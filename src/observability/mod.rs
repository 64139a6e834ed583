//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//! Per request:
//!     → request id in extensions (crate::http::request_id)
//!     → tower-http trace span carrying that id
//! ```

pub mod logging;
pub mod metrics;
