//! API gateway for the catering site's backend.
//!
//! Relays `/api/*` to the backend REST service and serves the admin
//! session endpoints.

pub mod admin;
pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
