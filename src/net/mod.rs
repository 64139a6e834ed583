//! Network layer subsystem.
//!
//! Plain TCP listeners are handed straight to axum. When TLS is configured,
//! `tls.rs` loads the certificate and `axum-server` terminates TLS.

pub mod tls;
