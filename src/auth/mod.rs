//! Admin authentication primitives.
//!
//! `token.rs` signs and verifies HS256 tokens; `session.rs` defines the
//! admin payload and how it travels (cookie or bearer header). The guard
//! middleware built on these lives in `crate::admin::auth`.

pub mod session;
pub mod token;

pub use session::AdminSession;
pub use token::{TokenError, TokenSigner};
