// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the session authentication server.

pub mod session;

pub use session::{require_session, session_token};
