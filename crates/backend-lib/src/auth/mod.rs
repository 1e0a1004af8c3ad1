// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod session;
pub mod token_generator;
mod service;
mod service_impl;

pub use password::{verify_password, CredentialVerifier, HashingError};
pub use session::{Session, SessionError, SessionManager, SESSION_TTL_SECS};
pub use service::{AuthService, LoginOutcome};
pub use service_impl::DefaultAuth;
pub use token_generator::{generate_secure_token, TokenError};
