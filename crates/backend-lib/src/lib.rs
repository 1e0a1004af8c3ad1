// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core of the session authentication server: credential hashing, the
//! in-memory session store, the signup/login flow and its HTTP surface.

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use crate::auth::{AuthService, CredentialVerifier, DefaultAuth, SessionManager};
use crate::clock::{Clock, SystemClock};
use crate::config::Settings;
use crate::error::AppError;
use crate::storage::UserStore;
use std::sync::Arc;
use tracing::info;

pub use router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication flow
    pub auth: Arc<dyn AuthService>,
    /// Session store, shared with the flow
    pub sessions: SessionManager,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state over `users`
    pub fn new(users: Arc<dyn UserStore>, settings: Settings) -> Result<Self, AppError> {
        Self::with_clock(users, settings, Arc::new(SystemClock))
    }

    /// Create a new application state whose sessions read time from `clock`
    pub fn with_clock(
        users: Arc<dyn UserStore>,
        settings: Settings,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let verifier = CredentialVerifier::new(&settings.hashing)
            .map_err(|e| AppError::Config(format!("hashing: {e}")))?;
        let sessions = SessionManager::with_clock(settings.session.ttl(), clock);
        let auth = Arc::new(DefaultAuth::new(users, sessions.clone(), Arc::new(verifier)));

        Ok(Self {
            auth,
            sessions,
            settings: Arc::new(settings),
        })
    }

    /// Open the configured user store and build the state on top of it
    pub async fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let users = storage::connect(&settings.storage).await?;
        let state = Self::new(users, settings)?;
        info!(
            ttl_secs = state.settings.session.ttl_secs,
            algorithm = ?state.settings.hashing.algorithm,
            "application state ready"
        );
        Ok(state)
    }
}
