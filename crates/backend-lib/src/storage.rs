// ============================
// crates/backend-lib/src/storage.rs
// ============================
//! User credential store abstraction.
//!
//! The authentication flow only ever creates a user or looks one up by
//! name; everything else about the schema belongs to the store.
use crate::config::{StorageKind, StorageSettings};
use async_trait::async_trait;
use sessionauth_common::UserId;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

mod memory;
mod sqlite;

pub use memory::InMemoryUserStore;
pub use sqlite::SqliteUserStore;

/// Public part of a user record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// Errors reported by a user store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    /// Username or email already taken
    #[error("duplicate user: {0}")]
    Duplicate(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Trait for user credential stores
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create the schema if it does not exist yet
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Insert a new user and return its id
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserId, StoreError>;

    /// Fetch a user and its password hash
    async fn get_user_by_username(&self, username: &str) -> Result<(User, String), StoreError>;
}

/// Open the store selected by `settings` and make sure its schema exists
pub async fn connect(settings: &StorageSettings) -> Result<Arc<dyn UserStore>, StoreError> {
    let store: Arc<dyn UserStore> = match settings.kind {
        StorageKind::Memory => {
            info!("using in-memory user store");
            Arc::new(InMemoryUserStore::new())
        },
        StorageKind::Sqlite => {
            info!(url = %settings.database_url, "using sqlite user store");
            Arc::new(SqliteUserStore::connect(&settings.database_url).await?)
        },
    };
    store.init().await?;
    Ok(store)
}
