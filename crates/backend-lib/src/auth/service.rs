use super::Session;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sessionauth_common::{LoginRequest, SignupRequest, UserId};

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: UserId,
    pub username: String,
}

/// Signup, login, logout and session checks
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a user and return its id
    async fn signup(&self, request: SignupRequest) -> Result<UserId, AppError>;

    /// Check credentials and open a session
    async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, AppError>;

    /// Close a session. Unknown tokens are ignored.
    fn logout(&self, token: &str);

    /// Resolve a token to its live session
    fn authenticate(&self, token: &str) -> Result<Session, AppError>;
}
