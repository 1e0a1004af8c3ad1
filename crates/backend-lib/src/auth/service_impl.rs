use crate::auth::{AuthService, CredentialVerifier, LoginOutcome, Session, SessionManager};
use crate::error::AppError;
use crate::metrics::{LOGIN_FAILED, LOGIN_SUCCEEDED, SIGNUP_COMPLETED};
use crate::storage::{StoreError, UserStore};
use crate::validation::{validate_login, validate_signup, MAX_PASSWORD_LENGTH};
use async_trait::async_trait;
use metrics::counter;
use sessionauth_common::{LoginRequest, SignupRequest, UserId};
use std::sync::Arc;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

/// Authentication flow over a user store, the session store and a
/// credential verifier
pub struct DefaultAuth {
    users: Arc<dyn UserStore>,
    sessions: SessionManager,
    verifier: Arc<CredentialVerifier>,
}

impl DefaultAuth {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: SessionManager,
        verifier: Arc<CredentialVerifier>,
    ) -> Self {
        Self {
            users,
            sessions,
            verifier,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Compare `password` against `stored_hash` on a blocking thread. With
    /// no stored hash the dummy hash is checked instead and the result is
    /// always a mismatch.
    async fn check_password(
        &self,
        stored_hash: Option<String>,
        password: Zeroizing<String>,
    ) -> Result<bool, AppError> {
        let verifier = Arc::clone(&self.verifier);
        let matched = tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => verifier.verify(&hash, &password),
            None => {
                let _ = verifier.verify(verifier.dummy_hash(), &password);
                false
            },
        })
        .await?;
        Ok(matched)
    }
}

fn login_failed() -> AppError {
    counter!(LOGIN_FAILED).increment(1);
    warn!("login failed: invalid credentials");
    AppError::InvalidCredentials
}

#[async_trait]
impl AuthService for DefaultAuth {
    async fn signup(&self, request: SignupRequest) -> Result<UserId, AppError> {
        validate_signup(&request)?;
        let SignupRequest {
            username,
            email,
            password,
        } = request;
        let password = Zeroizing::new(password);

        let verifier = Arc::clone(&self.verifier);
        let password_hash = tokio::task::spawn_blocking(move || verifier.hash(&password))
            .await?
            .inspect_err(|e| error!(error = %e, "password hashing failed"))?;

        let user_id = self
            .users
            .create_user(&username, &email, &password_hash)
            .await
            .inspect_err(|e| {
                if let StoreError::Backend(msg) = e {
                    error!(error = %msg, "user store failed during signup");
                }
            })?;

        counter!(SIGNUP_COMPLETED).increment(1);
        info!(user_id, "user signed up");
        Ok(user_id)
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginOutcome, AppError> {
        validate_login(&request)?;
        let LoginRequest { username, password } = request;
        let password = Zeroizing::new(password);
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(login_failed());
        }

        let found = match self.users.get_user_by_username(&username).await {
            Ok(found) => Some(found),
            Err(StoreError::NotFound) => None,
            Err(e) => {
                error!(error = %e, "user store failed during login");
                return Err(e.into());
            },
        };

        let (user, stored_hash) = match found {
            Some((user, hash)) => (Some(user), Some(hash)),
            None => (None, None),
        };
        if !self.check_password(stored_hash, password).await? {
            return Err(login_failed());
        }
        let user = user.ok_or_else(login_failed)?;

        let session = self.sessions.issue(user.id).inspect_err(|e| {
            error!(error = %e, user_id = user.id, "could not open session");
        })?;

        counter!(LOGIN_SUCCEEDED).increment(1);
        info!(user_id = user.id, "user logged in");
        Ok(LoginOutcome {
            token: session.id,
            expires_at: session.expires_at,
            user_id: user.id,
            username: user.username,
        })
    }

    fn logout(&self, token: &str) {
        self.sessions.delete(token);
    }

    fn authenticate(&self, token: &str) -> Result<Session, AppError> {
        Ok(self.sessions.get(token)?)
    }
}
