// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
//!
//! A session moves `absent -> active -> (expired | deleted)`. Expired and
//! deleted sessions are terminal; expiry is fixed at creation and checked
//! lazily on lookup.
use super::token_generator::{generate_secure_token, TokenError};
use crate::clock::{Clock, SystemClock};
use crate::metrics::{SESSION_ACTIVE, SESSION_CREATED, SESSION_DELETED, SESSION_EXPIRED};
use chrono::{DateTime, Duration, Utc};
use metrics::{counter, gauge};
use parking_lot::RwLock;
use sessionauth_common::UserId;
use std::collections::{hash_map::Entry, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Session TTL (time to live) in seconds
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24; // 24 hours

/// Fresh tokens drawn before giving up on a collision with a live session
const MAX_TOKEN_ATTEMPTS: usize = 3;

/// Session information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Opaque session token
    pub id: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("session expired")]
    Expired,

    #[error("session token generation failed: {0}")]
    TokenGeneration(String),
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        SessionError::TokenGeneration(err.to_string())
    }
}

/// In-process session store keyed by token
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    /// Create a session manager with the default TTL and the system clock
    pub fn new() -> Self {
        Self::new_with_ttl(Duration::seconds(SESSION_TTL_SECS))
    }

    pub fn new_with_ttl(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a session manager reading time from `clock`
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            clock,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session for `user_id` and return its token
    pub fn create(&self, user_id: UserId) -> Result<String, SessionError> {
        self.issue(user_id).map(|session| session.id)
    }

    /// Create a session for `user_id` and return a copy of the stored record
    pub fn issue(&self, user_id: UserId) -> Result<Session, SessionError> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = generate_secure_token().inspect_err(|e| {
                error!(error = %e, "secure random source failed");
            })?;
            let now = self.clock.now();
            let session = Session {
                id: token.clone(),
                user_id,
                created_at: now,
                expires_at: now + self.ttl,
            };

            let mut sessions = self.sessions.write();
            if let Entry::Vacant(slot) = sessions.entry(token) {
                slot.insert(session.clone());

                counter!(SESSION_CREATED).increment(1);
                gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
                debug!(user_id, expires_at = %session.expires_at, "session created");

                return Ok(session);
            }
        }

        error!("repeated session token collisions");
        Err(SessionError::TokenGeneration(
            "could not draw an unused session token".to_string(),
        ))
    }

    /// Look up a live session. Does not extend its expiry.
    pub fn get(&self, token: &str) -> Result<Session, SessionError> {
        let sessions = self.sessions.read();
        let session = sessions.get(token).ok_or(SessionError::NotFound)?;
        if self.clock.now() > session.expires_at {
            return Err(SessionError::Expired);
        }
        Ok(session.clone())
    }

    /// Remove a session. Removing an absent token is not an error.
    pub fn delete(&self, token: &str) {
        let mut sessions = self.sessions.write();
        if let Some(session) = sessions.remove(token) {
            counter!(SESSION_DELETED).increment(1);
            gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
            debug!(user_id = session.user_id, "session deleted");
        }
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut sessions = self.sessions.write();
        let before_count = sessions.len();

        sessions.retain(|_, session| now <= session.expires_at);

        let removed = before_count - sessions.len();
        if removed > 0 {
            counter!(SESSION_EXPIRED).increment(removed as u64);
            gauge!(SESSION_ACTIVE).set(sessions.len() as f64);
            debug!(removed, "purged expired sessions");
        }
        removed
    }

    /// Number of stored sessions, expired ones included until purged
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn a task that purges expired sessions every `interval`
    pub fn spawn_sweeper(&self, interval: std::time::Duration) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                manager.purge_expired();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::collections::HashSet;
    use std::thread;

    fn manager_with_clock() -> (SessionManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let manager = SessionManager::with_clock(Duration::hours(24), clock.clone());
        (manager, clock)
    }

    #[test]
    fn test_create_then_get() {
        let (manager, clock) = manager_with_clock();
        let token = manager.create(42).unwrap();

        let session = manager.get(&token).unwrap();
        assert_eq!(session.id, token);
        assert_eq!(session.user_id, 42);
        assert!(session.expires_at > clock.now());
        assert_eq!(session.expires_at, session.created_at + Duration::hours(24));
    }

    #[test]
    fn test_unknown_token_is_not_found() {
        let manager = SessionManager::new();
        assert!(matches!(
            manager.get("no-such-token"),
            Err(SessionError::NotFound)
        ));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (manager, _clock) = manager_with_clock();
        let token = manager.create(1).unwrap();

        manager.delete(&token);
        assert!(matches!(manager.get(&token), Err(SessionError::NotFound)));

        manager.delete(&token);
        manager.delete("never-existed");
        assert!(manager.is_empty());
    }

    #[test]
    fn test_session_expires_after_ttl() {
        let (manager, clock) = manager_with_clock();
        let token = manager.create(7).unwrap();

        clock.advance(Duration::hours(24));
        assert!(manager.get(&token).is_ok(), "valid up to the expiry instant");

        clock.advance(Duration::seconds(1));
        assert!(matches!(manager.get(&token), Err(SessionError::Expired)));
    }

    #[test]
    fn test_get_does_not_extend_expiry() {
        let (manager, clock) = manager_with_clock();
        let session = manager.issue(3).unwrap();

        clock.advance(Duration::hours(23));
        let seen = manager.get(&session.id).unwrap();
        assert_eq!(seen.expires_at, session.expires_at);

        clock.advance(Duration::hours(2));
        assert!(manager.get(&session.id).is_err());
    }

    #[test]
    fn test_each_create_gets_its_own_session() {
        let (manager, _clock) = manager_with_clock();
        let first = manager.create(9).unwrap();
        let second = manager.create(9).unwrap();

        assert_ne!(first, second);
        assert_eq!(manager.len(), 2);

        manager.delete(&first);
        assert!(manager.get(&second).is_ok());
    }

    #[test]
    fn test_purge_expired_keeps_live_sessions() {
        let (manager, clock) = manager_with_clock();
        let old = manager.create(1).unwrap();
        clock.advance(Duration::hours(12));
        let fresh = manager.create(2).unwrap();
        clock.advance(Duration::hours(13));

        assert_eq!(manager.purge_expired(), 1);
        assert_eq!(manager.len(), 1);
        assert!(matches!(manager.get(&old), Err(SessionError::NotFound)));
        assert!(manager.get(&fresh).is_ok());
        assert_eq!(manager.purge_expired(), 0);
    }

    #[test]
    fn test_callers_get_copies() {
        let (manager, _clock) = manager_with_clock();
        let token = manager.create(5).unwrap();

        let mut copy = manager.get(&token).unwrap();
        copy.user_id = 6;
        assert_eq!(manager.get(&token).unwrap().user_id, 5);
    }

    #[test]
    fn test_concurrent_creates_never_collide() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 2_000;

        let manager = SessionManager::new();
        let tokens: Vec<String> = thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|t| {
                    let manager = &manager;
                    scope.spawn(move || {
                        (0..PER_THREAD)
                            .map(|_| manager.create(t as UserId).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let unique: HashSet<&String> = tokens.iter().collect();
        assert_eq!(unique.len(), THREADS * PER_THREAD);
        assert_eq!(manager.len(), THREADS * PER_THREAD);
    }

    #[test]
    fn test_concurrent_reads_and_writes() {
        let manager = SessionManager::new();
        let stable = manager.create(100).unwrap();

        thread::scope(|scope| {
            for t in 0..4 {
                let manager = &manager;
                scope.spawn(move || {
                    for _ in 0..500 {
                        let token = manager.create(t).unwrap();
                        assert_eq!(manager.get(&token).unwrap().user_id, t);
                        manager.delete(&token);
                    }
                });
            }
            for _ in 0..4 {
                let manager = &manager;
                let stable = &stable;
                scope.spawn(move || {
                    for _ in 0..500 {
                        assert_eq!(manager.get(stable).unwrap().user_id, 100);
                    }
                });
            }
        });

        assert_eq!(manager.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_purges_in_background() {
        let (manager, clock) = manager_with_clock();
        manager.create(1).unwrap();
        clock.advance(Duration::hours(25));

        let handle = manager.spawn_sweeper(std::time::Duration::from_secs(60));
        tokio::time::sleep(std::time::Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(manager.is_empty());
        handle.abort();
    }
}
