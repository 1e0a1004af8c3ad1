//! In-memory user store, for tests and local development.
use super::{StoreError, User, UserStore};
use async_trait::async_trait;
use parking_lot::RwLock;
use sessionauth_common::UserId;
use std::collections::{HashMap, HashSet};

struct StoredUser {
    id: UserId,
    password_hash: String,
}

#[derive(Default)]
struct Users {
    last_id: UserId,
    by_username: HashMap<String, StoredUser>,
    emails: HashSet<String>,
}

/// User store backed by a process-local map
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Users>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().by_username.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserId, StoreError> {
        let mut users = self.users.write();
        if users.by_username.contains_key(username) {
            return Err(StoreError::Duplicate("username already taken".to_string()));
        }
        if users.emails.contains(email) {
            return Err(StoreError::Duplicate("email already registered".to_string()));
        }

        users.last_id += 1;
        let id = users.last_id;
        users.by_username.insert(
            username.to_string(),
            StoredUser {
                id,
                password_hash: password_hash.to_string(),
            },
        );
        users.emails.insert(email.to_string());
        Ok(id)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<(User, String), StoreError> {
        let users = self.users.read();
        let stored = users.by_username.get(username).ok_or(StoreError::NotFound)?;
        Ok((
            User {
                id: stored.id,
                username: username.to_string(),
            },
            stored.password_hash.clone(),
        ))
    }
}
