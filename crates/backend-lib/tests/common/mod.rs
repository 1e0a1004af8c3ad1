//! Shared setup for the integration tests.
#![allow(dead_code)]

use sessionauth_lib::{
    config::{HashingSettings, Settings},
    storage::InMemoryUserStore,
    AppState,
};
use std::sync::Arc;

/// Settings with a hashing cost low enough for tests
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.hashing = HashingSettings {
        scrypt_log_n: 4,
        argon2_m_cost: 64,
        argon2_t_cost: 1,
        ..HashingSettings::default()
    };
    settings
}

/// Application state over an empty in-memory user store
pub fn setup_test_state() -> Arc<AppState> {
    let state = AppState::new(Arc::new(InMemoryUserStore::new()), test_settings())
        .expect("test settings are valid");
    Arc::new(state)
}
