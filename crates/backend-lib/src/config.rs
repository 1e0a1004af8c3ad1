// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
//!
//! Settings are layered: built-in defaults, then an optional config file,
//! then `SESSIONAUTH__<SECTION>__<KEY>` environment variables.
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

/// Config file read by [`Settings::load`]
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Upper bound on `session.ttl_secs` (ten years)
pub const MAX_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 365 * 10;

/// Application settings
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub session: SessionSettings,
    pub hashing: HashingSettings,
    pub storage: StorageSettings,
    pub log: LogSettings,
}

/// HTTP listener
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Session lifetime and cookie binding
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    /// Fixed lifetime of a session, counted from login
    pub ttl_secs: u64,
    /// How often expired sessions are purged; 0 disables the sweep
    pub sweep_interval_secs: u64,
    pub cookie_name: String,
    /// Adds the `Secure` attribute to the session cookie
    pub secure_cookie: bool,
}

/// Password hashing algorithm
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Scrypt,
    Argon2,
}

/// Work factor for password hashing
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HashingSettings {
    pub algorithm: HashAlgorithm,
    /// log2 of the scrypt CPU/memory cost
    pub scrypt_log_n: u8,
    pub scrypt_r: u32,
    pub scrypt_p: u32,
    /// Argon2 memory cost in KiB
    pub argon2_m_cost: u32,
    pub argon2_t_cost: u32,
    pub argon2_p_cost: u32,
}

/// Which user store backs signup and login
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    pub kind: StorageKind,
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogSettings {
    /// Fallback filter when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_secs: 60 * 60 * 24, // 24 hours
            sweep_interval_secs: 15 * 60,
            cookie_name: "session_id".to_string(),
            secure_cookie: true,
        }
    }
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::Scrypt,
            scrypt_log_n: 17,
            scrypt_r: 8,
            scrypt_p: 1,
            argon2_m_cost: 19 * 1024,
            argon2_t_cost: 2,
            argon2_p_cost: 1,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            kind: StorageKind::Memory,
            database_url: "sqlite://data/users.db".to_string(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

impl SessionSettings {
    pub fn ttl(&self) -> chrono::Duration {
        let secs = self.ttl_secs.min(MAX_SESSION_TTL_SECS);
        chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1000))
    }
}

impl Settings {
    /// Load settings from `config/default.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load settings from the given file (if present) and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let settings: Settings = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("SESSIONAUTH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?
            .try_deserialize()
            .context("failed to parse configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would make the service unusable
    pub fn validate(&self) -> Result<()> {
        if self.session.ttl_secs == 0 {
            anyhow::bail!("session.ttl_secs must be greater than zero");
        }
        if self.session.ttl_secs > MAX_SESSION_TTL_SECS {
            anyhow::bail!("session.ttl_secs must not exceed {MAX_SESSION_TTL_SECS}");
        }
        if self.session.cookie_name.trim().is_empty() {
            anyhow::bail!("session.cookie_name must not be empty");
        }
        if self.storage.kind == StorageKind::Sqlite && self.storage.database_url.is_empty() {
            anyhow::bail!("storage.database_url is required for the sqlite store");
        }
        self.server.bind_addr()?;
        Ok(())
    }
}
