//! Immutable application configuration, built once at process start.

use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide configuration. Constructed from the environment in
/// [`crate::config::load_app_config`] and passed explicitly to every
/// component; there is no ambient global state.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,

    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,

    /// Base URL of the external scraping provider.
    pub provider_base_url: String,
    /// Wall-clock timeout per provider request. Long on purpose: the
    /// provider paces itself upstream.
    pub provider_timeout_secs: u64,
    /// Total fetch attempts per keyword, including the first.
    pub provider_max_attempts: u32,
    /// Base for exponential backoff between fetch attempts.
    pub provider_backoff_base_ms: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("provider_base_url", &self.provider_base_url)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("provider_max_attempts", &self.provider_max_attempts)
            .field("provider_backoff_base_ms", &self.provider_backoff_base_ms)
            .finish()
    }
}
