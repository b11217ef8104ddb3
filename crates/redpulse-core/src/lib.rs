//! Shared domain types and application configuration for Redpulse.
//!
//! Everything in this crate is I/O-free: domain structs, the time-window
//! vocabulary shared between the scraper and the config store, and the
//! env-driven [`AppConfig`] constructed once at process start.

pub mod app_config;
pub mod config;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    CollectionProgress, DailyReport, KeywordSummary, Post, SentimentLabel, TimeWindow,
    PROGRESS_STATUS_COLLECTING,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
