//! Key/value monitor configuration.
//!
//! Stored as one JSONB row per field so individual settings can be updated
//! without rewriting the whole config. Missing rows fall back to defaults;
//! the defaults are seeded on first read so the table is self-initialising.

use sqlx::PgPool;

use redpulse_core::TimeWindow;
use serde::{Deserialize, Serialize};

use crate::DbError;

const KEY_KEYWORDS: &str = "keywords";
const KEY_ENABLED: &str = "enabled";
const KEY_MAX_POSTS: &str = "max_posts";
const KEY_TIME_WINDOW: &str = "time_window";

/// Operator-editable collection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub keywords: Vec<String>,
    pub enabled: bool,
    pub max_posts: u32,
    pub time_window: TimeWindow,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            keywords: Vec::new(),
            enabled: true,
            max_posts: 20,
            time_window: TimeWindow::default(),
        }
    }
}

/// Loads the monitor config, seeding defaults if the table is empty.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails, or [`DbError::Decode`] if a
/// stored value does not match its expected shape.
pub async fn load_monitor_config(pool: &PgPool) -> Result<MonitorConfig, DbError> {
    let rows: Vec<(String, serde_json::Value)> =
        sqlx::query_as("SELECT key, value FROM monitor_config")
            .fetch_all(pool)
            .await?;

    if rows.is_empty() {
        let defaults = MonitorConfig::default();
        save_monitor_config(pool, &defaults).await?;
        tracing::info!("seeded default monitor config");
        return Ok(defaults);
    }

    let mut config = MonitorConfig::default();
    for (key, value) in rows {
        match key.as_str() {
            KEY_KEYWORDS => config.keywords = serde_json::from_value(value)?,
            KEY_ENABLED => config.enabled = serde_json::from_value(value)?,
            KEY_MAX_POSTS => config.max_posts = serde_json::from_value(value)?,
            KEY_TIME_WINDOW => config.time_window = serde_json::from_value(value)?,
            other => tracing::warn!(key = other, "unknown monitor config key ignored"),
        }
    }
    Ok(config)
}

/// Writes all monitor config fields in one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any write fails, or [`DbError::Decode`] if a
/// field cannot be encoded.
pub async fn save_monitor_config(pool: &PgPool, config: &MonitorConfig) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;
    let entries = [
        (KEY_KEYWORDS, serde_json::to_value(&config.keywords)?),
        (KEY_ENABLED, serde_json::to_value(config.enabled)?),
        (KEY_MAX_POSTS, serde_json::to_value(config.max_posts)?),
        (KEY_TIME_WINDOW, serde_json::to_value(config.time_window)?),
    ];
    for (key, value) in entries {
        sqlx::query(
            "INSERT INTO monitor_config (key, value, updated_at) VALUES ($1, $2, NOW()) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_enabled_with_no_keywords() {
        let config = MonitorConfig::default();
        assert!(config.enabled);
        assert!(config.keywords.is_empty());
        assert_eq!(config.max_posts, 20);
        assert_eq!(config.time_window, TimeWindow::OneWeek);
    }

    #[test]
    fn config_serializes_with_snake_case_window() {
        let config = MonitorConfig {
            keywords: vec!["AI".to_owned()],
            enabled: false,
            max_posts: 30,
            time_window: TimeWindow::SixMonths,
        };
        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["time_window"], "six_months");
        assert_eq!(json["keywords"][0], "AI");
    }
}
