//! Operational log entries for collection runs.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `collection_logs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LogRow {
    pub id: i64,
    pub level: String,
    pub message: String,
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Appends a log entry. Best-effort: a failed insert is reported via
/// tracing and otherwise ignored so logging never blocks a run.
pub async fn append_log(
    pool: &PgPool,
    level: &str,
    message: &str,
    detail: Option<serde_json::Value>,
) {
    let result = sqlx::query("INSERT INTO collection_logs (level, message, detail) VALUES ($1, $2, $3)")
        .bind(level)
        .bind(message)
        .bind(detail)
        .execute(pool)
        .await;
    if let Err(err) = result {
        tracing::warn!(error = %err, "failed to append collection log entry");
    }
}

/// The most recent log entries, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn recent_logs(pool: &PgPool, limit: i64) -> Result<Vec<LogRow>, DbError> {
    let rows = sqlx::query_as::<_, LogRow>(
        "SELECT id, level, message, detail, created_at FROM collection_logs \
         ORDER BY created_at DESC, id DESC LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
