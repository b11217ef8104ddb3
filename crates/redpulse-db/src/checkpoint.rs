//! The single collection-progress checkpoint record.
//!
//! Stored as one JSONB row under a well-known key; at most one checkpoint
//! exists at a time and it is not lock-protected (single concurrent run
//! assumed).

use sqlx::PgPool;

use redpulse_core::CollectionProgress;

use crate::DbError;

const CHECKPOINT_KEY: &str = "collection:progress";

/// Loads the current checkpoint, if any.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Decode`] if
/// the stored record does not match [`CollectionProgress`].
pub async fn load_checkpoint(pool: &PgPool) -> Result<Option<CollectionProgress>, DbError> {
    let value: Option<serde_json::Value> =
        sqlx::query_scalar("SELECT value FROM checkpoint_store WHERE key = $1")
            .bind(CHECKPOINT_KEY)
            .fetch_optional(pool)
            .await?;
    value
        .map(|v| serde_json::from_value(v).map_err(DbError::from))
        .transpose()
}

/// Writes (or replaces) the checkpoint.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the write fails, or [`DbError::Decode`] if
/// the progress cannot be encoded.
pub async fn save_checkpoint(pool: &PgPool, progress: &CollectionProgress) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO checkpoint_store (key, value, updated_at) VALUES ($1, $2, NOW()) \
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
    )
    .bind(CHECKPOINT_KEY)
    .bind(serde_json::to_value(progress)?)
    .execute(pool)
    .await?;
    Ok(())
}

/// Deletes the checkpoint. Deleting a missing checkpoint is not an error.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn clear_checkpoint(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query("DELETE FROM checkpoint_store WHERE key = $1")
        .bind(CHECKPOINT_KEY)
        .execute(pool)
        .await?;
    Ok(())
}
