//! Deduplicated batch persistence for scored posts.

use std::time::Duration;

use futures::future::join_all;

use redpulse_core::Post;

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::traits::PostStore;

/// Per-call accounting from [`persist_posts`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PersistOutcome {
    pub saved: usize,
    pub errors: usize,
    pub duplicates: usize,
}

/// Persists `posts`, skipping ids already in storage.
///
/// The dedup query runs once up front; a failure there aborts the whole
/// call. Remaining posts are written in batches of `cfg.batch_size`, all
/// writes within a batch issued concurrently and counted independently, so a
/// failed write never blocks or rolls back its siblings. Each write retries
/// with linear backoff (`write_retry_base_ms × attempt`) before counting as
/// an error.
///
/// # Errors
///
/// Returns [`PipelineError::Storage`] only if the dedup query fails.
pub async fn persist_posts(
    store: &dyn PostStore,
    posts: &[Post],
    cfg: &PipelineConfig,
) -> Result<PersistOutcome, PipelineError> {
    if posts.is_empty() {
        return Ok(PersistOutcome::default());
    }

    let ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
    let existing = store
        .existing_post_ids(&ids)
        .await
        .map_err(PipelineError::Storage)?;

    let fresh: Vec<&Post> = posts.iter().filter(|p| !existing.contains(&p.id)).collect();
    let duplicates = posts.len() - fresh.len();

    let mut saved = 0usize;
    let mut errors = 0usize;
    for batch in fresh.chunks(cfg.batch_size.max(1)) {
        let writes = batch
            .iter()
            .map(|post| write_with_retry(store, post, cfg.write_max_attempts, cfg.write_retry_base_ms));
        for (post, result) in batch.iter().zip(join_all(writes).await) {
            match result {
                Ok(()) => saved += 1,
                Err(err) => {
                    errors += 1;
                    tracing::warn!(post_id = %post.id, error = %err, "post write failed after retries");
                }
            }
        }
    }

    tracing::info!(saved, errors, duplicates, "post batch persisted");
    Ok(PersistOutcome {
        saved,
        errors,
        duplicates,
    })
}

async fn write_with_retry(
    store: &dyn PostStore,
    post: &Post,
    max_attempts: u32,
    base_ms: u64,
) -> anyhow::Result<()> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match store.upsert_post(post).await {
            Ok(()) => return Ok(()),
            Err(err) if attempt >= max_attempts => return Err(err),
            Err(err) => {
                let delay_ms = base_ms.saturating_mul(u64::from(attempt));
                tracing::warn!(
                    post_id = %post.id,
                    attempt,
                    delay_ms,
                    error = %err,
                    "post write failed, retrying"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}
