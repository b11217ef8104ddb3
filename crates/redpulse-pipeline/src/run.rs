//! The serialized collection run.

use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use redpulse_core::{CollectionProgress, Post, PROGRESS_STATUS_COLLECTING};
use redpulse_scraper::client::MAX_POSTS_CAP;
use redpulse_scraper::{fallback, RawPost};
use redpulse_sentiment::Scorer;

use crate::config::{DelayRange, PipelineConfig};
use crate::error::PipelineError;
use crate::progress::plan_session;
use crate::store::persist_posts;
use crate::traits::{CheckpointStore, PostFetcher, PostStore};

/// Accounting for one completed collection run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSummary {
    pub session_id: Uuid,
    pub resumed: bool,
    pub keywords_total: usize,
    pub keywords_succeeded: usize,
    pub keywords_fallback: usize,
    pub keywords_failed: usize,
    pub collected: usize,
    pub saved: usize,
    pub duplicates: usize,
    pub errors: usize,
}

/// Runs one collection pass over `keywords`, strictly in order.
///
/// The checkpoint is written before each keyword's fetch, so a crash
/// mid-fetch resumes the same keyword; the dedup store makes the resulting
/// at-least-once fetch at-most-once in storage. A keyword whose fetch fails
/// is substituted with fallback posts (when enabled) or skipped; it never
/// aborts the run. The checkpoint is cleared only after the aggregate is
/// persisted.
///
/// # Errors
///
/// - [`PipelineError::Validation`] for an empty keyword list or
///   `max_posts_per_keyword` outside 1..=50.
/// - [`PipelineError::Storage`] if a checkpoint operation or the dedup
///   query fails.
/// - [`PipelineError::NoData`] if every keyword yielded zero posts.
pub async fn run_collection(
    fetcher: &dyn PostFetcher,
    store: &dyn PostStore,
    checkpoints: &dyn CheckpointStore,
    scorer: &Scorer,
    cfg: &PipelineConfig,
    keywords: &[String],
) -> Result<CollectionSummary, PipelineError> {
    if keywords.is_empty() {
        return Err(PipelineError::Validation("keyword list is empty".to_owned()));
    }
    if cfg.max_posts_per_keyword == 0 || cfg.max_posts_per_keyword > MAX_POSTS_CAP {
        return Err(PipelineError::Validation(format!(
            "max_posts_per_keyword must be 1..={MAX_POSTS_CAP}, got {}",
            cfg.max_posts_per_keyword
        )));
    }

    let checkpoint = checkpoints.load().await.map_err(PipelineError::Storage)?;
    let plan = plan_session(
        checkpoint.as_ref(),
        keywords.len(),
        cfg.session_window_secs,
        Utc::now(),
    );
    if plan.resumed {
        tracing::info!(
            session_id = %plan.session_id,
            start_index = plan.start_index,
            "resuming interrupted collection session"
        );
    } else {
        tracing::info!(
            session_id = %plan.session_id,
            keywords = keywords.len(),
            "starting collection session"
        );
    }

    let mut all_posts: Vec<Post> = Vec::new();
    let mut succeeded = 0usize;
    let mut fallback_used = 0usize;
    let mut failed = 0usize;

    for (index, keyword) in keywords.iter().enumerate().skip(plan.start_index) {
        if index > plan.start_index {
            pace(cfg.keyword_delay).await;
        }

        let progress = CollectionProgress {
            session_id: plan.session_id,
            current_index: index,
            total_keywords: keywords.len(),
            current_keyword: keyword.clone(),
            started_at: plan.started_at,
            updated_at: Utc::now(),
            status: PROGRESS_STATUS_COLLECTING.to_owned(),
        };
        checkpoints
            .save(&progress)
            .await
            .map_err(PipelineError::Storage)?;

        let posts: Vec<Post> = match fetcher
            .fetch_posts(keyword, cfg.max_posts_per_keyword, cfg.time_window)
            .await
        {
            Ok(raw) => {
                succeeded += 1;
                raw.into_iter()
                    .map(|r| score_raw_post(scorer, keyword, r))
                    .collect()
            }
            Err(err) => {
                tracing::warn!(keyword, error = %err, "keyword fetch failed");
                if cfg.fallback_enabled {
                    fallback_used += 1;
                    tracing::info!(
                        keyword,
                        count = cfg.max_posts_per_keyword,
                        "substituting fallback posts"
                    );
                    fallback::generate_posts(
                        keyword,
                        cfg.max_posts_per_keyword,
                        cfg.fallback_mix,
                        &mut rand::rng(),
                    )
                } else {
                    failed += 1;
                    continue;
                }
            }
        };

        tracing::debug!(keyword, count = posts.len(), "keyword processed");
        if posts.len() > 1 {
            pace(cfg.post_delay).await;
        }
        all_posts.extend(posts);
    }

    if all_posts.is_empty() {
        tracing::warn!(session_id = %plan.session_id, "collection produced no posts");
        return Err(PipelineError::NoData);
    }

    let collected = all_posts.len();
    let outcome = persist_posts(store, &all_posts, cfg).await?;
    checkpoints.clear().await.map_err(PipelineError::Storage)?;

    let summary = CollectionSummary {
        session_id: plan.session_id,
        resumed: plan.resumed,
        keywords_total: keywords.len(),
        keywords_succeeded: succeeded,
        keywords_fallback: fallback_used,
        keywords_failed: failed,
        collected,
        saved: outcome.saved,
        duplicates: outcome.duplicates,
        errors: outcome.errors,
    };
    tracing::info!(
        session_id = %summary.session_id,
        collected = summary.collected,
        saved = summary.saved,
        duplicates = summary.duplicates,
        errors = summary.errors,
        "collection run complete"
    );
    Ok(summary)
}

fn score_raw_post(scorer: &Scorer, search_keyword: &str, raw: RawPost) -> Post {
    let RawPost {
        post_id,
        title,
        content,
        author,
        url,
        keyword,
        likes,
        created_at,
    } = raw;
    let score = scorer.score(&format!("{title} {content}"));
    Post {
        id: post_id,
        title,
        body: content,
        author,
        source_url: url,
        keyword: keyword.unwrap_or_else(|| search_keyword.to_owned()),
        sentiment_score: score.value,
        sentiment_label: score.label,
        like_count: likes,
        published_at: created_at.unwrap_or_else(Utc::now),
    }
}

async fn pace(range: DelayRange) {
    let delay_ms = range.sample(&mut rand::rng());
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
