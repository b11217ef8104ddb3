//! Drives one collection run end to end: monitor config, pipeline,
//! operational log entry.

use serde_json::json;
use sqlx::PgPool;
use thiserror::Error;

use redpulse_core::AppConfig;
use redpulse_pipeline::{run_collection, CollectionSummary, PipelineConfig, PipelineError};
use redpulse_scraper::ScrapeError;
use redpulse_sentiment::Scorer;

use crate::backend::{PgBackend, ProviderFetcher};

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("no keywords configured; set them via PUT /config")]
    NoKeywords,
    #[error(transparent)]
    Db(#[from] redpulse_db::DbError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Shared collection entry point used by the API and the scheduler.
pub struct CollectRunner {
    pool: PgPool,
    fetcher: ProviderFetcher,
}

impl CollectRunner {
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the provider client cannot be built.
    pub fn new(pool: PgPool, config: &AppConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            pool,
            fetcher: ProviderFetcher::from_config(config)?,
        })
    }

    /// Runs one collection pass using the persisted monitor config.
    ///
    /// The outcome (success or failure) is appended to the operational log;
    /// log-write failures never affect the result.
    ///
    /// # Errors
    ///
    /// - [`CollectError::NoKeywords`] when the monitor config has no
    ///   keywords.
    /// - [`CollectError::Db`] when the monitor config cannot be loaded.
    /// - [`CollectError::Pipeline`] when the run itself fails.
    pub async fn run_once(&self) -> Result<CollectionSummary, CollectError> {
        let monitor = redpulse_db::load_monitor_config(&self.pool).await?;
        if monitor.keywords.is_empty() {
            return Err(CollectError::NoKeywords);
        }

        let cfg = PipelineConfig {
            max_posts_per_keyword: monitor.max_posts,
            time_window: monitor.time_window,
            ..PipelineConfig::default()
        };
        let backend = PgBackend::new(self.pool.clone());
        let scorer = Scorer::new();

        let result = run_collection(
            &self.fetcher,
            &backend,
            &backend,
            &scorer,
            &cfg,
            &monitor.keywords,
        )
        .await;

        match &result {
            Ok(summary) => {
                redpulse_db::append_log(
                    &self.pool,
                    "info",
                    "collection run complete",
                    Some(json!({
                        "session_id": summary.session_id,
                        "collected": summary.collected,
                        "saved": summary.saved,
                        "duplicates": summary.duplicates,
                        "errors": summary.errors,
                        "fallback_keywords": summary.keywords_fallback,
                    })),
                )
                .await;
            }
            Err(err) => {
                redpulse_db::append_log(
                    &self.pool,
                    "error",
                    &format!("collection run failed: {err}"),
                    None,
                )
                .await;
            }
        }

        Ok(result?)
    }
}
