//! Postgres and provider implementations of the pipeline traits.
//!
//! This is the composition root: the pipeline crate defines the seams, and
//! the concrete sqlx/reqwest-backed implementations live here.

use std::collections::HashSet;

use chrono::NaiveDate;
use futures::future::BoxFuture;
use sqlx::PgPool;

use redpulse_core::{AppConfig, CollectionProgress, DailyReport, Post, TimeWindow};
use redpulse_pipeline::{CheckpointStore, PostFetcher, PostStore, ReportStore};
use redpulse_scraper::{ProviderClient, RawPost, ScrapeError};

/// Postgres-backed post, checkpoint, and report storage.
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PostStore for PgBackend {
    fn existing_post_ids<'a>(
        &'a self,
        ids: &'a [String],
    ) -> BoxFuture<'a, anyhow::Result<HashSet<String>>> {
        Box::pin(async move { Ok(redpulse_db::existing_post_ids(&self.pool, ids).await?) })
    }

    fn upsert_post<'a>(&'a self, post: &'a Post) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move { Ok(redpulse_db::upsert_post(&self.pool, post).await?) })
    }
}

impl CheckpointStore for PgBackend {
    fn load(&self) -> BoxFuture<'_, anyhow::Result<Option<CollectionProgress>>> {
        Box::pin(async move { Ok(redpulse_db::load_checkpoint(&self.pool).await?) })
    }

    fn save<'a>(&'a self, progress: &'a CollectionProgress) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move { Ok(redpulse_db::save_checkpoint(&self.pool, progress).await?) })
    }

    fn clear(&self) -> BoxFuture<'_, anyhow::Result<()>> {
        Box::pin(async move { Ok(redpulse_db::clear_checkpoint(&self.pool).await?) })
    }
}

impl ReportStore for PgBackend {
    fn report_for_date(
        &self,
        date: NaiveDate,
    ) -> BoxFuture<'_, anyhow::Result<Option<DailyReport>>> {
        Box::pin(async move { Ok(redpulse_db::report_for_date(&self.pool, date).await?) })
    }

    fn posts_for_day(&self, date: NaiveDate) -> BoxFuture<'_, anyhow::Result<Vec<Post>>> {
        Box::pin(async move {
            let rows = redpulse_db::posts_for_day(&self.pool, date).await?;
            Ok(rows
                .into_iter()
                .map(redpulse_db::PostRow::into_post)
                .collect())
        })
    }

    fn save_report<'a>(&'a self, report: &'a DailyReport) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move { Ok(redpulse_db::insert_report(&self.pool, report).await?) })
    }
}

/// [`ProviderClient`]-backed fetcher.
pub struct ProviderFetcher {
    client: ProviderClient,
}

impl ProviderFetcher {
    /// Builds the fetcher from the application's provider settings.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScrapeError> {
        let client = ProviderClient::new(
            &config.provider_base_url,
            config.provider_timeout_secs,
            config.provider_max_attempts,
            config.provider_backoff_base_ms,
        )?;
        Ok(Self { client })
    }
}

impl PostFetcher for ProviderFetcher {
    fn fetch_posts<'a>(
        &'a self,
        keyword: &'a str,
        max_posts: u32,
        window: TimeWindow,
    ) -> BoxFuture<'a, Result<Vec<RawPost>, ScrapeError>> {
        Box::pin(self.client.fetch_posts(keyword, max_posts, window))
    }
}
