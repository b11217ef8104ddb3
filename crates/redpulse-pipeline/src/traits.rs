//! Seams between the pipeline and the outside world.
//!
//! The server wires Postgres- and provider-backed implementations in at the
//! composition root; tests substitute in-memory ones.

use std::collections::HashSet;

use chrono::NaiveDate;
use futures::future::BoxFuture;

use redpulse_core::{CollectionProgress, DailyReport, Post, TimeWindow};
use redpulse_scraper::{RawPost, ScrapeError};

/// Source of raw posts for a single keyword. Retry policy lives inside the
/// implementation; the pipeline sees only the final outcome.
pub trait PostFetcher: Send + Sync {
    fn fetch_posts<'a>(
        &'a self,
        keyword: &'a str,
        max_posts: u32,
        window: TimeWindow,
    ) -> BoxFuture<'a, Result<Vec<RawPost>, ScrapeError>>;
}

/// Persistence for scored posts, keyed by provider post id.
pub trait PostStore: Send + Sync {
    /// Which of `ids` already exist in storage.
    fn existing_post_ids<'a>(
        &'a self,
        ids: &'a [String],
    ) -> BoxFuture<'a, anyhow::Result<HashSet<String>>>;

    /// Writes one post; same-id writes upsert.
    fn upsert_post<'a>(&'a self, post: &'a Post) -> BoxFuture<'a, anyhow::Result<()>>;
}

/// Storage for the single collection-progress record.
pub trait CheckpointStore: Send + Sync {
    fn load(&self) -> BoxFuture<'_, anyhow::Result<Option<CollectionProgress>>>;

    fn save<'a>(&'a self, progress: &'a CollectionProgress) -> BoxFuture<'a, anyhow::Result<()>>;

    fn clear(&self) -> BoxFuture<'_, anyhow::Result<()>>;
}

/// Read/write surface for daily report generation.
pub trait ReportStore: Send + Sync {
    fn report_for_date(
        &self,
        date: NaiveDate,
    ) -> BoxFuture<'_, anyhow::Result<Option<DailyReport>>>;

    /// Posts published within the closed calendar-day interval of `date`.
    fn posts_for_day(&self, date: NaiveDate) -> BoxFuture<'_, anyhow::Result<Vec<Post>>>;

    fn save_report<'a>(&'a self, report: &'a DailyReport) -> BoxFuture<'a, anyhow::Result<()>>;
}
