//! Database operations for the `posts` table.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use redpulse_core::{Post, SentimentLabel};

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub post_id: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub source_url: String,
    pub keyword: String,
    pub sentiment_score: f64,
    pub sentiment_label: String,
    pub like_count: i64,
    pub published_at: DateTime<Utc>,
    pub collected_at: DateTime<Utc>,
}

impl PostRow {
    /// Converts the row back into the domain type. The label is re-derived
    /// from the score, which is the canonical mapping.
    #[must_use]
    pub fn into_post(self) -> Post {
        Post {
            id: self.post_id,
            title: self.title,
            body: self.body,
            author: self.author,
            source_url: self.source_url,
            keyword: self.keyword,
            sentiment_score: self.sentiment_score,
            sentiment_label: SentimentLabel::from_score(self.sentiment_score),
            like_count: self.like_count,
            published_at: self.published_at,
        }
    }
}

/// Aggregate post statistics.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatsRow {
    pub total_posts: i64,
    pub avg_sentiment: Option<f64>,
    pub positive_count: i64,
    pub neutral_count: i64,
    pub negative_count: i64,
}

/// Per-keyword rollup.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordStatsRow {
    pub keyword: String,
    pub total_posts: i64,
    pub avg_sentiment: Option<f64>,
    pub positive_count: i64,
    pub negative_count: i64,
}

/// Rows removed by a retention cleanup.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupOutcome {
    pub posts_deleted: u64,
    pub reports_deleted: u64,
    pub logs_deleted: u64,
}

const POST_COLUMNS: &str = "post_id, title, body, author, source_url, keyword, \
     sentiment_score, sentiment_label, like_count, published_at, collected_at";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Inserts a post, or refreshes it when the same `post_id` already exists.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the write fails.
pub async fn upsert_post(pool: &PgPool, post: &Post) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO posts (post_id, title, body, author, source_url, keyword, \
                            sentiment_score, sentiment_label, like_count, published_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (post_id) DO UPDATE SET \
             title = EXCLUDED.title, \
             body = EXCLUDED.body, \
             author = EXCLUDED.author, \
             source_url = EXCLUDED.source_url, \
             keyword = EXCLUDED.keyword, \
             sentiment_score = EXCLUDED.sentiment_score, \
             sentiment_label = EXCLUDED.sentiment_label, \
             like_count = EXCLUDED.like_count, \
             published_at = EXCLUDED.published_at",
    )
    .bind(&post.id)
    .bind(&post.title)
    .bind(&post.body)
    .bind(&post.author)
    .bind(&post.source_url)
    .bind(&post.keyword)
    .bind(post.sentiment_score)
    .bind(post.sentiment_label.as_str())
    .bind(post.like_count)
    .bind(post.published_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Which of `ids` already exist in the `posts` table.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn existing_post_ids(pool: &PgPool, ids: &[String]) -> Result<HashSet<String>, DbError> {
    let rows: Vec<String> =
        sqlx::query_scalar("SELECT post_id FROM posts WHERE post_id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().collect())
}

/// Most recently published posts, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn recent_posts(pool: &PgPool, limit: i64) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts ORDER BY published_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Aggregate stats over all posts. Thresholds match the daily report:
/// positive `>= 0.6`, negative `< 0.4`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn post_stats(pool: &PgPool) -> Result<StatsRow, DbError> {
    let row = sqlx::query_as::<_, StatsRow>(
        "SELECT COUNT(*) AS total_posts, \
                AVG(sentiment_score) AS avg_sentiment, \
                COUNT(*) FILTER (WHERE sentiment_score >= 0.6) AS positive_count, \
                COUNT(*) FILTER (WHERE sentiment_score >= 0.4 AND sentiment_score < 0.6) AS neutral_count, \
                COUNT(*) FILTER (WHERE sentiment_score < 0.4) AS negative_count \
         FROM posts",
    )
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Strongly negative posts (score `< 0.3`), lowest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn negative_posts(pool: &PgPool, limit: i64) -> Result<Vec<PostRow>, DbError> {
    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts \
         WHERE sentiment_score < 0.3 \
         ORDER BY sentiment_score ASC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Per-keyword rollup over all posts, largest keyword first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn keyword_stats(pool: &PgPool) -> Result<Vec<KeywordStatsRow>, DbError> {
    let rows = sqlx::query_as::<_, KeywordStatsRow>(
        "SELECT keyword, \
                COUNT(*) AS total_posts, \
                AVG(sentiment_score) AS avg_sentiment, \
                COUNT(*) FILTER (WHERE sentiment_score >= 0.6) AS positive_count, \
                COUNT(*) FILTER (WHERE sentiment_score < 0.4) AS negative_count \
         FROM posts GROUP BY keyword ORDER BY total_posts DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Posts published within the calendar day `date` (UTC).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn posts_for_day(pool: &PgPool, date: NaiveDate) -> Result<Vec<PostRow>, DbError> {
    let day_start = date.and_time(NaiveTime::MIN).and_utc();
    let day_end = day_start + Duration::days(1);
    let rows = sqlx::query_as::<_, PostRow>(&format!(
        "SELECT {POST_COLUMNS} FROM posts \
         WHERE published_at >= $1 AND published_at < $2 \
         ORDER BY published_at ASC"
    ))
    .bind(day_start)
    .bind(day_end)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Deletes posts, reports, and logs older than `retention_days`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any delete fails.
pub async fn cleanup_old_data(
    pool: &PgPool,
    retention_days: i64,
) -> Result<CleanupOutcome, DbError> {
    let cutoff = Utc::now() - Duration::days(retention_days);

    let posts_deleted = sqlx::query("DELETE FROM posts WHERE published_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?
        .rows_affected();
    let reports_deleted = sqlx::query("DELETE FROM daily_reports WHERE report_date < $1")
        .bind(cutoff.date_naive())
        .execute(pool)
        .await?
        .rows_affected();
    let logs_deleted = sqlx::query("DELETE FROM collection_logs WHERE created_at < $1")
        .bind(cutoff)
        .execute(pool)
        .await?
        .rows_affected();

    tracing::info!(
        retention_days,
        posts_deleted,
        reports_deleted,
        logs_deleted,
        "retention cleanup complete"
    );
    Ok(CleanupOutcome {
        posts_deleted,
        reports_deleted,
        logs_deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_conversion_rederives_label_from_score() {
        let row = PostRow {
            post_id: "p1".to_owned(),
            title: "标题".to_owned(),
            body: "正文".to_owned(),
            author: "作者".to_owned(),
            source_url: "https://example.com/p/p1".to_owned(),
            keyword: "AI".to_owned(),
            sentiment_score: 0.2,
            sentiment_label: "positive".to_owned(), // stale label is ignored
            like_count: 3,
            published_at: Utc::now(),
            collected_at: Utc::now(),
        };
        let post = row.into_post();
        assert_eq!(post.sentiment_label, SentimentLabel::Negative);
        assert_eq!(post.id, "p1");
    }
}
