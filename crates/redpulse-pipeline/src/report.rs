//! Daily report aggregation.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;

use redpulse_core::{DailyReport, KeywordSummary, Post};

use crate::error::PipelineError;
use crate::traits::ReportStore;

/// Posts at or above this score count as positive in the rollup.
const REPORT_POSITIVE_THRESHOLD: f64 = 0.6;
/// Posts below this score count as negative in the rollup.
const REPORT_NEGATIVE_THRESHOLD: f64 = 0.4;
/// Lowest-scoring posts surfaced per report.
const TOP_NEGATIVE_LIMIT: usize = 10;

/// Builds (or returns) the daily report for `date`.
///
/// Idempotent: an existing report is returned as-is without recomputation.
/// Returns `Ok(None)` when no posts fall within the day.
///
/// # Errors
///
/// Returns [`PipelineError::Storage`] if any store operation fails.
pub async fn build_daily_report(
    store: &dyn ReportStore,
    date: NaiveDate,
) -> Result<Option<DailyReport>, PipelineError> {
    if let Some(existing) = store
        .report_for_date(date)
        .await
        .map_err(PipelineError::Storage)?
    {
        tracing::debug!(%date, "daily report already exists, skipping rebuild");
        return Ok(Some(existing));
    }

    let posts = store
        .posts_for_day(date)
        .await
        .map_err(PipelineError::Storage)?;
    if posts.is_empty() {
        tracing::info!(%date, "no posts for day, skipping report");
        return Ok(None);
    }

    let report = aggregate_report(date, &posts);
    store
        .save_report(&report)
        .await
        .map_err(PipelineError::Storage)?;
    tracing::info!(
        %date,
        total_posts = report.total_posts,
        negative = report.negative_count,
        "daily report generated"
    );
    Ok(Some(report))
}

fn aggregate_report(date: NaiveDate, posts: &[Post]) -> DailyReport {
    let mut positive = 0i64;
    let mut negative = 0i64;
    let mut score_sum = 0.0f64;
    // BTreeMap keeps keyword summaries in a stable order.
    let mut by_keyword: BTreeMap<&str, (i64, i64, i64, f64)> = BTreeMap::new();

    for post in posts {
        score_sum += post.sentiment_score;
        let is_positive = post.sentiment_score >= REPORT_POSITIVE_THRESHOLD;
        let is_negative = post.sentiment_score < REPORT_NEGATIVE_THRESHOLD;
        if is_positive {
            positive += 1;
        } else if is_negative {
            negative += 1;
        }

        let entry = by_keyword.entry(&post.keyword).or_default();
        entry.0 += 1;
        entry.1 += i64::from(is_positive);
        entry.2 += i64::from(is_negative);
        entry.3 += post.sentiment_score;
    }

    let total = i64::try_from(posts.len()).unwrap_or(i64::MAX);
    #[allow(clippy::cast_precision_loss)]
    let avg_sentiment = score_sum / posts.len() as f64;

    let keyword_summary = by_keyword
        .into_iter()
        .map(|(keyword, (count, pos, neg, sum))| {
            #[allow(clippy::cast_precision_loss)]
            let avg = sum / count as f64;
            KeywordSummary {
                keyword: keyword.to_owned(),
                total_posts: count,
                positive_count: pos,
                negative_count: neg,
                avg_sentiment: avg,
            }
        })
        .collect();

    let mut sorted: Vec<&Post> = posts.iter().collect();
    sorted.sort_by(|a, b| {
        a.sentiment_score
            .partial_cmp(&b.sentiment_score)
            .unwrap_or(Ordering::Equal)
    });
    let top_negative_posts = sorted
        .into_iter()
        .take(TOP_NEGATIVE_LIMIT)
        .cloned()
        .collect();

    DailyReport {
        report_date: date,
        total_posts: total,
        positive_count: positive,
        neutral_count: total - positive - negative,
        negative_count: negative,
        avg_sentiment,
        keyword_summary,
        top_negative_posts,
    }
}
