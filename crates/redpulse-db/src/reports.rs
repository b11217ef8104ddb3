//! Database operations for the `daily_reports` table.
//!
//! Reports are write-once per calendar day; `keyword_summary` and
//! `top_negative_posts` are stored as JSONB columns.

use chrono::NaiveDate;
use sqlx::PgPool;

use redpulse_core::DailyReport;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct ReportRow {
    report_date: NaiveDate,
    total_posts: i64,
    positive_count: i64,
    neutral_count: i64,
    negative_count: i64,
    avg_sentiment: f64,
    keyword_summary: serde_json::Value,
    top_negative_posts: serde_json::Value,
}

impl ReportRow {
    fn into_report(self) -> Result<DailyReport, DbError> {
        Ok(DailyReport {
            report_date: self.report_date,
            total_posts: self.total_posts,
            positive_count: self.positive_count,
            neutral_count: self.neutral_count,
            negative_count: self.negative_count,
            avg_sentiment: self.avg_sentiment,
            keyword_summary: serde_json::from_value(self.keyword_summary)?,
            top_negative_posts: serde_json::from_value(self.top_negative_posts)?,
        })
    }
}

const REPORT_COLUMNS: &str = "report_date, total_posts, positive_count, neutral_count, \
     negative_count, avg_sentiment, keyword_summary, top_negative_posts";

/// Inserts a report; a report already existing for the date is left
/// untouched (write-once).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, or [`DbError::Decode`] if
/// the JSON columns cannot be encoded.
pub async fn insert_report(pool: &PgPool, report: &DailyReport) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO daily_reports (report_date, total_posts, positive_count, neutral_count, \
                                    negative_count, avg_sentiment, keyword_summary, top_negative_posts) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (report_date) DO NOTHING",
    )
    .bind(report.report_date)
    .bind(report.total_posts)
    .bind(report.positive_count)
    .bind(report.neutral_count)
    .bind(report.negative_count)
    .bind(report.avg_sentiment)
    .bind(serde_json::to_value(&report.keyword_summary)?)
    .bind(serde_json::to_value(&report.top_negative_posts)?)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetches the report for `date`, if one was generated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Decode`] if
/// the stored JSON does not match the domain types.
pub async fn report_for_date(
    pool: &PgPool,
    date: NaiveDate,
) -> Result<Option<DailyReport>, DbError> {
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {REPORT_COLUMNS} FROM daily_reports WHERE report_date = $1"
    ))
    .bind(date)
    .fetch_optional(pool)
    .await?;
    row.map(ReportRow::into_report).transpose()
}

/// The most recent report by date.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Decode`] if
/// the stored JSON does not match the domain types.
pub async fn latest_report(pool: &PgPool) -> Result<Option<DailyReport>, DbError> {
    let row = sqlx::query_as::<_, ReportRow>(&format!(
        "SELECT {REPORT_COLUMNS} FROM daily_reports ORDER BY report_date DESC LIMIT 1"
    ))
    .fetch_optional(pool)
    .await?;
    row.map(ReportRow::into_report).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_row_round_trips_json_columns() {
        let report = DailyReport {
            report_date: NaiveDate::from_ymd_opt(2026, 8, 27).expect("valid date"),
            total_posts: 3,
            positive_count: 1,
            neutral_count: 1,
            negative_count: 1,
            avg_sentiment: 0.5,
            keyword_summary: vec![],
            top_negative_posts: vec![],
        };
        let row = ReportRow {
            report_date: report.report_date,
            total_posts: report.total_posts,
            positive_count: report.positive_count,
            neutral_count: report.neutral_count,
            negative_count: report.negative_count,
            avg_sentiment: report.avg_sentiment,
            keyword_summary: serde_json::to_value(&report.keyword_summary).expect("encode"),
            top_negative_posts: serde_json::to_value(&report.top_negative_posts).expect("encode"),
        };
        let decoded = row.into_report().expect("decode");
        assert_eq!(decoded.report_date, report.report_date);
        assert_eq!(decoded.total_posts, 3);
        assert!(decoded.keyword_summary.is_empty());
    }
}
