//! Core domain types shared across the workspace.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Checkpoint status while a run is walking the keyword list.
pub const PROGRESS_STATUS_COLLECTING: &str = "collecting";

/// Time filter passed to the scraping provider.
///
/// The provider encodes this as `note_time` in the search request body:
/// `0` unbounded, `1` one day, `2` one week, `3` six months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    Unbounded,
    OneDay,
    #[default]
    OneWeek,
    SixMonths,
}

impl TimeWindow {
    /// Wire code used by the provider API.
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            TimeWindow::Unbounded => 0,
            TimeWindow::OneDay => 1,
            TimeWindow::OneWeek => 2,
            TimeWindow::SixMonths => 3,
        }
    }

    /// Parses a provider wire code; unknown codes fall back to the default
    /// one-week window.
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => TimeWindow::Unbounded,
            1 => TimeWindow::OneDay,
            3 => TimeWindow::SixMonths,
            _ => TimeWindow::OneWeek,
        }
    }
}

/// Sentiment label derived from a score in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentimentLabel {
    Positive,
    LeanPositive,
    Neutral,
    LeanNegative,
    Negative,
}

impl SentimentLabel {
    /// Maps a score to its label band.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            SentimentLabel::Positive
        } else if score >= 0.6 {
            SentimentLabel::LeanPositive
        } else if score >= 0.4 {
            SentimentLabel::Neutral
        } else if score >= 0.3 {
            SentimentLabel::LeanNegative
        } else {
            SentimentLabel::Negative
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::LeanPositive => "lean-positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::LeanNegative => "lean-negative",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scored social-media post, immutable once persisted.
///
/// `id` is the provider-assigned identifier and the storage key; persisting
/// the same id again upserts rather than duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author: String,
    pub source_url: String,
    pub keyword: String,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub like_count: i64,
    pub published_at: DateTime<Utc>,
}

/// Pipeline position persisted between keywords so an interrupted run can
/// resume within the session window.
///
/// Exactly one progress record exists at a time; `current_index` is always
/// `< total_keywords` while `status` is `"collecting"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionProgress {
    pub session_id: Uuid,
    pub current_index: usize,
    pub total_keywords: usize,
    pub current_keyword: String,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: String,
}

/// Per-keyword slice of a daily report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSummary {
    pub keyword: String,
    pub total_posts: i64,
    pub positive_count: i64,
    pub negative_count: i64,
    pub avg_sentiment: f64,
}

/// Daily rollup, generated once per calendar day (write-once).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReport {
    pub report_date: NaiveDate,
    pub total_posts: i64,
    pub positive_count: i64,
    pub neutral_count: i64,
    pub negative_count: i64,
    pub avg_sentiment: f64,
    pub keyword_summary: Vec<KeywordSummary>,
    pub top_negative_posts: Vec<Post>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_window_codes_round_trip() {
        for w in [
            TimeWindow::Unbounded,
            TimeWindow::OneDay,
            TimeWindow::OneWeek,
            TimeWindow::SixMonths,
        ] {
            assert_eq!(TimeWindow::from_code(w.code()), w);
        }
    }

    #[test]
    fn unknown_time_window_code_defaults_to_one_week() {
        assert_eq!(TimeWindow::from_code(42), TimeWindow::OneWeek);
    }

    #[test]
    fn label_band_boundaries() {
        assert_eq!(SentimentLabel::from_score(1.0), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(0.7), SentimentLabel::Positive);
        assert_eq!(
            SentimentLabel::from_score(0.65),
            SentimentLabel::LeanPositive
        );
        assert_eq!(SentimentLabel::from_score(0.5), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.4), SentimentLabel::Neutral);
        assert_eq!(
            SentimentLabel::from_score(0.35),
            SentimentLabel::LeanNegative
        );
        assert_eq!(SentimentLabel::from_score(0.0), SentimentLabel::Negative);
    }

    #[test]
    fn label_serializes_kebab_case() {
        let json = serde_json::to_string(&SentimentLabel::LeanNegative).unwrap();
        assert_eq!(json, "\"lean-negative\"");
    }
}
