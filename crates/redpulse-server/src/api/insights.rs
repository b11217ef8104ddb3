//! Read-side endpoints: stats, negative posts, keyword rollups, logs,
//! daily report, and retention cleanup.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use redpulse_core::Post;
use redpulse_db::{KeywordStatsRow, LogRow, PostRow};

use super::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

const DEFAULT_RETENTION_DAYS: i64 = 90;

#[derive(Debug, Deserialize)]
pub(super) struct LimitQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct StatsData {
    total_posts: i64,
    avg_sentiment: Option<f64>,
    positive_count: i64,
    neutral_count: i64,
    negative_count: i64,
    recent_posts: Vec<Post>,
}

pub(super) async fn get_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = redpulse_db::post_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let recent = redpulse_db::recent_posts(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: StatsData {
            total_posts: stats.total_posts,
            avg_sentiment: stats.avg_sentiment,
            positive_count: stats.positive_count,
            neutral_count: stats.neutral_count,
            negative_count: stats.negative_count,
            recent_posts: recent.into_iter().map(PostRow::into_post).collect(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_negative_posts(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = redpulse_db::negative_posts(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let posts: Vec<Post> = rows.into_iter().map(PostRow::into_post).collect();
    Ok(Json(ApiResponse {
        data: posts,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct KeywordStatsItem {
    keyword: String,
    total_posts: i64,
    avg_sentiment: Option<f64>,
    positive_count: i64,
    negative_count: i64,
}

impl From<KeywordStatsRow> for KeywordStatsItem {
    fn from(row: KeywordStatsRow) -> Self {
        KeywordStatsItem {
            keyword: row.keyword,
            total_posts: row.total_posts,
            avg_sentiment: row.avg_sentiment,
            positive_count: row.positive_count,
            negative_count: row.negative_count,
        }
    }
}

pub(super) async fn list_keyword_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = redpulse_db::keyword_stats(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let items: Vec<KeywordStatsItem> = rows.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct LogItem {
    id: i64,
    level: String,
    message: String,
    detail: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl From<LogRow> for LogItem {
    fn from(row: LogRow) -> Self {
        LogItem {
            id: row.id,
            level: row.level,
            message: row.message,
            detail: row.detail,
            created_at: row.created_at,
        }
    }
}

pub(super) async fn list_logs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = redpulse_db::recent_logs(&state.pool, normalize_limit(query.limit))
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let items: Vec<LogItem> = rows.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_daily_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let report = redpulse_db::latest_report(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    match report {
        Some(report) => Ok(Json(ApiResponse {
            data: report,
            meta: ResponseMeta::new(req_id.0),
        })),
        None => Err(ApiError::new(
            req_id.0,
            "not_found",
            "no daily report has been generated yet",
        )),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CleanupQuery {
    retention_days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct CleanupData {
    retention_days: i64,
    posts_deleted: u64,
    reports_deleted: u64,
    logs_deleted: u64,
}

pub(super) async fn run_cleanup(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CleanupQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let retention_days = query.retention_days.unwrap_or(DEFAULT_RETENTION_DAYS);
    if retention_days < 1 {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("retention_days must be positive, got {retention_days}"),
        ));
    }

    let outcome = redpulse_db::cleanup_old_data(&state.pool, retention_days)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: CleanupData {
            retention_days,
            posts_deleted: outcome.posts_deleted,
            reports_deleted: outcome.reports_deleted,
            logs_deleted: outcome.logs_deleted,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
