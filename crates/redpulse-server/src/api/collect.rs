//! `POST /collect`: trigger a collection run.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use redpulse_pipeline::CollectionSummary;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::collect::CollectError;
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub(super) struct CollectData {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<RunSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct RunSummary {
    session_id: Uuid,
    resumed: bool,
    keywords_total: usize,
    keywords_succeeded: usize,
    keywords_fallback: usize,
    keywords_failed: usize,
    collected: usize,
    saved: usize,
    duplicates: usize,
    errors: usize,
}

impl From<CollectionSummary> for RunSummary {
    fn from(s: CollectionSummary) -> Self {
        RunSummary {
            session_id: s.session_id,
            resumed: s.resumed,
            keywords_total: s.keywords_total,
            keywords_succeeded: s.keywords_succeeded,
            keywords_fallback: s.keywords_fallback,
            keywords_failed: s.keywords_failed,
            collected: s.collected,
            saved: s.saved,
            duplicates: s.duplicates,
            errors: s.errors,
        }
    }
}

/// Run failures come back as a structured `failed` payload, not a 5xx; only
/// a missing keyword config is a client error.
pub(super) async fn trigger_collect(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let meta = ResponseMeta::new(req_id.0.clone());

    match state.runner.run_once().await {
        Ok(summary) => Ok(Json(ApiResponse {
            data: CollectData {
                status: "completed",
                summary: Some(summary.into()),
                error: None,
            },
            meta,
        })),
        Err(CollectError::NoKeywords) => Err(ApiError::new(
            req_id.0,
            "validation_error",
            "no keywords configured; set them via PUT /config",
        )),
        Err(err) => {
            tracing::error!(error = %err, "collection run failed");
            Ok(Json(ApiResponse {
                data: CollectData {
                    status: "failed",
                    summary: None,
                    error: Some(err.to_string()),
                },
                meta,
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_data_omits_empty_fields() {
        let data = CollectData {
            status: "failed",
            summary: None,
            error: Some("no posts".to_owned()),
        };
        let json = serde_json::to_value(&data).expect("serialize");
        assert_eq!(json["status"], "failed");
        assert!(json.get("summary").is_none());
        assert_eq!(json["error"], "no posts");
    }

    #[test]
    fn run_summary_maps_all_counters() {
        let summary = CollectionSummary {
            session_id: Uuid::new_v4(),
            resumed: true,
            keywords_total: 3,
            keywords_succeeded: 2,
            keywords_fallback: 1,
            keywords_failed: 0,
            collected: 40,
            saved: 35,
            duplicates: 5,
            errors: 0,
        };
        let mapped = RunSummary::from(summary.clone());
        assert_eq!(mapped.session_id, summary.session_id);
        assert_eq!(mapped.collected, 40);
        assert_eq!(mapped.duplicates, 5);
        let json = serde_json::to_value(&mapped).expect("serialize");
        assert_eq!(json["keywords_fallback"], 1);
    }
}
