//! `GET /progress` and `DELETE /progress`: checkpoint inspect/reset.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Serialize;

use redpulse_core::CollectionProgress;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

pub(super) async fn get_progress(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let progress: Option<CollectionProgress> = redpulse_db::load_checkpoint(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: progress,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct ClearData {
    cleared: bool,
}

pub(super) async fn clear_progress(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    redpulse_db::clear_checkpoint(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!("collection checkpoint cleared via API");
    Ok(Json(ApiResponse {
        data: ClearData { cleared: true },
        meta: ResponseMeta::new(req_id.0),
    }))
}
