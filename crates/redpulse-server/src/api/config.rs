//! `GET /config` and `PUT /config`: monitor config read/write.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;

use redpulse_core::TimeWindow;
use redpulse_db::MonitorConfig;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

pub(super) async fn get_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<impl IntoResponse, ApiError> {
    let config = redpulse_db::load_monitor_config(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: config,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// All fields optional; omitted fields keep their current value.
#[derive(Debug, Deserialize)]
pub(super) struct ConfigUpdate {
    keywords: Option<Vec<String>>,
    enabled: Option<bool>,
    max_posts: Option<u32>,
    time_window: Option<TimeWindow>,
}

pub(super) async fn update_config(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(update): Json<ConfigUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let mut config = redpulse_db::load_monitor_config(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    apply_update(&mut config, update).map_err(|msg| {
        ApiError::new(req_id.0.clone(), "validation_error", msg)
    })?;

    redpulse_db::save_monitor_config(&state.pool, &config)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(
        keywords = config.keywords.len(),
        enabled = config.enabled,
        "monitor config updated"
    );
    Ok(Json(ApiResponse {
        data: config,
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn apply_update(config: &mut MonitorConfig, update: ConfigUpdate) -> Result<(), String> {
    if let Some(keywords) = update.keywords {
        let cleaned: Vec<String> = keywords
            .into_iter()
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty())
            .collect();
        if cleaned.is_empty() {
            return Err("keywords must contain at least one non-empty entry".to_owned());
        }
        config.keywords = cleaned;
    }
    if let Some(enabled) = update.enabled {
        config.enabled = enabled;
    }
    if let Some(max_posts) = update.max_posts {
        if !(1..=50).contains(&max_posts) {
            return Err(format!("max_posts must be 1..=50, got {max_posts}"));
        }
        config.max_posts = max_posts;
    }
    if let Some(window) = update.time_window {
        config.time_window = window;
    }
    Ok(())
}
