use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json},
};
use serde_json::json;

/// The catalog never changes while the process runs.
const CATALOG_CACHE_CONTROL: &str = "public, max-age=300";

pub async fn list_landmarks_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, CATALOG_CACHE_CONTROL)],
        Json(json!({ "landmarks": app_state.catalog.all() })),
    )
}

pub async fn get_landmark_handler(
    State(app_state): State<AppState>,
    Path(landmark_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let landmark = app_state
        .catalog
        .get(landmark_id)
        .ok_or_else(|| AppError::NotFound("Landmark not found".to_string()))?;

    Ok((
        [(header::CACHE_CONTROL, CATALOG_CACHE_CONTROL)],
        Json(landmark.clone()),
    ))
}
