use crate::error::Result;
use crate::models::favorite::Favorite;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde_json::{json, Value};

pub async fn add_favorite_handler(
    State(app_state): State<AppState>,
    Json(favorite): Json<Favorite>,
) -> Result<Json<Value>> {
    app_state
        .favorite_service
        .add(favorite.user_id, favorite.landmark_id)
        .await?;

    Ok(Json(json!({ "message": "Favorite added successfully" })))
}

pub async fn remove_favorite_handler(
    State(app_state): State<AppState>,
    Query(favorite): Query<Favorite>,
) -> Result<Json<Value>> {
    app_state
        .favorite_service
        .remove(favorite.user_id, favorite.landmark_id)
        .await?;

    Ok(Json(json!({ "message": "Favorite removed successfully" })))
}

pub async fn list_favorites_handler(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>> {
    let favorites = app_state.favorite_service.list(user_id).await?;
    Ok(Json(json!({ "favorites": favorites })))
}
