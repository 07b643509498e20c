use crate::error::Result;
use crate::models::comment::NewComment;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct DeleteCommentQuery {
    pub user_id: i64,
    pub landmark_id: i64,
    pub comment: String,
}

pub async fn add_comment_handler(
    State(app_state): State<AppState>,
    Json(new_comment): Json<NewComment>,
) -> Result<Json<Value>> {
    let comment = app_state
        .comment_service
        .add(
            new_comment.user_id,
            new_comment.landmark_id,
            &new_comment.comment,
        )
        .await?;

    Ok(Json(json!({
        "message": "Comment added successfully",
        "id": comment.id,
        "date": comment.date,
    })))
}

pub async fn delete_matching_comments_handler(
    State(app_state): State<AppState>,
    Query(query): Query<DeleteCommentQuery>,
) -> Result<Json<Value>> {
    let deleted = app_state
        .comment_service
        .delete_matching(query.user_id, query.landmark_id, &query.comment)
        .await?;

    if deleted > 1 {
        tracing::debug!("Text-match delete removed {} identical comments", deleted);
    }

    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}

pub async fn delete_comment_handler(
    State(app_state): State<AppState>,
    Path(comment_id): Path<i64>,
) -> Result<Json<Value>> {
    app_state.comment_service.delete(comment_id).await?;
    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}

pub async fn landmark_comments_handler(
    State(app_state): State<AppState>,
    Path(landmark_id): Path<i64>,
) -> Result<Json<Value>> {
    let comments = app_state.comment_service.for_landmark(landmark_id).await?;
    Ok(Json(json!({ "comments": comments })))
}

pub async fn user_reviews_handler(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>> {
    let reviews = app_state.comment_service.reviews_for_user(user_id).await?;
    Ok(Json(json!({ "reviews": reviews })))
}
