use crate::error::{AppError, Result};
use crate::models::user::{ProfileUpdate, UserProfile};
use crate::services::user_service::{ChangePasswordRequest, LoginRequest, RegisterRequest};
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Form,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub avatar_uri: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdatePasswordForm {
    pub old_password: String,
    pub new_password: String,
}

pub async fn register_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse> {
    let request = RegisterRequest {
        name: payload.name,
        email: payload.email,
        password: payload.password,
        avatar_uri: payload.avatar_uri,
    };

    let user = app_state.user_service.register(request).await?;
    tracing::info!("Registered user {} ({})", user.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

pub async fn login_handler(
    State(app_state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<UserProfile>> {
    let request = LoginRequest {
        email: form.email,
        password: form.password,
    };

    let user = app_state.user_service.authenticate(request).await?;
    Ok(Json(UserProfile::from(user)))
}

/// Accepts a multipart body whose `file` field holds the image.
pub async fn upload_avatar_handler(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let contents = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;

        let avatar_uri = app_state
            .avatar_service
            .store(user_id, &filename, &contents)
            .await?;

        return Ok(Json(json!({ "avatar_uri": avatar_uri })));
    }

    Err(AppError::InvalidInput("Missing file field".to_string()))
}

pub async fn get_user_handler(
    State(app_state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<UserProfile>> {
    let profile = app_state.user_service.get_profile(&email).await?;
    Ok(Json(profile))
}

pub async fn update_user_handler(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Value>> {
    app_state
        .user_service
        .update_profile(user_id, update)
        .await?;

    Ok(Json(json!({ "message": "User updated successfully" })))
}

pub async fn update_password_handler(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
    Form(form): Form<UpdatePasswordForm>,
) -> Result<Json<Value>> {
    let request = ChangePasswordRequest {
        user_id,
        old_password: form.old_password,
        new_password: form.new_password,
    };

    app_state.user_service.change_password(request).await?;

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

pub async fn delete_user_handler(
    State(app_state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>> {
    app_state.user_service.delete_user(user_id).await?;
    tracing::info!("Deleted user {}", user_id);

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
