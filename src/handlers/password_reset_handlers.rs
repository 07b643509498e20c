use crate::error::Result;
use crate::AppState;
use axum::{extract::State, response::Json, Form};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct InitiateForm {
    pub email: String,
}

#[derive(Deserialize)]
pub struct VerifyForm {
    pub email: String,
    pub code: String,
}

#[derive(Deserialize)]
pub struct CompleteForm {
    pub user_id: i64,
    pub new_password: String,
    #[serde(default)]
    pub reset_token: Option<String>,
}

pub async fn initiate_reset_handler(
    State(app_state): State<AppState>,
    Form(form): Form<InitiateForm>,
) -> Result<Json<Value>> {
    app_state
        .password_reset_service
        .initiate(&form.email)
        .await?;

    Ok(Json(json!({ "message": "Reset code sent to your email" })))
}

pub async fn verify_reset_handler(
    State(app_state): State<AppState>,
    Form(form): Form<VerifyForm>,
) -> Result<Json<Value>> {
    let verified = app_state
        .password_reset_service
        .verify(&form.email, form.code.trim())
        .await?;

    Ok(Json(json!({
        "verified": true,
        "user_id": verified.user_id,
        "reset_token": verified.reset_token,
    })))
}

pub async fn complete_reset_handler(
    State(app_state): State<AppState>,
    Form(form): Form<CompleteForm>,
) -> Result<Json<Value>> {
    // Clients that predate reset tokens send an empty field
    let reset_token = form.reset_token.as_deref().filter(|t| !t.is_empty());

    app_state
        .password_reset_service
        .complete(form.user_id, &form.new_password, reset_token)
        .await?;

    Ok(Json(json!({ "message": "Password has been reset successfully" })))
}
