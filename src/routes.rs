use crate::config::current_environment;
use crate::handlers;
use crate::services::avatar_service::AVATAR_URL_PREFIX;
use crate::AppState;
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::{Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{services::ServeDir, trace::TraceLayer};

/// Room for multipart boundaries and headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn app_router(app_state: AppState) -> Router {
    let avatar_dir = app_state.avatar_service.directory().to_path_buf();
    let body_limit = app_state.avatar_service.max_bytes() + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(index_handler))
        // Users. GET takes an email, the rest a numeric id.
        .route("/users/register", post(handlers::register_handler))
        .route("/users/login", post(handlers::login_handler))
        .route(
            "/users/{user}",
            get(handlers::get_user_handler)
                .put(handlers::update_user_handler)
                .delete(handlers::delete_user_handler),
        )
        .route("/users/{user}/avatar", post(handlers::upload_avatar_handler))
        .route("/users/{user}/password", put(handlers::update_password_handler))
        // Password reset
        .route("/password-reset/initiate", post(handlers::initiate_reset_handler))
        .route("/password-reset/verify", post(handlers::verify_reset_handler))
        .route("/password-reset/complete", post(handlers::complete_reset_handler))
        // Favorites
        .route(
            "/favorites",
            post(handlers::add_favorite_handler).delete(handlers::remove_favorite_handler),
        )
        .route("/favorites/{user_id}", get(handlers::list_favorites_handler))
        // Comments
        .route(
            "/comments",
            post(handlers::add_comment_handler).delete(handlers::delete_matching_comments_handler),
        )
        .route("/comments/{comment_id}", delete(handlers::delete_comment_handler))
        .route(
            "/comments/landmark/{landmark_id}",
            get(handlers::landmark_comments_handler),
        )
        .route("/comments/user/{user_id}", get(handlers::user_reviews_handler))
        // Catalog
        .route("/landmarks", get(handlers::list_landmarks_handler))
        .route("/landmarks/{landmark_id}", get(handlers::get_landmark_handler))
        // Static files
        .nest_service(AVATAR_URL_PREFIX, ServeDir::new(avatar_dir))
        // Layers
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(add_security_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Place API",
        "endpoints": {
            "register": "/users/register (POST)",
            "login": "/users/login (POST)",
            "user_profile": "/users/{email} (GET)",
            "landmarks": "/landmarks (GET)",
            "password_reset": "/password-reset/initiate (POST)"
        }
    }))
}

async fn add_security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert("Referrer-Policy", HeaderValue::from_static("no-referrer"));

    if current_environment() == "production" {
        headers.insert(
            "Strict-Transport-Security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    }

    response
}
