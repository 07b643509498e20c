use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use place_backend::{
    routes::app_router,
    services::EmailService,
    test_utils::test_helpers::{self, FailingEmailService, ManualClock, RecordingEmailService},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    mail: RecordingEmailService,
    clock: Arc<ManualClock>,
    _avatar_dir: TempDir,
}

async fn test_app() -> TestApp {
    let mail = RecordingEmailService::new();
    test_app_with_mail(mail.clone(), Box::new(mail)).await
}

async fn test_app_with_mail(
    mail: RecordingEmailService,
    email_service: Box<dyn EmailService>,
) -> TestApp {
    let pool = test_helpers::create_test_db().await.unwrap();
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let (state, avatar_dir) =
        test_helpers::build_test_state(pool, email_service, clock.clone())
            .await
            .unwrap();

    TestApp {
        router: app_router(state),
        mail,
        clock,
        _avatar_dir: avatar_dir,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, _, body) = self.send(request).await;
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, value)
    }
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(method: Method, uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn multipart_request(uri: &str, field: &str, filename: &str, contents: &[u8]) -> Request<Body> {
    let boundary = "place-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn register(app: &TestApp, name: &str, email: &str, password: &str) {
    let (status, body) = app
        .send_json(json_request(
            Method::POST,
            "/users/register",
            json!({ "name": name, "email": email, "password": password }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
}

#[tokio::test]
async fn test_user_lifecycle() {
    let app = test_app().await;

    register(&app, "A", "a@x.com", "p1").await;

    let (status, profile) = app
        .send_json(form_request(
            Method::POST,
            "/users/login",
            &[("email", "a@x.com"), ("password", "p1")],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["id"], 1);
    assert_eq!(profile["name"], "A");
    assert_eq!(profile["avatar_uri"], "@drawable/avatar2");
    assert!(profile.get("password_hash").is_none());

    let (status, body) = app
        .send_json(json_request(Method::PUT, "/users/1", json!({ "name": "B" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated successfully");

    let (status, profile) = app
        .send_json(empty_request(Method::GET, "/users/a@x.com"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "B");

    let (status, _) = app
        .send_json(empty_request(Method::DELETE, "/users/1"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send_json(empty_request(Method::DELETE, "/users/1"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "User not found");
}

#[tokio::test]
async fn test_register_conflict_and_bad_login() {
    let app = test_app().await;

    register(&app, "A", "a@x.com", "p1").await;

    let (status, body) = app
        .send_json(json_request(
            Method::POST,
            "/users/register",
            json!({ "name": "B", "email": "a@x.com", "password": "p2" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Email already registered");

    let (status, body) = app
        .send_json(form_request(
            Method::POST,
            "/users/login",
            &[("email", "a@x.com"), ("password", "wrong")],
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid credentials");
}

#[tokio::test]
async fn test_empty_profile_update() {
    let app = test_app().await;
    register(&app, "A", "a@x.com", "p1").await;

    let (status, body) = app
        .send_json(json_request(Method::PUT, "/users/1", json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "No fields to update");
}

#[tokio::test]
async fn test_password_update() {
    let app = test_app().await;
    register(&app, "A", "a@x.com", "p1").await;

    let (status, body) = app
        .send_json(form_request(
            Method::PUT,
            "/users/1/password",
            &[("old_password", "bad"), ("new_password", "p2")],
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid old password");

    let (status, _) = app
        .send_json(form_request(
            Method::PUT,
            "/users/1/password",
            &[("old_password", "p1"), ("new_password", "p2")],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send_json(form_request(
            Method::POST,
            "/users/login",
            &[("email", "a@x.com"), ("password", "p2")],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_comment_lifecycle() {
    let app = test_app().await;
    register(&app, "A", "a@x.com", "p1").await;

    let (status, body) = app
        .send_json(json_request(
            Method::POST,
            "/comments",
            json!({ "user_id": 1, "landmark_id": 5, "comment": "nice", "date": "01.01.2025 12:00" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment added successfully");

    let (status, body) = app
        .send_json(empty_request(Method::GET, "/comments/landmark/5"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["comment"], "nice");
    assert_eq!(comments[0]["user_name"], "A");
    assert_eq!(comments[0]["avatar_uri"], "@drawable/avatar2");

    let (status, body) = app
        .send_json(empty_request(Method::GET, "/comments/user/1"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reviews"][0]["landmark_id"], 5);
    assert!(body["reviews"][0]["landmark_name"].is_string());

    let uri = "/comments?user_id=1&landmark_id=5&comment=nice";
    let (status, _) = app.send_json(empty_request(Method::DELETE, uri)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send_json(empty_request(Method::DELETE, uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Comment not found");
}

#[tokio::test]
async fn test_comment_delete_by_id() {
    let app = test_app().await;
    register(&app, "A", "a@x.com", "p1").await;

    let (_, body) = app
        .send_json(json_request(
            Method::POST,
            "/comments",
            json!({ "user_id": 1, "landmark_id": 2, "comment": "same" }),
        ))
        .await;
    let id = body["id"].as_i64().unwrap();

    let (status, _) = app
        .send_json(empty_request(Method::DELETE, &format!("/comments/{}", id)))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send_json(empty_request(Method::DELETE, &format!("/comments/{}", id)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorites_endpoints() {
    let app = test_app().await;
    register(&app, "A", "a@x.com", "p1").await;

    let favorite = json!({ "user_id": 1, "landmark_id": 3 });
    let (status, _) = app
        .send_json(json_request(Method::POST, "/favorites", favorite.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send_json(json_request(Method::POST, "/favorites", favorite))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Favorite already exists");

    let (_, body) = app
        .send_json(empty_request(Method::GET, "/favorites/1"))
        .await;
    assert_eq!(body, json!({ "favorites": [3] }));

    let uri = "/favorites?user_id=1&landmark_id=3";
    let (status, _) = app.send_json(empty_request(Method::DELETE, uri)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.send_json(empty_request(Method::DELETE, uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Favorite not found");
}

#[tokio::test]
async fn test_password_reset_endpoints() {
    let app = test_app().await;
    register(&app, "A", "a@x.com", "p1").await;

    let (status, body) = app
        .send_json(form_request(
            Method::POST,
            "/password-reset/initiate",
            &[("email", "nobody@x.com")],
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "User not found");

    let (status, _) = app
        .send_json(form_request(
            Method::POST,
            "/password-reset/initiate",
            &[("email", "a@x.com")],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let code = app.mail.last_code_for("a@x.com").await.unwrap();

    let (status, body) = app
        .send_json(form_request(
            Method::POST,
            "/password-reset/verify",
            &[("email", "a@x.com"), ("code", &code)],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verified"], true);
    assert_eq!(body["user_id"], 1);
    let token = body["reset_token"].as_str().unwrap().to_string();

    let (status, body) = app
        .send_json(form_request(
            Method::POST,
            "/password-reset/complete",
            &[
                ("user_id", "1"),
                ("new_password", "p9"),
                ("reset_token", &token),
            ],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Password has been reset successfully");

    let (status, _) = app
        .send_json(form_request(
            Method::POST,
            "/users/login",
            &[("email", "a@x.com"), ("password", "p9")],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_avatar_upload_and_serving() {
    let app = test_app().await;
    register(&app, "A", "a@x.com", "p1").await;

    let png = b"\x89PNG\r\n\x1a\nnot-really-an-image";
    let (status, body) = app
        .send_json(multipart_request("/users/1/avatar", "file", "me.png", png))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["avatar_uri"], "/avatars/a@x.com.png");

    let (_, profile) = app
        .send_json(empty_request(Method::GET, "/users/a@x.com"))
        .await;
    assert_eq!(profile["avatar_uri"], "/avatars/a@x.com.png");

    let (status, _, served) = app
        .send(empty_request(Method::GET, "/avatars/a@x.com.png"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, png.to_vec());
}

#[tokio::test]
async fn test_avatar_upload_rejections() {
    let app = test_app().await;
    register(&app, "A", "a@x.com", "p1").await;

    let (status, _) = app
        .send_json(multipart_request("/users/99/avatar", "file", "me.png", b"data"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send_json(multipart_request("/users/1/avatar", "file", "run.sh", b"data"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send_json(multipart_request("/users/1/avatar", "other", "me.png", b"data"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_landmarks_are_cacheable() {
    let app = test_app().await;

    let (status, headers, body) = app.send(empty_request(Method::GET, "/landmarks")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=300");
    let body: Value = serde_json::from_slice(&body).unwrap();
    let landmarks = body["landmarks"].as_array().unwrap();
    assert!(!landmarks.is_empty());

    let (status, headers, body) = app.send(empty_request(Method::GET, "/landmarks/3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CACHE_CONTROL], "public, max-age=300");
    let landmark: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(landmark["id"], 3);

    let (status, body) = app
        .send_json(empty_request(Method::GET, "/landmarks/999"))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Landmark not found");
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let app = test_app().await;

    let (status, body) = app.send_json(empty_request(Method::GET, "/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to Place API");
    assert!(body["endpoints"]["register"].is_string());
}

#[tokio::test]
async fn test_reset_verify_rejections() {
    let app = test_app().await;
    register(&app, "A", "a@x.com", "p1").await;

    let (status, body) = app
        .send_json(form_request(
            Method::POST,
            "/password-reset/verify",
            &[("email", "a@x.com"), ("code", "123456")],
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No reset request found for this email");

    let (status, _) = app
        .send_json(form_request(
            Method::POST,
            "/password-reset/initiate",
            &[("email", "a@x.com")],
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let code = app.mail.last_code_for("a@x.com").await.unwrap();
    let wrong = if code == "000000" { "111111" } else { "000000" };

    let (status, body) = app
        .send_json(form_request(
            Method::POST,
            "/password-reset/verify",
            &[("email", "a@x.com"), ("code", wrong)],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid reset code");

    app.clock.advance(Duration::minutes(11));

    let (status, body) = app
        .send_json(form_request(
            Method::POST,
            "/password-reset/verify",
            &[("email", "a@x.com"), ("code", &code)],
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Reset code has expired");

    let (status, body) = app
        .send_json(form_request(
            Method::POST,
            "/password-reset/verify",
            &[("email", "a@x.com"), ("code", &code)],
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No reset request found for this email");
}

#[tokio::test]
async fn test_reset_initiate_delivery_failure() {
    let app = test_app_with_mail(RecordingEmailService::new(), Box::new(FailingEmailService)).await;
    register(&app, "A", "a@x.com", "p1").await;

    let (status, body) = app
        .send_json(form_request(
            Method::POST,
            "/password-reset/initiate",
            &[("email", "a@x.com")],
        ))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"]
        .as_str()
        .unwrap()
        .starts_with("Email sending error"));
}
