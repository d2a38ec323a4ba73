#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt;

use spendlog::app::build_app;
use spendlog::config::{AppConfig, JwtConfig};
use spendlog::state::AppState;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_ISSUER: &str = "spendlog";
pub const TEST_AUDIENCE: &str = "spendlog-users";

/// Build the full router over a fresh in-memory database. The pool is
/// capped at one connection so every query sees the same database.
pub async fn test_app() -> (Router, SqlitePool) {
    let db = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory database");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("apply migrations");

    let config = Arc::new(AppConfig {
        database_url: "sqlite::memory:".into(),
        jwt: JwtConfig {
            secret: TEST_SECRET.into(),
            issuer: TEST_ISSUER.into(),
            audience: TEST_AUDIENCE.into(),
            ttl_minutes: 30,
        },
    });
    let state = AppState::from_parts(db.clone(), config);
    (build_app(state), db)
}

pub async fn request(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.expect("route the request")
}

pub fn bare_request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("build request")
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("build request")
}

pub fn form_request(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .expect("build request")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is json")
}

pub async fn register(app: &Router, username: &str, password: &str) -> Value {
    let response = request(
        app,
        json_request(
            Method::POST,
            "/users/register",
            None,
            &json!({"username": username, "password": password}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let form = format!("username={username}&password={password}");
    let response = request(app, form_request("/users/login", &form)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    body["access_token"]
        .as_str()
        .expect("token in login response")
        .to_string()
}

pub async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    register(app, username, password).await;
    login(app, username, password).await
}

pub async fn create_category(app: &Router, token: &str, description: &str) -> i64 {
    let response = request(
        app,
        json_request(
            Method::POST,
            "/categories",
            Some(token),
            &json!({"description": description}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"].as_i64().expect("category id")
}

pub async fn create_expense(app: &Router, token: &str, body: Value) -> Value {
    let response = request(app, json_request(Method::POST, "/expenses", Some(token), &body)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}
