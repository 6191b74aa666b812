#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response, StatusCode, header},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;
use virtualsns::{
    ServerConfig, cli::RunMode, create_app, create_app_with_clock, db::Database, jwt::Clock,
    password::PasswordHasher,
};

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough";

/// Lowest bcrypt cost, keeps tests fast.
pub const TEST_BCRYPT_COST: u32 = 4;

/// High enough that ordinary tests never trip the credential limiter.
pub const RELAXED_RATE_LIMIT: u32 = 1000;

pub async fn test_db() -> Database {
    Database::open(":memory:")
        .await
        .expect("Failed to open test database")
}

pub fn test_config(db: Database) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: TEST_JWT_SECRET.to_vec(),
        mode: RunMode::Development,
        cors_origin: None,
        auth_rate_limit: RELAXED_RATE_LIMIT,
        trust_forwarded_for: false,
        password_hasher: PasswordHasher::new(TEST_BCRYPT_COST),
    }
}

/// Create a development app and return it with its database.
pub async fn create_test_app() -> (Router, Database) {
    let db = test_db().await;
    let app = create_app(&test_config(db.clone()));
    (app, db)
}

/// Create a development app whose tokens are stamped by `clock`.
pub async fn create_test_app_with_clock(clock: Arc<dyn Clock>) -> (Router, Database) {
    let db = test_db().await;
    let app = create_app_with_clock(&test_config(db.clone()), clock);
    (app, db)
}

fn peer() -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000)))
}

/// POST a JSON body, as if sent from 127.0.0.1.
pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .extension(peer())
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// POST with no body and an optional refresh cookie.
pub fn post_with_cookie(uri: &str, refresh_token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).extension(peer());
    if let Some(token) = refresh_token {
        builder = builder.header(header::COOKIE, format!("refreshToken={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// GET with an optional bearer token.
pub fn get_with_bearer(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).extension(peer());
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// The raw `Set-Cookie` header for the refresh token, if any.
pub fn refresh_set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("refreshToken="))
        .map(str::to_string)
}

/// The refresh token value carried by a `Set-Cookie` header.
pub fn refresh_token_from(response: &Response<Body>) -> Option<String> {
    let cookie = refresh_set_cookie(response)?;
    let value = cookie.strip_prefix("refreshToken=")?;
    Some(value.split(';').next().unwrap_or("").to_string())
}

/// A completed registration or login.
pub struct Session {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

/// Register an admin and return the session it starts.
pub async fn register(app: &Router, email: &str, username: &str, password: &str) -> Session {
    let body = serde_json::json!({
        "email": email,
        "username": username,
        "password": password,
    });
    let response = app
        .clone()
        .oneshot(post_json("/api/auth/register", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let refresh_token = refresh_token_from(&response).expect("No refresh cookie");
    let json = body_json(response).await;
    Session {
        user_id: json["user"]["id"].as_i64().unwrap(),
        access_token: json["accessToken"].as_str().unwrap().to_string(),
        refresh_token,
    }
}
