pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod rate_limit;
pub mod seed;

use api::{create_api_router, health, not_found};
use axum::{Router, middleware as axum_middleware, routing::get};
use cli::RunMode;
use db::Database;
use jwt::{Clock, JwtConfig, SystemClock};
use middleware::{CorsPolicy, request_logger, security_headers};
use password::PasswordHasher;
use rate_limit::RateLimitConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// JWT secret for signing tokens
    pub jwt_secret: Vec<u8>,
    /// Deployment mode (cookie security, headers, CORS)
    pub mode: RunMode,
    /// Origin allowed for credentialed CORS requests in production
    pub cors_origin: Option<String>,
    /// Login/registration requests per minute per client IP
    pub auth_rate_limit: u32,
    /// Whether to trust X-Forwarded-For for the client IP
    pub trust_forwarded_for: bool,
    /// Password hashing settings
    pub password_hasher: PasswordHasher,
}

impl ServerConfig {
    /// Whether to set the Secure flag on cookies.
    pub fn secure_cookies(&self) -> bool {
        self.mode == RunMode::Production
    }
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    create_app_with_clock(config, Arc::new(SystemClock))
}

/// Create the application router with token timestamps read from `clock`.
pub fn create_app_with_clock(config: &ServerConfig, clock: Arc<dyn Clock>) -> Router {
    let jwt = Arc::new(JwtConfig::with_clock(&config.jwt_secret, clock));
    let rate_limit_config = Arc::new(RateLimitConfig::new(
        config.auth_rate_limit,
        config.trust_forwarded_for,
    ));
    let cors_policy = CorsPolicy::new(config.mode, config.cors_origin.as_deref());

    let api_router = create_api_router(
        config.db.clone(),
        jwt,
        config.password_hasher,
        config.secure_cookies(),
        rate_limit_config,
    );

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_router)
        .fallback(not_found)
        .layer(cors_policy.layer())
        .layer(axum_middleware::from_fn_with_state(
            config.mode,
            security_headers,
        ))
        .layer(axum_middleware::from_fn(request_logger))
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}
