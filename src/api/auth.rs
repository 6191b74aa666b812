//! Account and session endpoints.
//!
//! - POST `/register` - Create an admin account and start a session
//! - POST `/login` - Check email and password and start a session
//! - GET `/me` - Current user and their virtual users (bearer access token)
//! - POST `/refresh` - Exchange the refresh cookie for a new access token
//! - POST `/logout` - Clear the refresh cookie
//!
//! A session is the refresh token cookie. Refresh issues a new access token
//! only; the refresh token itself is reused until it expires, and logout does
//! not invalidate it server-side.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::{ApiError, ResultExt};
use crate::auth::{BearerAuth, REFRESH_COOKIE_NAME, clear_refresh_cookie, get_cookie, refresh_cookie};
use crate::db::{AdminUser, Database, PublicUser, VirtualUserSummary, is_unique_violation};
use crate::impl_has_auth_backend;
use crate::jwt::{JwtConfig, Subject, TokenKind};
use crate::password::{MAX_PASSWORD_BYTES, PasswordHasher};
use crate::rate_limit::{RateLimitConfig, rate_limit_credentials};

/// Length limits count UTF-16 code units, the way browser forms do.
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_USERNAME_LENGTH: usize = 20;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const ACCOUNT_TAKEN: &str = "Email or username is already in use";

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub hasher: PasswordHasher,
    pub secure_cookies: bool,
    pub rate_limit_config: Arc<RateLimitConfig>,
}

impl_has_auth_backend!(AuthState);

impl AuthState {
    /// Issue an access token and a refresh cookie for a user.
    fn start_session(&self, user: &AdminUser) -> Result<(String, String), ApiError> {
        let subject = subject_of(user);
        let access = self
            .jwt
            .issue(&subject, TokenKind::Access)
            .internal_err("Failed to generate token")?;
        let refresh = self
            .jwt
            .issue(&subject, TokenKind::Refresh)
            .internal_err("Failed to generate token")?;

        Ok((
            access.token,
            refresh_cookie(&refresh.token, self.secure_cookies),
        ))
    }
}

pub fn router(state: AuthState) -> Router {
    let credential_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(
            state.rate_limit_config.clone(),
            rate_limit_credentials,
        ));

    let session_routes = Router::new()
        .route("/me", get(me))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .with_state(state);

    Router::new().merge(credential_routes).merge(session_routes)
}

fn subject_of(user: &AdminUser) -> Subject {
    Subject {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RegisterRequest {
    email: String,
    username: String,
    password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    message: &'static str,
    user: PublicUser,
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    message: &'static str,
    access_token: String,
}

#[derive(Serialize)]
struct MeUser {
    id: i64,
    email: String,
    username: String,
    created_at: String,
    updated_at: String,
    virtual_users: Vec<VirtualUserSummary>,
}

#[derive(Serialize)]
struct MeResponse {
    user: MeUser,
}

/// Loose shape check matching `^[^\s@]+@[^\s@]+\.[^\s@]+$`.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // Some dot must have at least one character on each side
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
    if req.email.is_empty() || req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request(
            "Email, username and password are required",
        ));
    }

    if utf16_len(&req.password) < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    if req.password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::bad_request(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }

    if utf16_len(&req.username) > MAX_USERNAME_LENGTH {
        return Err(ApiError::bad_request(format!(
            "Username cannot be longer than {} characters",
            MAX_USERNAME_LENGTH
        )));
    }

    if !is_valid_email(&req.email) {
        return Err(ApiError::bad_request("Please enter a valid email address"));
    }

    Ok(())
}

async fn register(
    State(state): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    validate_registration(&payload)?;

    let existing = state
        .db
        .users()
        .find_by_email_or_username(&payload.email, &payload.username)
        .await
        .db_err("Failed to check existing users")?;

    if existing.is_some() {
        return Err(ApiError::conflict(ACCOUNT_TAKEN));
    }

    let password_hash = state
        .hasher
        .hash(&payload.password)
        .await
        .internal_err("Failed to hash password")?;

    // The pre-check can race with a concurrent signup; the UNIQUE constraints decide.
    let user = match state
        .db
        .users()
        .insert(&payload.email, &payload.username, &password_hash)
        .await
    {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => return Err(ApiError::conflict(ACCOUNT_TAKEN)),
        Err(e) => return Err(ApiError::db_error("Failed to create user", e)),
    };

    let (access_token, cookie) = state.start_session(&user)?;
    info!(user_id = user.id, username = %user.username, "Admin user registered");

    Ok((
        StatusCode::CREATED,
        [(SET_COOKIE, cookie)],
        Json(SessionResponse {
            message: "Registration complete",
            user: PublicUser::from(&user),
            access_token,
        }),
    ))
}

async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;

    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = state
        .db
        .users()
        .find_by_email(&payload.email)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

    let valid = state
        .hasher
        .verify(&payload.password, &user.password_hash)
        .await
        .internal_err("Failed to verify password")?;

    if !valid {
        debug!(user_id = user.id, "Password mismatch");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let (access_token, cookie) = state.start_session(&user)?;
    info!(user_id = user.id, "Admin user logged in");

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(SessionResponse {
            message: "Logged in",
            user: PublicUser::from(&user),
            access_token,
        }),
    ))
}

/// Current user with a summary of their virtual users.
/// The record is read from the store; token claims only supply the ID.
async fn me(
    State(state): State<AuthState>,
    BearerAuth(auth): BearerAuth,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .get_by_id(auth.user_id())
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let virtual_users = state
        .db
        .virtual_users()
        .list_by_admin(user.id)
        .await
        .db_err("Failed to list virtual users")?;

    Ok(Json(MeResponse {
        user: MeUser {
            id: user.id,
            email: user.email,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
            virtual_users,
        },
    }))
}

/// Exchange a valid refresh cookie for a new access token.
/// The refresh token is not rotated.
async fn refresh(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = get_cookie(&headers, REFRESH_COOKIE_NAME)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Refresh token required"))?;

    let claims = state
        .jwt
        .verify(refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            debug!(error = %e, "Rejected refresh token");
            ApiError::unauthorized("Invalid or expired refresh token")
        })?;

    // Claims in the new token come from the current record, not the old token.
    let user = state
        .db
        .users()
        .get_by_id(claims.id)
        .await
        .db_err("Failed to get user")?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    let access = state
        .jwt
        .issue(&subject_of(&user), TokenKind::Access)
        .internal_err("Failed to generate token")?;

    debug!(user_id = user.id, "Access token refreshed");

    Ok(Json(RefreshResponse {
        message: "Token refreshed",
        access_token: access.token,
    }))
}

/// Clear the refresh cookie. Nothing is revoked server-side.
async fn logout(State(state): State<AuthState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(SET_COOKIE, clear_refresh_cookie(state.secure_cookies))],
        Json(serde_json::json!({ "message": "Logged out" })),
    )
}
