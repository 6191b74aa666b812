//! Authentication error types.

use axum::response::{IntoResponse, Response};

use crate::api::ApiError;

/// Why a request could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// No bearer credential was presented
    NotAuthenticated,
    /// A credential was presented but failed verification
    InvalidToken,
}

/// Rejection for authenticated API routes. Always a 401.
///
/// Verification failures are not broken down any further here; the specific
/// reason is only logged where the token is checked.
#[derive(Debug)]
pub struct ApiAuthError {
    pub(super) kind: AuthErrorKind,
}

impl ApiAuthError {
    pub(super) fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }

    fn message(&self) -> &'static str {
        match self.kind {
            AuthErrorKind::NotAuthenticated => "Authentication required",
            AuthErrorKind::InvalidToken => "Invalid or expired token",
        }
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        ApiError::unauthorized(self.message()).into_response()
    }
}
