//! CORS handling for the browser frontend.

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::cli::RunMode;

const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::PUT,
    Method::POST,
    Method::DELETE,
    Method::PATCH,
];

/// How long browsers may cache a preflight result.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

/// Resolved CORS settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    /// Origin allowed to send cookies and `Authorization` cross-origin.
    /// `None` means any origin, without credentials.
    pub credentialed_origin: Option<String>,
}

impl CorsPolicy {
    /// Development allows any origin without credentials. Production allows
    /// credentials, but only for an explicitly configured origin.
    pub fn new(mode: RunMode, origin: Option<&str>) -> Self {
        let credentialed_origin = match (mode, origin) {
            (RunMode::Production, Some(origin)) => Some(origin.to_string()),
            _ => None,
        };
        Self {
            credentialed_origin,
        }
    }

    /// Build the layer that answers preflights and tags responses.
    pub fn layer(&self) -> CorsLayer {
        let layer = CorsLayer::new()
            .allow_methods(ALLOWED_METHODS)
            .allow_headers(AllowHeaders::mirror_request())
            .max_age(PREFLIGHT_MAX_AGE);

        let Some(origin) = self.credentialed_origin.as_deref() else {
            return layer.allow_origin(Any);
        };

        match HeaderValue::from_str(origin) {
            Ok(origin) => layer
                .allow_origin(AllowOrigin::exact(origin))
                .allow_credentials(true),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Unusable CORS origin, allowing any origin");
                layer.allow_origin(Any)
            }
        }
    }
}
