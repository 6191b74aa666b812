//! Security response headers.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};

use crate::cli::RunMode;

const DEVELOPMENT_CSP: &str = "default-src 'self'; \
     script-src 'self' 'unsafe-eval' 'unsafe-inline'; \
     style-src 'self' 'unsafe-inline'; \
     connect-src 'self' ws://localhost:3000; \
     img-src 'self' data: blob:";

const PRODUCTION_CSP: &str = "default-src 'self'; \
     script-src 'self'; \
     style-src 'self' https://fonts.googleapis.com; \
     connect-src 'self'; \
     img-src 'self'; \
     upgrade-insecure-requests";

const HSTS: &str = "max-age=31536000; includeSubDomains; preload";

/// Middleware that adds security headers to every response.
/// Production is stricter: HSTS on, framing denied, no inline scripts.
pub async fn security_headers(
    State(mode): State<RunMode>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    let (csp, frame_options) = match mode {
        RunMode::Development => (DEVELOPMENT_CSP, "SAMEORIGIN"),
        RunMode::Production => (PRODUCTION_CSP, "DENY"),
    };

    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(csp),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static(frame_options),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

    if mode == RunMode::Production {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS),
        );
    }

    response
}
