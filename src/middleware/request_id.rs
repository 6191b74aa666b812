//! Request ID assignment and request/response logging.

use std::time::Instant;

use axum::{
    extract::Request,
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::info;

/// Header carrying the request ID in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound request ID that is honored as-is.
const MAX_INBOUND_ID_LEN: usize = 128;

tokio::task_local! {
    /// Request ID of the request being handled on this task.
    /// Read by error responses so the ID ends up in the JSON body.
    pub static REQUEST_ID: String;
}

/// Request ID of the current request, if any.
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

fn inbound_request_id(request: &Request) -> Option<String> {
    let value = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    let value = value.trim();
    (!value.is_empty() && value.len() <= MAX_INBOUND_ID_LEN).then(|| value.to_string())
}

/// Middleware that tags each request with an ID and logs entry and exit.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let request_id =
        inbound_request_id(&request).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    info!(request_id = %request_id, method = %method, path = %path, "Request started");

    let mut response = REQUEST_ID.scope(request_id.clone(), next.run(request)).await;

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Request finished"
    );

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
