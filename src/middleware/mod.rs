//! Cross-cutting HTTP middleware: request logging, security headers and CORS.

mod cors;
mod request_id;
mod security_headers;

pub use cors::CorsPolicy;
pub use request_id::{REQUEST_ID, REQUEST_ID_HEADER, current_request_id, request_logger};
pub use security_headers::security_headers;
