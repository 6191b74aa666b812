//! Bearer-token authentication for API routes.
//!
//! Access tokens (15 min) travel in the `Authorization` header; refresh tokens
//! (7 days) live in an HTTP-only cookie and are only read by the refresh
//! endpoint.

mod cookie;
mod errors;
mod extractors;
mod ip;
mod state;
mod types;

pub use cookie::{REFRESH_COOKIE_NAME, clear_refresh_cookie, get_cookie, refresh_cookie};
pub use errors::{ApiAuthError, AuthErrorKind};
pub use extractors::{BearerAuth, bearer_token};
pub use ip::extract_client_ip;
pub use state::HasAuthBackend;
pub use types::AuthenticatedUser;
