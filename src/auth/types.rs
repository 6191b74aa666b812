//! Authentication user types.

use crate::jwt::Claims;

/// Caller identity taken from a verified access token.
///
/// The email and username are copies from issuance time; look the user up
/// by `claims.id` when current data is needed.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: Claims,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> i64 {
        self.claims.id
    }
}
