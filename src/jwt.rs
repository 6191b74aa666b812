//! JWT token issuance and verification.
//!
//! Two token kinds share one claim layout and one signing key. The kind is
//! embedded in the payload and checked on every verification, so an access
//! token is never accepted where a refresh token is expected, or the reverse.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Access token duration: 15 minutes
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 15 * 60;

/// Refresh token duration: 7 days
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Token kind for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived bearer credential for API calls
    Access,
    /// Long-lived credential, only used to mint new access tokens
    Refresh,
}

impl TokenKind {
    /// Time-to-live for tokens of this kind, in seconds.
    pub fn duration(self) -> u64 {
        match self {
            TokenKind::Access => ACCESS_TOKEN_DURATION_SECS,
            TokenKind::Refresh => REFRESH_TOKEN_DURATION_SECS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// Identity a token is issued for. Copied into the claims at issuance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    pub email: String,
    pub username: String,
}

/// JWT claims shared by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Admin user ID
    pub id: i64,
    pub email: String,
    pub username: String,
    /// Token kind
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// JWT ID, unique per issued token
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    pub fn subject(&self) -> Subject {
        Subject {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }
}

/// Source of the current time for issuance and expiry checks.
pub trait Clock: Send + Sync {
    /// Current Unix time in seconds.
    fn now(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Clock that only moves when told to. Used by tests to step past expiry.
#[derive(Debug)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Start at the current wall-clock time.
    pub fn starting_now() -> Self {
        Self::new(SystemClock.now())
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Result of issuing a token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The JWT token string
    pub token: String,
    /// Issued at timestamp (Unix seconds)
    pub issued_at: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
    /// Token duration in seconds
    pub duration: u64,
}

/// Signing configuration and token operations.
///
/// Built once at startup from the secret and never mutated afterwards.
/// Cheap to share behind an `Arc`; all operations take `&self`.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    pub fn new(secret: &[u8]) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Create a JWT configuration that reads time from `clock`.
    pub fn with_clock(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            clock,
        }
    }

    /// Issue a signed token of the given kind for a subject.
    pub fn issue(&self, subject: &Subject, kind: TokenKind) -> Result<IssuedToken, JwtError> {
        let now = self.clock.now();
        let duration = kind.duration();
        let exp = now + duration;

        let claims = Claims {
            id: subject.id,
            email: subject.email.clone(),
            username: subject.username.clone(),
            kind,
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp,
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: exp,
            duration,
        })
    }

    /// Verify a token and return its claims.
    ///
    /// Checks run in order: signature and structure, expiry, kind. The first
    /// failure wins and is reported as [`JwtError::InvalidToken`].
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        // Expiry is checked against our own clock below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(InvalidReason::Malformed(e)))?
            .claims;

        if self.clock.now() >= claims.exp {
            return Err(JwtError::InvalidToken(InvalidReason::Expired));
        }

        if claims.kind != expected {
            return Err(JwtError::InvalidToken(InvalidReason::WrongKind {
                expected,
                found: claims.kind,
            }));
        }

        Ok(claims)
    }
}

/// Why a token was rejected. Only for logs, never sent to clients.
#[derive(Debug)]
pub enum InvalidReason {
    /// Bad structure or signature
    Malformed(jsonwebtoken::errors::Error),
    Expired,
    WrongKind {
        expected: TokenKind,
        found: TokenKind,
    },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Malformed(e) => write!(f, "malformed or mis-signed: {}", e),
            InvalidReason::Expired => write!(f, "expired"),
            InvalidReason::WrongKind { expected, found } => write!(
                f,
                "wrong token type: expected {}, found {}",
                expected.as_str(),
                found.as_str()
            ),
        }
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Token failed verification
    InvalidToken(InvalidReason),
}

impl fmt::Display for JwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::InvalidToken(reason) => write!(f, "Invalid token ({})", reason),
        }
    }
}

impl std::error::Error for JwtError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Subject {
        Subject {
            id: 42,
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
        }
    }

    fn is_invalid(result: Result<Claims, JwtError>) -> bool {
        matches!(result, Err(JwtError::InvalidToken(_)))
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let result = config.issue(&alice(), TokenKind::Access).unwrap();
        assert_eq!(result.duration, ACCESS_TOKEN_DURATION_SECS);
        assert_eq!(result.expires_at, result.issued_at + ACCESS_TOKEN_DURATION_SECS);

        let claims = config.verify(&result.token, TokenKind::Access).unwrap();
        assert_eq!(claims.subject(), alice());
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.iat, result.issued_at);
        assert_eq!(claims.exp, result.expires_at);
    }

    #[test]
    fn test_issue_and_verify_refresh_token() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let result = config.issue(&alice(), TokenKind::Refresh).unwrap();
        assert_eq!(result.duration, REFRESH_TOKEN_DURATION_SECS);

        let claims = config.verify(&result.token, TokenKind::Refresh).unwrap();
        assert_eq!(claims.subject(), alice());
        assert_eq!(claims.kind, TokenKind::Refresh);
    }

    #[test]
    fn test_wrong_token_kind_rejected() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        let access = config.issue(&alice(), TokenKind::Access).unwrap();
        let refresh = config.issue(&alice(), TokenKind::Refresh).unwrap();

        assert!(is_invalid(config.verify(&access.token, TokenKind::Refresh)));
        assert!(is_invalid(config.verify(&refresh.token, TokenKind::Access)));
    }

    #[test]
    fn test_garbage_token() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");

        assert!(is_invalid(config.verify("invalid-token", TokenKind::Access)));
        assert!(is_invalid(config.verify("", TokenKind::Refresh)));
        assert!(is_invalid(config.verify("a.b.c", TokenKind::Access)));
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let config = JwtConfig::new(b"test-secret-key-for-testing");
        let issued = config.issue(&alice(), TokenKind::Access).unwrap();

        // Keep header and payload, drop the signature
        let (unsigned, _) = issued.token.rsplit_once('.').unwrap();
        let stripped = format!("{}.", unsigned);
        assert!(is_invalid(config.verify(&stripped, TokenKind::Access)));
    }

    #[test]
    fn test_wrong_secret() {
        let config1 = JwtConfig::new(b"secret-1");
        let config2 = JwtConfig::new(b"secret-2");

        let result = config1.issue(&alice(), TokenKind::Access).unwrap();
        assert!(is_invalid(config2.verify(&result.token, TokenKind::Access)));
    }

    #[test]
    fn test_access_token_expires_after_fifteen_minutes() {
        let clock = Arc::new(ManualClock::starting_now());
        let config = JwtConfig::with_clock(b"test-secret", clock.clone());

        let result = config.issue(&alice(), TokenKind::Access).unwrap();
        let claims = config.verify(&result.token, TokenKind::Access).unwrap();
        assert_eq!(claims.id, 42);

        clock.advance(16 * 60);
        assert!(matches!(
            config.verify(&result.token, TokenKind::Access),
            Err(JwtError::InvalidToken(InvalidReason::Expired))
        ));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let config = JwtConfig::with_clock(b"test-secret", clock.clone());

        let result = config.issue(&alice(), TokenKind::Access).unwrap();

        clock.advance(ACCESS_TOKEN_DURATION_SECS - 1);
        assert!(config.verify(&result.token, TokenKind::Access).is_ok());

        clock.advance(1);
        assert!(is_invalid(config.verify(&result.token, TokenKind::Access)));
    }

    #[test]
    fn test_expired_token_rejected_even_with_matching_kind() {
        let clock = Arc::new(ManualClock::starting_now());
        let config = JwtConfig::with_clock(b"test-secret", clock.clone());

        let refresh = config.issue(&alice(), TokenKind::Refresh).unwrap();
        clock.advance(REFRESH_TOKEN_DURATION_SECS + 1);

        assert!(matches!(
            config.verify(&refresh.token, TokenKind::Refresh),
            Err(JwtError::InvalidToken(InvalidReason::Expired))
        ));
    }

    #[test]
    fn test_expired_token_from_foreign_encoder() {
        let secret = b"test-secret";
        let now = SystemClock.now();

        let claims = Claims {
            id: 1,
            email: "bob@example.com".to_string(),
            username: "bob".to_string(),
            kind: TokenKind::Access,
            jti: "jti".to_string(),
            iat: now - 100,
            exp: now - 50,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();

        let config = JwtConfig::new(secret);
        assert!(is_invalid(config.verify(&token, TokenKind::Access)));
    }

    #[test]
    fn test_unique_tokens_within_same_second() {
        let clock = Arc::new(ManualClock::new(1_700_000_000));
        let config = JwtConfig::with_clock(b"test-secret", clock);

        let first = config.issue(&alice(), TokenKind::Access).unwrap();
        let second = config.issue(&alice(), TokenKind::Access).unwrap();

        assert_eq!(first.issued_at, second.issued_at);
        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_error_display_names_reason() {
        let err = JwtError::InvalidToken(InvalidReason::WrongKind {
            expected: TokenKind::Access,
            found: TokenKind::Refresh,
        });
        assert_eq!(
            err.to_string(),
            "Invalid token (wrong token type: expected access, found refresh)"
        );
    }
}
