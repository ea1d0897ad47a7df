/// Bearer token generation and validation
///
/// Tokens are HS256-signed JWTs. The subject is the username, so a token
/// stops working as soon as its user no longer exists.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: configurable, 30 minutes by default
/// - **Validation**: signature, expiration, not-before and issuer checks
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::jwt::{create_token, validate_token, Claims};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "your-secret-key-at-least-32-bytes-long";
/// let claims = Claims::new("alice", Duration::minutes(30))?;
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer written into and required of every token
pub const ISSUER: &str = "taskdesk";

/// Default lifetime of an access token in minutes
pub const DEFAULT_EXPIRE_MINUTES: i64 = 30;

/// Longest accepted token lifetime in minutes (one year)
pub const MAX_EXPIRE_MINUTES: i64 = 525_600;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// JWT claims
///
/// - `sub`: username
/// - `iss`: always "taskdesk"
/// - `iat`, `nbf`, `exp`: Unix timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for `username` that expire after `expires_in`
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if the expiry falls outside the
    /// representable date range
    pub fn new(username: impl Into<String>, expires_in: Duration) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(expires_in)
            .ok_or_else(|| JwtError::CreateError("Token lifetime out of range".to_string()))?;

        Ok(Self {
            sub: username.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: now.timestamp(),
        })
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Gets time until expiration
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now().timestamp();
        if self.exp > now {
            Some(Duration::seconds(self.exp - now))
        } else {
            None
        }
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, expiry, not-before time and issuer.
///
/// # Errors
///
/// - `JwtError::Expired` if the token is past `exp`
/// - `JwtError::InvalidIssuer` if `iss` is not "taskdesk"
/// - `JwtError::ValidationError` for bad signatures or malformed tokens
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("alice", Duration::minutes(DEFAULT_EXPIRE_MINUTES)).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, DEFAULT_EXPIRE_MINUTES * 60);
        assert!(!claims.is_expired());

        let left = claims.time_until_expiration().unwrap();
        assert!(left.num_seconds() > 1700);
        assert!(left.num_seconds() <= 1800);
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = Claims::new("alice", Duration::minutes(30)).unwrap();
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated, claims);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = Claims::new("alice", Duration::minutes(30)).unwrap();
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, "a-different-secret-that-is-also-long");
        assert!(matches!(result, Err(JwtError::ValidationError(_))));
    }

    #[test]
    fn test_validate_expired_token() {
        let claims = Claims::new("alice", Duration::seconds(-3600)).unwrap();
        assert!(claims.is_expired());
        assert!(claims.time_until_expiration().is_none());

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_validate_foreign_issuer() {
        let mut claims = Claims::new("alice", Duration::minutes(30)).unwrap();
        claims.iss = "someone-else".to_string();

        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::InvalidIssuer)));
    }

    #[test]
    fn test_claims_reject_unrepresentable_expiry() {
        let result = Claims::new("alice", Duration::days(365 * 1_000_000));
        assert!(matches!(result, Err(JwtError::CreateError(_))));

        assert!(Claims::new("alice", Duration::minutes(MAX_EXPIRE_MINUTES)).is_ok());
    }

    #[test]
    fn test_validate_garbage() {
        assert!(validate_token("not.a.token", SECRET).is_err());
        assert!(validate_token("", SECRET).is_err());
    }
}
