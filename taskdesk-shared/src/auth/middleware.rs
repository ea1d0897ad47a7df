/// Request authentication for Axum
///
/// Bearer tokens arrive in `Authorization: Bearer <token>`. After the
/// token is validated the user it names is loaded from the database, so
/// role changes and deleted accounts take effect on the next request.
/// The result is an [`AuthContext`] stored in the request extensions,
/// which handlers receive directly as an extractor.
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::auth::middleware::AuthContext;
///
/// async fn protected_handler(auth: AuthContext) -> String {
///     format!("Hello, {}!", auth.username)
/// }
/// ```

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use sqlx::AnyPool;
use tracing::debug;

use super::jwt::{validate_token, JwtError};
use super::password::{verify_password_blocking, PasswordError};
use crate::models::user::{Role, User};

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Error type for authentication
#[derive(Debug)]
pub enum AuthError {
    /// No usable `Authorization` header
    MissingCredentials,

    /// Token failed validation
    InvalidToken(String),

    /// Token was valid but names a user that no longer exists
    UnknownUser,

    /// Database error
    DatabaseError(String),

    /// Password hashing or verification failed
    Internal(String),
}

impl From<PasswordError> for AuthError {
    fn from(err: PasswordError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, "Not authenticated".to_string()),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::UnknownUser => (
                StatusCode::UNAUTHORIZED,
                "Could not validate credentials".to_string(),
            ),
            AuthError::DatabaseError(_) | AuthError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], message).into_response()
        } else {
            (status, message).into_response()
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid token issuer".to_string()),
            _ => AuthError::InvalidToken("Could not validate credentials".to_string()),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::MissingCredentials)?;

    if !scheme.eq_ignore_ascii_case("bearer") || token.trim().is_empty() {
        return Err(AuthError::MissingCredentials);
    }

    Ok(token.trim())
}

/// Validates a bearer token and loads the user it names
pub async fn resolve_token(
    pool: &AnyPool,
    secret: &str,
    token: &str,
) -> Result<AuthContext, AuthError> {
    let claims = validate_token(token, secret)?;

    let user = User::find_by_username(pool, &claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    debug!(user_id = user.id, role = %user.role, "Authenticated request");
    Ok(AuthContext::from_user(&user))
}

/// Checks a username/password pair
///
/// Returns the user on success and `None` for an unknown username or a
/// wrong password; the two cases are indistinguishable to the caller.
pub async fn authenticate_user(
    pool: &AnyPool,
    username: &str,
    password: &str,
) -> Result<Option<User>, AuthError> {
    let Some(user) = User::find_by_username(pool, username)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
    else {
        return Ok(None);
    };

    let valid = verify_password_blocking(password.to_string(), user.password_hash.clone())
        .await
        .map_err(AuthError::from)?;

    Ok(valid.then_some(user))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}
