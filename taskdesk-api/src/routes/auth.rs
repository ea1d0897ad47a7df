/// Authentication and account endpoints
///
/// # Endpoints
///
/// - `POST /token` - Exchange username and password for a bearer token
/// - `POST /users/` - Register a new account
/// - `GET /users/me/` - Profile of the authenticated caller
/// - `GET /users/` - List all accounts (admins only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Pagination, ValidatedForm, ValidatedJson},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskdesk_shared::{
    auth::{
        authorization::require_admin,
        jwt::{create_token, Claims},
        middleware::{authenticate_user, AuthContext},
        password::hash_password_blocking,
    },
    models::user::{CreateUser, Role, User, UserProfile},
};
use tracing::{info, warn};
use validator::Validate;

const DUPLICATE_USERNAME: &str = "Username already registered";

/// Login form, sent as `application/x-www-form-urlencoded`
///
/// Extra OAuth2 password-grant fields (`grant_type`, `scope`, ...) are
/// accepted and ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    /// Always "bearer"
    pub token_type: String,
}

/// Sign-up request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Username must be 1-100 characters"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Issue an access token
///
/// # Endpoint
///
/// ```text
/// POST /token
/// Content-Type: application/x-www-form-urlencoded
///
/// username=alice&password=wonderland
/// ```
///
/// # Response
///
/// ```json
/// { "access_token": "eyJ...", "token_type": "bearer" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown username or wrong password
/// - `422 Unprocessable Entity`: Missing form fields
pub async fn login_for_access_token(
    State(state): State<AppState>,
    ValidatedForm(req): ValidatedForm<TokenRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = authenticate_user(&state.db, &req.username, &req.password)
        .await?
        .ok_or_else(|| {
            warn!(username = %req.username, "Failed login attempt");
            ApiError::Unauthorized("Incorrect username or password".to_string())
        })?;

    let claims = Claims::new(user.username.clone(), state.token_lifetime())?;
    let access_token = create_token(&claims, state.jwt_secret())?;

    info!(user_id = user.id, "Issued access token");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Register a new user
///
/// New accounts always get the `user` role.
///
/// # Endpoint
///
/// ```text
/// POST /users/
/// Content-Type: application/json
///
/// { "username": "alice", "password": "wonderland" }
/// ```
///
/// # Response
///
/// ```json
/// { "id": 1, "username": "alice", "role": "user" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Username already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    if User::find_by_username(&state.db, &req.username).await?.is_some() {
        return Err(ApiError::BadRequest(DUPLICATE_USERNAME.to_string()));
    }

    let password_hash = hash_password_blocking(req.password).await?;

    // The lookup above can race with a concurrent sign-up; the UNIQUE
    // constraint settles it.
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_hash,
            role: Role::User,
        },
    )
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            ApiError::BadRequest(DUPLICATE_USERNAME.to_string())
        }
        _ => ApiError::from(e),
    })?;

    info!(user_id = user.id, username = %user.username, "User registered");

    Ok(Json(user.into()))
}

/// Profile of the authenticated caller
///
/// # Endpoint
///
/// ```text
/// GET /users/me/
/// Authorization: Bearer <token>
/// ```
pub async fn read_users_me(auth: AuthContext) -> Json<UserProfile> {
    Json(UserProfile {
        id: auth.user_id,
        username: auth.username,
        role: auth.role,
    })
}

/// List users
///
/// # Endpoint
///
/// ```text
/// GET /users/?skip=0&limit=100
/// Authorization: Bearer <token>
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not an admin
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
    page: Pagination,
) -> ApiResult<Json<Vec<UserProfile>>> {
    require_admin(&auth)?;

    let users = User::list(&state.db, page.skip, page.limit).await?;

    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_request_validation() {
        let ok = CreateUserRequest {
            username: "alice".to_string(),
            password: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());

        let empty = CreateUserRequest {
            username: String::new(),
            password: String::new(),
        };
        let errors = empty.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);

        let long = CreateUserRequest {
            username: "x".repeat(101),
            password: "pw".to_string(),
        };
        assert!(long.validate().is_err());
    }
}
