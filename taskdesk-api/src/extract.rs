/// Request extractors that reject with [`ApiError`]
///
/// Axum's own `Json`, `Form` and `Query` rejections answer in plain
/// text. These wrappers keep every failure in the JSON error format and
/// run `validator` rules before the handler sees the payload.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
    Form, Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::Validate;

use crate::error::ApiError;

/// Default page size for list endpoints
pub const DEFAULT_LIMIT: i64 = 100;

/// JSON body that has passed its validation rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// URL-encoded form body that has passed its validation rules
#[derive(Debug, Clone)]
pub struct ValidatedForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

#[derive(Debug, Deserialize)]
struct PaginationQuery {
    skip: Option<i64>,
    limit: Option<i64>,
}

/// `?skip=&limit=` query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PaginationQuery>::from_request_parts(parts, state).await?;

        let pagination = Pagination {
            skip: query.skip.unwrap_or(0),
            limit: query.limit.unwrap_or(DEFAULT_LIMIT),
        };

        if pagination.skip < 0 || pagination.limit < 0 {
            return Err(ApiError::BadRequest(
                "skip and limit must not be negative".to_string(),
            ));
        }

        Ok(pagination)
    }
}
