//! Shared plumbing for the HTTP handlers: the error type, request
//! extractors, and the per-request store session.

use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use barbuddy_cocktails::CocktailError;
use barbuddy_db::{run_in_transaction, SessionError};
use barbuddy_types::SchemaError;
use barbuddy_users::UserError;
use rusqlite::Transaction;
use serde_json::{json, Value};
use thiserror::Error;

/// API error type mapping to HTTP status codes.
///
/// Every variant is rendered as `{"message": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Request must accept application/json responses")]
    NotAcceptable,
    #[error("Request must contain application/json data")]
    UnsupportedMediaType,
    #[error("{0}")]
    Unprocessable(String),
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::NotAcceptable => StatusCode::NOT_ACCEPTABLE,
            ApiError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<SchemaError> for ApiError {
    fn from(e: SchemaError) -> Self {
        match e {
            SchemaError::Invalid(message) => ApiError::Unprocessable(message),
            SchemaError::InvalidDefinition(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<CocktailError> for ApiError {
    fn from(e: CocktailError) -> Self {
        match e {
            CocktailError::NotFound(id) => {
                ApiError::NotFound(format!("Could not find cocktail with id {id}"))
            }
            CocktailError::Database(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::DuplicateUsername(_) | UserError::DuplicateEmail(_) => {
                ApiError::BadRequest(e.to_string())
            }
            UserError::NotFound(id) => {
                ApiError::NotFound(format!("Could not find user with id {id}"))
            }
            UserError::Database(_) | UserError::PasswordHash(_) => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

/// Runs `work` in one transaction on the blocking pool.
///
/// Commits when `work` succeeds; otherwise the transaction is rolled back
/// and the error is returned as-is.
pub(crate) async fn with_session<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let pool = state.pool.clone();
    tokio::task::spawn_blocking(move || run_in_transaction(&pool, work))
        .await
        .map_err(|e| ApiError::Internal(format!("task join error: {e}")))?
}

/// A JSON request body whose parse failures are reported as `ApiError`.
#[derive(Debug)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<Value>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(JsonRejection::MissingJsonContentType(_)) => Err(ApiError::UnsupportedMediaType),
            Err(JsonRejection::JsonSyntaxError(rejection)) => {
                Err(ApiError::BadRequest(rejection.body_text()))
            }
            Err(rejection) => Err(ApiError::Rejected {
                status: rejection.status(),
                message: rejection.body_text(),
            }),
        }
    }
}

/// A strictly non-negative integer `{id}` path segment.
///
/// Anything else (`abc`, `-1`, `+1`, a value beyond `i64`) is treated as a
/// route that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceId(pub i64);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::NotFound(rejection.body_text()))?;
        parse_resource_id(&raw).map(ResourceId).ok_or_else(|| {
            tracing::debug!(segment = %raw, "rejecting malformed id segment");
            ApiError::NotFound(format!("Could not find resource with id {raw}"))
        })
    }
}

fn parse_resource_id(raw: &str) -> Option<i64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}
