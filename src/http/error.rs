//! API error types with IntoResponse
//!
//! Errors are converted to JSON bodies of the form `{"detail": ...}` with
//! the appropriate status code. Empty results are a fixed localized 404;
//! every database failure is a 500 carrying the underlying message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::repos::DbError;
use crate::models::ValidationError;

/// Body text for every empty-result response.
const NOT_FOUND_DETAIL: &str = "Pas de résultat trouvé";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Request input rejected before any SQL ran (400)
    Validation(ValidationError),

    /// Query yielded no rows or a null aggregate (404)
    NotFound,

    /// Database failure: connection, execution, or row decoding (500)
    Database(sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_DETAIL.to_string()),
            Self::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = Json(json!({ "detail": detail }));
        (status, body).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound => Self::NotFound,
            DbError::Sqlx(e) => Self::Database(e),
        }
    }
}
