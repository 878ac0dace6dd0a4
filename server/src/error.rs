//! Translation of store failures into HTTP responses.
//!
//! The store itself is transport-agnostic; this is the only place that
//! knows which status code each failure kind maps to.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use palaver_store::StoreError;
use serde::Serialize;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure produced by a route handler.
#[derive(Debug)]
pub enum ApiError {
    /// The request was malformed before any store operation ran
    /// (missing multipart field, unparseable identifier).
    BadRequest(String),
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Store(err) => (status_for(&err), err.to_string()),
        };
        (status, Json(ErrorBody { error: detail })).into_response()
    }
}

fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        StoreError::Auth(_) => StatusCode::UNAUTHORIZED,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::Io(_) | StoreError::Corrupt { .. } => {
            error!(%err, "store backing file failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
