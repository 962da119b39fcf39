use std::io;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::common::ErrorResponse;

/// Error type for person store operations.
#[derive(Error, Debug)]
pub enum PersonError {
    /// IO error from file operations or the listener.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error.
    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Error reported by the SQLite store.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Error reported by the sled store.
    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Error with a plain message, used for configuration and lock failures.
    #[error("{0}")]
    StringError(String),
}

/// Result type alias for person store operations.
pub type Result<T> = std::result::Result<T, PersonError>;

/// Error returned by the HTTP handlers.
///
/// Every variant renders as a JSON `{"error": ...}` body with a matching status code.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The `:id` path segment is not an integer.
    #[error("invalid person id: {0}")]
    InvalidId(String),

    /// The request body could not be decoded into a person.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// No person exists with the given id.
    #[error("person {0} not found")]
    NotFound(i64),

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(#[from] PersonError),

    /// The blocking task running a store call did not complete.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
