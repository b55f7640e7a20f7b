use std::net::SocketAddr;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::db::models::ValidationError;
use crate::db::StoreError;
use crate::routes::ErrorResponse;

/// Errors a handler can return. Every variant renders as `{ "detail": ... }`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad input, or a write the store refused. 400.
    #[error("{0}")]
    ValidationFailed(String),
    /// No store connection was established at startup. 500.
    #[error("Database not available")]
    StorageUnavailable,
    /// Stored data or a read failed. 500.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::StorageUnavailable | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Reads are not caught: any store failure is a server error.
    pub fn from_read(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => AppError::StorageUnavailable,
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::ValidationFailed(err.to_string())
    }
}

/// Writes surface the store's message to the caller as a client error.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => AppError::StorageUnavailable,
            other => AppError::ValidationFailed(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationFailed(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationFailed(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        if status.is_server_error() {
            tracing::error!(error = %detail, "request failed");
        } else {
            tracing::debug!(error = %detail, "request rejected");
        }
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    CollectionMapping(#[from] ValidationError),
    #[error("failed to initialise logging: {0}")]
    Logging(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
