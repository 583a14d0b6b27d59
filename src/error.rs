use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ErrorResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Image is required")]
    MissingImage,

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingImage | AppError::Validation(_) | AppError::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UploadFailed(_)
            | AppError::Storage(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the caller. Server-side failures never carry their detail.
    pub fn public_message(&self) -> String {
        match self {
            AppError::MissingImage => "Image is required".to_string(),
            AppError::Validation(msg) | AppError::InvalidInput(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::PayloadTooLarge => "Request body too large".to_string(),
            AppError::UploadFailed(_) | AppError::Storage(_) => {
                "Failed to upload image".to_string()
            }
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
