use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{config::ConfigError, database::StorageError};

/// Errors surfaced to HTTP callers. `Display` is the exact text placed in the
/// `{"error": ...}` body, so variants must never format their inner cause.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Input too long")]
    InputTooLong,

    #[error("No data provided")]
    MalformedPayload,

    #[error("Database error occurred")]
    Storage(#[from] StorageError),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFields
            | AppError::InvalidEmail
            | AppError::InputTooLong
            | AppError::MalformedPayload => StatusCode::BAD_REQUEST,
            AppError::Storage { .. } | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Anything that stops the process from coming up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database initialization failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}
