//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

use crate::chat::{ChatError, ModerationError};
use crate::uploads::UploadError;

// Errors

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ApiError::Internal(e) => {
                // Always log internal errors
                tracing::error!("{:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Something went wrong: {}", e),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<tokio_rusqlite::Error> for ApiError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingFile | UploadError::InvalidFileName(_) => {
                Self::BadRequest(err.to_string())
            }
            UploadError::NotFound(_) => Self::NotFound(err.to_string()),
            UploadError::Io(e) => Self::Internal(e.into()),
            UploadError::Storage(e) => Self::Internal(e),
        }
    }
}

impl From<ModerationError> for ApiError {
    fn from(err: ModerationError) -> Self {
        match err {
            ModerationError::MissingField(_) | ModerationError::InvalidFeedback(_) => {
                Self::BadRequest(err.to_string())
            }
            ModerationError::TurnNotFound(_) => Self::NotFound(err.to_string()),
            ModerationError::Storage(e) => Self::Internal(e),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Upload(e) => e.into(),
            ChatError::Storage(e) => Self::Internal(e),
        }
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod moderation {
    pub use crate::api::routes::moderation::public::*;
}

pub mod uploads {
    pub use crate::api::routes::uploads::public::*;
}
