use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Could not post comment, try again")]
    CommentCreationFailed {
        #[source]
        source: StoreError,
    },

    #[error("Comment {0} not found")]
    CommentNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::CommentCreationFailed { source } => {
                tracing::error!("Comment creation failed: {:?}", source);
                (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
            }
            AppError::CommentNotFound(_) | AppError::NotFound => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::Store(StoreError::Unavailable(e)) => {
                tracing::error!("Store unavailable: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable".to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
