use crate::repositories::RepositoryError;
use crate::services::{
    AvatarError, CommentServiceError, FavoriteServiceError, PasswordResetError, UserServiceError,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error surfaced to HTTP clients as `{"detail": "<message>"}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    DeliveryFailure(String),

    #[error("Service temporarily unavailable")]
    Transient,

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Conflict(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::DeliveryFailure(_) | AppError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Transient => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound("Record not found".to_string()),
            RepositoryError::AlreadyExists => {
                AppError::Conflict("Record already exists".to_string())
            }
            RepositoryError::MissingReference => AppError::NotFound("User not found".to_string()),
            RepositoryError::Unavailable(e) => {
                tracing::warn!("Store unavailable: {}", e);
                AppError::Transient
            }
            RepositoryError::Database(e) => {
                tracing::error!("Database error: {}", e);
                AppError::Internal
            }
        }
    }
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::EmailTaken => AppError::Conflict(err.to_string()),
            UserServiceError::InvalidEmail
            | UserServiceError::InvalidName
            | UserServiceError::EmptyPassword
            | UserServiceError::EmptyUpdate => AppError::InvalidInput(err.to_string()),
            UserServiceError::UserNotFound => AppError::NotFound(err.to_string()),
            UserServiceError::InvalidCredentials | UserServiceError::InvalidOldPassword => {
                AppError::Unauthorized(err.to_string())
            }
            UserServiceError::HashingError(e) => {
                tracing::error!("Password hashing failed: {}", e);
                AppError::Internal
            }
            UserServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<PasswordResetError> for AppError {
    fn from(err: PasswordResetError) -> Self {
        match err {
            PasswordResetError::UserNotFound | PasswordResetError::RequestNotFound => {
                AppError::NotFound(err.to_string())
            }
            PasswordResetError::Expired
            | PasswordResetError::InvalidCode
            | PasswordResetError::InvalidToken
            | PasswordResetError::TokenRequired => AppError::InvalidInput(err.to_string()),
            PasswordResetError::Delivery(e) => {
                AppError::DeliveryFailure(format!("Email sending error: {}", e))
            }
            PasswordResetError::UserService(e) => e.into(),
            PasswordResetError::Repository(e) => e.into(),
        }
    }
}

impl From<AvatarError> for AppError {
    fn from(err: AvatarError) -> Self {
        match err {
            AvatarError::UserNotFound => AppError::NotFound(err.to_string()),
            AvatarError::EmptyFile | AvatarError::TooLarge(_) | AvatarError::UnsupportedType(_) => {
                AppError::InvalidInput(err.to_string())
            }
            AvatarError::Io(e) => {
                tracing::error!("Avatar write failed: {}", e);
                AppError::Internal
            }
            AvatarError::Repository(e) => e.into(),
        }
    }
}

impl From<FavoriteServiceError> for AppError {
    fn from(err: FavoriteServiceError) -> Self {
        match err {
            FavoriteServiceError::AlreadyExists => AppError::Conflict(err.to_string()),
            FavoriteServiceError::NotFound | FavoriteServiceError::UserNotFound => {
                AppError::NotFound(err.to_string())
            }
            FavoriteServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<CommentServiceError> for AppError {
    fn from(err: CommentServiceError) -> Self {
        match err {
            CommentServiceError::EmptyComment => AppError::InvalidInput(err.to_string()),
            CommentServiceError::NotFound | CommentServiceError::UserNotFound => {
                AppError::NotFound(err.to_string())
            }
            CommentServiceError::RepositoryError(e) => e.into(),
        }
    }
}
