// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use crate::auth::{HashingError, SessionError};
use crate::storage::StoreError;
use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sessionauth_common::{ErrorDetail, ErrorResponse};
use thiserror::Error;
use tracing::error;

/// Message shared by every credential failure
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid username or password";

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Unknown user and wrong password are deliberately the same error
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    /// Missing, expired or deleted session
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Password hashing failed: {0}")]
    Hashing(#[from] HashingError),

    #[error("Session token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::NotFound(_) => StatusCode::UNAUTHORIZED,
            AppError::UserAlreadyExists => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "VAL_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::NotFound(_) => "AUTH_002",
            AppError::UserAlreadyExists => "USER_001",
            AppError::Hashing(_) => "CRYPTO_001",
            AppError::TokenGeneration(_) => "CRYPTO_002",
            AppError::Storage(_) => "STORE_001",
            AppError::Config(_) => "CFG_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for clients
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            AppError::NotFound(_) => "Not authenticated".to_string(),
            AppError::UserAlreadyExists => "Username or email already registered".to_string(),
            _ => "Internal error".to_string(),
        }
    }

    /// Failures that should page someone rather than be shrugged off
    pub fn is_alert(&self) -> bool {
        matches!(
            self,
            AppError::Hashing(_)
                | AppError::TokenGeneration(_)
                | AppError::Storage(_)
                | AppError::Internal(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(code = self.error_code(), error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.sanitized_message(),
            },
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound | SessionError::Expired => {
                AppError::NotFound("session".to_string())
            },
            SessionError::TokenGeneration(msg) => AppError::TokenGeneration(msg),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => AppError::UserAlreadyExists,
            StoreError::NotFound => AppError::InvalidCredentials,
            StoreError::Backend(msg) => AppError::Storage(msg),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_app_error_display() {
        assert_eq!(
            AppError::InvalidCredentials.to_string(),
            "Invalid username or password"
        );
        assert_eq!(
            AppError::InvalidInput("Email must not be empty".to_string()).to_string(),
            "Invalid input: Email must not be empty"
        );
        assert_eq!(AppError::UserAlreadyExists.to_string(), "User already exists");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::InvalidInput("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::NotFound("session".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::UserAlreadyExists.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Storage("down".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::TokenGeneration("rng".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_app_error_error_codes() {
        assert_eq!(AppError::InvalidCredentials.error_code(), "AUTH_001");
        assert_eq!(AppError::NotFound("session".to_string()).error_code(), "AUTH_002");
        assert_eq!(AppError::InvalidInput("x".to_string()).error_code(), "VAL_001");
        assert_eq!(AppError::Internal("x".to_string()).error_code(), "INT_001");
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let err = AppError::Storage("disk I/O error at /var/lib/users.db".to_string());
        assert_eq!(err.sanitized_message(), "Internal error");
        assert!(err.is_alert());

        let err = AppError::InvalidInput("Invalid email: Invalid email format".to_string());
        assert_eq!(err.sanitized_message(), "Invalid email: Invalid email format");
        assert!(!err.is_alert());
    }

    #[test]
    fn test_error_from_impls() {
        assert!(matches!(
            AppError::from(SessionError::Expired),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(SessionError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(SessionError::TokenGeneration("rng".to_string())),
            AppError::TokenGeneration(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::Duplicate("username".to_string())),
            AppError::UserAlreadyExists
        ));
        assert!(matches!(
            AppError::from(StoreError::Backend("down".to_string())),
            AppError::Storage(_)
        ));
        assert!(matches!(
            AppError::from(ValidationError::InvalidPassword("empty".to_string())),
            AppError::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn test_error_serialization() {
        let response = AppError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("application/json"));

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "AUTH_001");
        assert_eq!(json["error"]["message"], "Invalid username or password");
    }
}
