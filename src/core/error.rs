// Centralized error handling for the service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

/// Rejected input. Surfaced to the caller, never retried.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0} is not a valid email address.")]
    InvalidEmail(String),

    #[error("The password must be of minimum length {min} characters, got {actual}.")]
    PasswordTooShort { min: usize, actual: usize },

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Parameter out of range: {0}")]
    OutOfRange(String),
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to hash password: {0}")]
    Hash(String),

    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),
}

/// Persistence failures. Callers may retry, the core does not.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Failed to write to WAL: {0}")]
    Wal(String),
}

/// Errors returned by user directory operations
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    // Same message for unknown email and wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for DirectoryError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateEmail(email) => {
                DirectoryError::Validation(ValidationError::DuplicateEmail(email))
            }
            other => DirectoryError::Storage(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Page not found: {0}")]
    NotFound(String),

    #[error("Page id already in use: {0}")]
    IdTaken(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Error type for the HTTP handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            ApiError::Directory(err) => match err {
                DirectoryError::Validation(ValidationError::DuplicateEmail(_)) => StatusCode::CONFLICT,
                DirectoryError::Validation(_) => StatusCode::BAD_REQUEST,
                DirectoryError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                DirectoryError::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
                DirectoryError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Page(PageError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Page(PageError::IdTaken(_)) => StatusCode::CONFLICT,
            ApiError::Page(PageError::Storage(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use crate::models::api::ErrorResponse;

        let status = self.status();

        // Internal details stay in the logs
        let error = match &self {
            ApiError::Directory(DirectoryError::Credential(_)) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error,
            }),
        )
            .into_response()
    }
}

#[derive(Error, Debug)]
pub enum MonitoringError {
    #[error("Invalid API key")]
    InvalidApiKey,
}

impl IntoResponse for MonitoringError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MonitoringError::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Unauthorized"),
        };

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_email_maps_to_validation() {
        let err: DirectoryError = StorageError::DuplicateEmail("a@b.io".to_string()).into();
        assert!(matches!(
            err,
            DirectoryError::Validation(ValidationError::DuplicateEmail(_))
        ));
    }

    #[test]
    fn test_wal_failure_stays_storage() {
        let err: DirectoryError = StorageError::Wal("disk full".to_string()).into();
        assert!(matches!(err, DirectoryError::Storage(StorageError::Wal(_))));
    }

    #[test]
    fn test_api_error_status_codes() {
        let cases = vec![
            (ApiError::InvalidApiKey, StatusCode::UNAUTHORIZED),
            (ApiError::Directory(DirectoryError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (
                ApiError::Directory(ValidationError::InvalidEmail("x".to_string()).into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Directory(ValidationError::DuplicateEmail("x".to_string()).into()),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::Directory(StorageError::Wal("io".to_string()).into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ApiError::Page(PageError::NotFound("p".to_string())), StatusCode::NOT_FOUND),
            (ApiError::Page(PageError::IdTaken("p".to_string())), StatusCode::CONFLICT),
            (
                ApiError::Page(PageError::Storage(StorageError::Wal("disk".to_string()))),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_invalid_credentials_message_is_uniform() {
        assert_eq!(
            DirectoryError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
    }
}
