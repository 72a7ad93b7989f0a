//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use ristretto_core::{GeoError, PlaceIdError};

use crate::db::RepositoryError;
use crate::places::PlacesError;
use crate::services::auth::AuthError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Places provider call failed.
    #[error("Places error: {0}")]
    Places(#[from] PlacesError),

    /// Authentication failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PlaceIdError> for AppError {
    fn from(err: PlaceIdError) -> Self {
        Self::BadRequest(format!("Invalid place ID: {err}"))
    }
}

impl From<GeoError> for AppError {
    fn from(err: GeoError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Places(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(err) if err.is_client_error() => StatusCode::UNAUTHORIZED,
            Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Client-safe message. Internal details stay in logs and Sentry.
    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Places(_) => "External service error".to_string(),
            Self::Auth(err) if err.is_client_error() => {
                "Invalid or missing credentials".to_string()
            }
            Self::Auth(_) => "Internal server error".to_string(),
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, self.public_message()).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body_of(err: AppError) -> String {
        let bytes = to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Favorite not found".to_string());
        assert_eq!(err.to_string(), "Not found: Favorite not found");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(RepositoryError::NotFound.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(RepositoryError::Conflict("dup".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(PlacesError::MissingApiKey.into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_auth_errors_split_by_cause() {
        assert_eq!(
            status_of(AuthError::InvalidHeader.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::InvalidToken("expired".to_string()).into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(AuthError::MissingSigningKey.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AuthError::ProvisioningFailed(RepositoryError::NotFound).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_errors_are_bad_requests() {
        assert_eq!(
            status_of(PlaceIdError::Empty.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(GeoError::Latitude(91.0).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_not_exposed() {
        let body = body_of(
            PlacesError::Api {
                status: 403,
                message: "API key not valid: AIza...".to_string(),
            }
            .into(),
        )
        .await;
        assert_eq!(body, "External service error");

        let body = body_of(AuthError::InvalidToken("InvalidSignature".to_string()).into()).await;
        assert_eq!(body, "Invalid or missing credentials");

        let body = body_of(AppError::BadRequest("Place ID and Name are required".to_string())).await;
        assert_eq!(body, "Place ID and Name are required");
    }
}
