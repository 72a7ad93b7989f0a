//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur while authenticating a request.
///
/// `InvalidHeader` and `InvalidToken` are client failures (401). The signing
/// key variants are configuration failures and `ProvisioningFailed` is a
/// storage failure; those are server errors (500) and are logged separately.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Authorization header missing or not a bearer token.
    #[error("missing or malformed authorization header")]
    InvalidHeader,

    /// Token failed verification (signature, expiry, algorithm, claims).
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// No public key is configured for token verification.
    #[error("token signing key is not configured")]
    MissingSigningKey,

    /// The configured public key could not be parsed.
    #[error("token signing key is malformed: {0}")]
    MalformedSigningKey(String),

    /// Local user lookup or creation failed.
    #[error("user provisioning failed: {0}")]
    ProvisioningFailed(#[from] RepositoryError),
}

impl AuthError {
    /// Whether the failure was caused by the client's credentials.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidHeader | Self::InvalidToken(_))
    }
}
