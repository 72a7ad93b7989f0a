//! Request authentication.
//!
//! A request is authenticated in two sequential steps:
//!
//! 1. [`TokenVerifier`] checks the bearer token's RSA signature and claims
//! 2. [`IdentityProvisioner`] maps the token subject to a local user,
//!    creating one on first sight
//!
//! [`AuthService::authenticate`] runs both and yields a [`Principal`].

mod error;
mod provisioner;
mod token;

pub use error::AuthError;
pub use provisioner::IdentityProvisioner;
pub use token::{TokenVerifier, VerifiedClaims};

use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::UserStore;
use crate::models::Principal;

/// Token verification plus identity provisioning.
#[derive(Clone)]
pub struct AuthService {
    verifier: TokenVerifier,
    provisioner: IdentityProvisioner,
}

impl AuthService {
    /// Create the auth service.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedSigningKey` if the configured key cannot be parsed.
    pub fn new(config: &AuthConfig, users: Arc<dyn UserStore>) -> Result<Self, AuthError> {
        Ok(Self {
            verifier: TokenVerifier::new(config)?,
            provisioner: IdentityProvisioner::new(users),
        })
    }

    /// The token verifier.
    #[must_use]
    pub const fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Authenticate a request from its `Authorization` header value.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidHeader` if the header is missing or not a bearer token
    /// - `AuthError::InvalidToken` / `MissingSigningKey` from verification
    /// - `AuthError::ProvisioningFailed` if the user cannot be loaded or created
    pub async fn authenticate(&self, authorization: Option<&str>) -> Result<Principal, AuthError> {
        let token = parse_bearer(authorization)?;
        let claims = self.verifier.verify(token)?;
        let user_id = self.provisioner.ensure_user(&claims).await?;

        Ok(Principal {
            external_id: claims.sub,
            user_id,
            email: claims.email,
            first_name: claims.first_name,
            last_name: claims.last_name,
        })
    }
}

/// Extract the token from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively.
///
/// # Errors
///
/// Returns `AuthError::InvalidHeader` if the header is absent, uses another
/// scheme, or carries an empty token.
pub fn parse_bearer(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.ok_or(AuthError::InvalidHeader)?.trim();
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidHeader);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::InvalidHeader);
    }
    Ok(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(parse_bearer(Some("bearer abc")).unwrap(), "abc");
        assert_eq!(parse_bearer(Some("  Bearer   abc  ")).unwrap(), "abc");
    }

    #[test]
    fn test_parse_bearer_rejects_malformed() {
        for header in [
            None,
            Some(""),
            Some("Bearer"),
            Some("Bearer "),
            Some("Basic dXNlcjpwYXNz"),
            Some("abc.def.ghi"),
            Some("Bearer a b"),
        ] {
            assert!(
                matches!(parse_bearer(header), Err(AuthError::InvalidHeader)),
                "accepted {header:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_missing_header_never_touches_storage() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let service = AuthService::new(&AuthConfig::default(), store).unwrap();

        assert!(matches!(
            service.authenticate(None).await,
            Err(AuthError::InvalidHeader)
        ));
    }

    #[tokio::test]
    async fn test_missing_key_is_distinct_from_bad_token() {
        let service =
            AuthService::new(&AuthConfig::default(), std::sync::Arc::new(MemoryStore::new()))
                .unwrap();

        assert!(matches!(
            service.authenticate(Some("Bearer abc.def.ghi")).await,
            Err(AuthError::MissingSigningKey)
        ));
    }
}
