//! Bearer token verification.

use jsonwebtoken::{AlgorithmFamily, DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::AuthConfig;

/// Identity claims carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedClaims {
    /// Identity provider subject; the external id of the user.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    /// Authorized party (the frontend origin that requested the token).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
}

/// Verifies RSA-signed bearer tokens against the configured public key.
///
/// Pure: no I/O, no state beyond the key and validation rules.
#[derive(Clone)]
pub struct TokenVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("has_key", &self.key.is_some())
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Build a verifier from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedSigningKey` if a key is configured but is
    /// not an RSA public key in PEM form. An absent key is accepted here and
    /// reported by [`verify`](Self::verify).
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let key = config
            .jwt_public_key
            .as_deref()
            .map(|pem| {
                DecodingKey::from_rsa_pem(pem.as_bytes())
                    .map_err(|e| AuthError::MalformedSigningKey(e.to_string()))
            })
            .transpose()?;

        let mut validation = Validation::new_for_family(AlgorithmFamily::Rsa);
        validation.validate_aud = false;
        validation.validate_nbf = true;
        validation.leeway = config.leeway_secs;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self { key, validation })
    }

    /// Whether a public key is configured.
    #[must_use]
    pub const fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// - `AuthError::MissingSigningKey` if no key is configured
    /// - `AuthError::InvalidToken` for any malformed, tampered, expired or
    ///   non-RSA token
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        let key = self.key.as_ref().ok_or(AuthError::MissingSigningKey)?;

        // The algorithm family is checked from the header before the key is used
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        if header.alg.family() != AlgorithmFamily::Rsa {
            return Err(AuthError::InvalidToken(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }

        let data = decode::<VerifiedClaims>(token, key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }

        Ok(data.claims)
    }
}
