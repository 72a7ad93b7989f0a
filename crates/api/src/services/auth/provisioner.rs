//! Local user provisioning for verified identities.

use std::sync::Arc;

use tracing::{info, instrument};

use ristretto_core::UserId;

use super::{AuthError, VerifiedClaims};
use crate::db::{RepositoryError, UserStore};
use crate::models::NewUser;

/// Maps verified external identities to local user ids.
#[derive(Clone)]
pub struct IdentityProvisioner {
    users: Arc<dyn UserStore>,
}

impl IdentityProvisioner {
    #[must_use]
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Return the local id for the token subject, creating the user on first sight.
    ///
    /// Existing users are returned without writes. A unique-constraint
    /// conflict on insert means a concurrent request created the user first;
    /// that row is looked up and returned.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProvisioningFailed` if storage fails.
    #[instrument(skip(self, claims), fields(external_id = %claims.sub))]
    pub async fn ensure_user(&self, claims: &VerifiedClaims) -> Result<UserId, AuthError> {
        if let Some(id) = self.users.find_id_by_external_id(&claims.sub).await? {
            return Ok(id);
        }

        let new_user = NewUser {
            external_id: claims.sub.clone(),
            email: claims.email.clone(),
            first_name: claims.first_name.clone(),
            last_name: claims.last_name.clone(),
        };

        match self.users.create(&new_user).await {
            Ok(id) => {
                info!(user_id = %id, "Provisioned new user");
                Ok(id)
            }
            Err(RepositoryError::Conflict(_)) => self
                .users
                .find_id_by_external_id(&claims.sub)
                .await?
                .ok_or_else(|| {
                    AuthError::ProvisioningFailed(RepositoryError::DataCorruption(
                        "user conflict on insert but not found on re-query".to_string(),
                    ))
                }),
            Err(e) => Err(e.into()),
        }
    }
}
