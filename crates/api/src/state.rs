//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::db::Repositories;
use crate::places::{PlaceNormalizer, PlaceProvider};
use crate::services::auth::AuthError;
use crate::services::{AuthService, CoffeeShopService, FavoritesOverlay, ProviderFailurePolicy};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the services and storage handles built at startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    repositories: Repositories,
    auth: AuthService,
    coffee_shops: CoffeeShopService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `repositories` - Storage handles
    /// * `provider` - Places provider used for search and details
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MalformedSigningKey` if the configured public key is invalid.
    pub fn new(
        config: &ApiConfig,
        repositories: Repositories,
        provider: Arc<dyn PlaceProvider>,
    ) -> Result<Self, AuthError> {
        let auth = AuthService::new(&config.auth, repositories.users.clone())?;
        let coffee_shops = CoffeeShopService::new(
            provider,
            PlaceNormalizer::from_config(&config.places),
            FavoritesOverlay::new(repositories.favorites.clone()),
            ProviderFailurePolicy::for_environment(config.environment),
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                repositories,
                auth,
                coffee_shops,
            }),
        })
    }

    /// Get a reference to the storage handles.
    #[must_use]
    pub fn repositories(&self) -> &Repositories {
        &self.inner.repositories
    }

    /// Get a reference to the auth service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the coffee shop aggregation service.
    #[must_use]
    pub fn coffee_shops(&self) -> &CoffeeShopService {
        &self.inner.coffee_shops
    }
}
