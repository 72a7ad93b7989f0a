//! Business logic services.

pub mod auth;
pub mod coffee_shops;
pub mod favorites;

pub use auth::AuthService;
pub use coffee_shops::{CoffeeShopService, ProviderFailurePolicy};
pub use favorites::{FavoriteSet, FavoritesOverlay};
