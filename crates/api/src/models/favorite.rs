//! Favorite coffee shop models.

use chrono::{DateTime, Utc};

use ristretto_core::{FavoriteId, PlaceId};

use super::CoffeeShop;

/// A coffee shop saved by a user.
#[derive(Debug, Clone)]
pub struct Favorite {
    pub id: FavoriteId,
    pub place_id: PlaceId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_at: DateTime<Utc>,
}

/// Fields for saving a favorite.
#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub place_id: PlaceId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<Favorite> for CoffeeShop {
    fn from(favorite: Favorite) -> Self {
        Self {
            id: favorite.place_id.into_inner(),
            name: favorite.name,
            latitude: favorite.latitude,
            longitude: favorite.longitude,
            is_favorite: true,
        }
    }
}
