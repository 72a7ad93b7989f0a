//! Favorite-state overlay for place results.
//!
//! Favorites are an enrichment: a failed read yields an empty set and a
//! warning, never an error.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use ristretto_core::UserId;

use crate::db::FavoriteStore;
use crate::models::{CoffeeShop, CoffeeShopDetails};

/// Place ids one user has saved, loaded fresh per request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet(HashSet<String>);

impl FavoriteSet {
    #[must_use]
    pub fn contains(&self, place_id: &str) -> bool {
        self.0.contains(place_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Set `is_favorite` on each shop.
    pub fn apply(&self, shops: &mut [CoffeeShop]) {
        for shop in shops {
            shop.is_favorite = self.contains(&shop.id);
        }
    }

    /// Set `is_favorite` on a detail record.
    ///
    /// Keyed on the id the client asked for, since the provider may answer
    /// with a newer id for the same place.
    pub fn apply_detail(&self, details: &mut CoffeeShopDetails, requested_id: &str) {
        details.is_favorite = self.contains(requested_id);
    }
}

impl From<HashSet<String>> for FavoriteSet {
    fn from(ids: HashSet<String>) -> Self {
        Self(ids)
    }
}

/// Loads a user's [`FavoriteSet`], degrading to empty on failure.
#[derive(Clone)]
pub struct FavoritesOverlay {
    favorites: Arc<dyn FavoriteStore>,
}

impl FavoritesOverlay {
    #[must_use]
    pub fn new(favorites: Arc<dyn FavoriteStore>) -> Self {
        Self { favorites }
    }

    /// The user's favorites, or an empty set if storage is unavailable.
    pub async fn overlay(&self, user_id: UserId) -> FavoriteSet {
        match self.favorites.favorite_place_ids(user_id).await {
            Ok(ids) => FavoriteSet::from(ids),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Failed to load favorites, continuing without them");
                FavoriteSet::default()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ristretto_core::PlaceId;

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::NewFavorite;

    fn shop(id: &str) -> CoffeeShop {
        CoffeeShop {
            id: id.to_string(),
            name: id.to_uppercase(),
            latitude: 0.0,
            longitude: 0.0,
            is_favorite: false,
        }
    }

    #[tokio::test]
    async fn test_overlay_marks_favorites() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::new(1);
        store
            .add(
                user,
                &NewFavorite {
                    place_id: PlaceId::parse("b").unwrap(),
                    name: "B".to_string(),
                    latitude: 0.0,
                    longitude: 0.0,
                },
            )
            .await
            .unwrap();

        let set = FavoritesOverlay::new(store).overlay(user).await;
        let mut shops = vec![shop("a"), shop("b")];
        set.apply(&mut shops);

        assert!(!shops[0].is_favorite);
        assert!(shops[1].is_favorite);
    }

    #[test]
    fn test_detail_flag_uses_requested_id() {
        let set = FavoriteSet::from(HashSet::from(["old_id".to_string()]));
        let mut details = CoffeeShopDetails {
            id: "new_id".to_string(),
            name: "Four Barrel".to_string(),
            latitude: 0.0,
            longitude: 0.0,
            address: None,
            phone_number: None,
            website: None,
            rating: None,
            price_level: None,
            is_favorite: false,
            opening_hours: Vec::new(),
            photos: Vec::new(),
        };

        set.apply_detail(&mut details, "old_id");
        assert!(details.is_favorite);

        set.apply_detail(&mut details, "new_id");
        assert!(!details.is_favorite);
    }

    #[tokio::test]
    async fn test_overlay_outage_degrades_to_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);

        let set = FavoritesOverlay::new(store).overlay(UserId::new(1)).await;
        assert!(set.is_empty());
    }
}
