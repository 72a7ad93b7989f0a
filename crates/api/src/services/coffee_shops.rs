//! Coffee shop aggregation.
//!
//! Combines the places provider, the normalizer and the favorites overlay
//! into the two read operations the API exposes. The provider call and the
//! favorites read are independent and run concurrently.

use std::sync::Arc;

use tracing::warn;

use ristretto_core::{NearbySearch, PlaceId, UserId};

use super::favorites::FavoritesOverlay;
use crate::config::Environment;
use crate::models::{CoffeeShop, CoffeeShopDetails};
use crate::places::{PlaceNormalizer, PlaceProvider, PlacesError};

/// What to do when the provider fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFailurePolicy {
    /// Return the error (surfaces as 502).
    Propagate,
    /// Log a warning and serve fixed sample data.
    Fallback,
}

impl ProviderFailurePolicy {
    /// Fallback data is only ever served outside production.
    #[must_use]
    pub const fn for_environment(environment: Environment) -> Self {
        if environment.is_production() {
            Self::Propagate
        } else {
            Self::Fallback
        }
    }
}

/// Nearby search and place details, enriched with favorite state.
#[derive(Clone)]
pub struct CoffeeShopService {
    provider: Arc<dyn PlaceProvider>,
    normalizer: PlaceNormalizer,
    overlay: FavoritesOverlay,
    policy: ProviderFailurePolicy,
}

impl CoffeeShopService {
    #[must_use]
    pub fn new(
        provider: Arc<dyn PlaceProvider>,
        normalizer: PlaceNormalizer,
        overlay: FavoritesOverlay,
        policy: ProviderFailurePolicy,
    ) -> Self {
        Self {
            provider,
            normalizer,
            overlay,
            policy,
        }
    }

    /// Cafes near the search centre, flagged with the user's favorites.
    ///
    /// # Errors
    ///
    /// Returns the provider error under `ProviderFailurePolicy::Propagate`.
    pub async fn list_nearby(
        &self,
        search: &NearbySearch,
        user_id: UserId,
    ) -> Result<Vec<CoffeeShop>, PlacesError> {
        let (places, favorites) = tokio::join!(
            self.provider.search_nearby(search),
            self.overlay.overlay(user_id)
        );

        let mut shops = match places {
            Ok(raw) => raw
                .into_iter()
                .filter_map(|place| self.normalizer.place(place))
                .collect(),
            Err(e) => self.recover(e, || fallback_nearby(search))?,
        };

        favorites.apply(&mut shops);
        Ok(shops)
    }

    /// Details for one place, flagged with the user's favorites.
    ///
    /// # Errors
    ///
    /// Returns the provider error under `ProviderFailurePolicy::Propagate`.
    pub async fn get_detail(
        &self,
        place_id: &PlaceId,
        user_id: UserId,
    ) -> Result<CoffeeShopDetails, PlacesError> {
        let (detail, favorites) = tokio::join!(
            self.provider.get_detail(place_id),
            self.overlay.overlay(user_id)
        );

        let mut details = match detail {
            Ok(raw) => self.normalizer.detail(raw, place_id.as_str()),
            Err(e) => self.recover(e, || fallback_detail(place_id))?,
        };

        favorites.apply_detail(&mut details, place_id.as_str());
        Ok(details)
    }

    fn recover<T>(&self, err: PlacesError, fallback: impl FnOnce() -> T) -> Result<T, PlacesError> {
        match self.policy {
            ProviderFailurePolicy::Propagate => Err(err),
            ProviderFailurePolicy::Fallback => {
                warn!(error = %err, "Places provider failed, serving fallback data");
                Ok(fallback())
            }
        }
    }
}

// =============================================================================
// Fallback data
// =============================================================================

/// Three fixed cafes around the search centre.
fn fallback_nearby(search: &NearbySearch) -> Vec<CoffeeShop> {
    let latitude = search.center().latitude();
    let longitude = search.center().longitude();

    [
        ("mock_1", "Caf\u{e9} Sunrise", 0.0, 0.0),
        ("mock_2", "Bean Town", 0.001, -0.001),
        ("mock_3", "Morning Brew", -0.002, 0.002),
    ]
    .into_iter()
    .map(|(id, name, d_lat, d_lng)| CoffeeShop {
        id: id.to_string(),
        name: name.to_string(),
        latitude: latitude + d_lat,
        longitude: longitude + d_lng,
        is_favorite: false,
    })
    .collect()
}

/// A fixed detail record for the requested id.
fn fallback_detail(place_id: &PlaceId) -> CoffeeShopDetails {
    let defaults = NearbySearch::default();

    CoffeeShopDetails {
        id: place_id.as_str().to_string(),
        name: "Caf\u{e9} Sunrise".to_string(),
        latitude: defaults.center().latitude(),
        longitude: defaults.center().longitude(),
        address: Some("123 Coffee Street, San Francisco, CA 94107".to_string()),
        phone_number: Some("+1 (415) 555-1234".to_string()),
        website: Some("https://example.com/coffee".to_string()),
        rating: Some(4.5),
        price_level: Some(2),
        is_favorite: false,
        opening_hours: [
            "Monday: 07:00 - 19:00",
            "Tuesday: 07:00 - 19:00",
            "Wednesday: 07:00 - 19:00",
            "Thursday: 07:00 - 19:00",
            "Friday: 07:00 - 20:00",
            "Saturday: 08:00 - 20:00",
            "Sunday: 08:00 - 18:00",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        photos: Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use url::Url;

    use super::*;
    use crate::db::{FavoriteStore, MemoryStore};
    use crate::models::NewFavorite;
    use crate::places::{PhotoSize, PhotoUrlBuilder, RawPlace, RawPlaceDetail};

    /// Provider returning canned data, or failing when `down` is set.
    struct StubProvider {
        down: AtomicBool,
    }

    impl StubProvider {
        fn up() -> Self {
            Self {
                down: AtomicBool::new(false),
            }
        }

        fn down() -> Self {
            Self {
                down: AtomicBool::new(true),
            }
        }

        fn check(&self) -> Result<(), PlacesError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(PlacesError::Api {
                    status: 503,
                    message: "unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl PlaceProvider for StubProvider {
        async fn search_nearby(&self, _search: &NearbySearch) -> Result<Vec<RawPlace>, PlacesError> {
            self.check()?;
            Ok(serde_json::from_str(
                r#"[
                    {"id": "abc", "displayName": {"text": "Sightglass"}, "location": {"latitude": 37.77, "longitude": -122.41}},
                    {"displayName": {"text": "No id"}},
                    {"id": "def", "displayName": {"text": "Ritual"}}
                ]"#,
            )
            .unwrap())
        }

        async fn get_detail(&self, place_id: &PlaceId) -> Result<RawPlaceDetail, PlacesError> {
            self.check()?;
            Ok(RawPlaceDetail {
                id: Some(place_id.as_str().to_string()),
                ..RawPlaceDetail::default()
            })
        }
    }

    fn normalizer() -> PlaceNormalizer {
        PlaceNormalizer::new(
            PhotoUrlBuilder::new(&Url::parse("https://places.googleapis.com/v1").unwrap(), None),
            PhotoSize::default(),
        )
    }

    fn service(
        provider: StubProvider,
        store: Arc<MemoryStore>,
        policy: ProviderFailurePolicy,
    ) -> CoffeeShopService {
        CoffeeShopService::new(
            Arc::new(provider),
            normalizer(),
            FavoritesOverlay::new(store),
            policy,
        )
    }

    async fn favorite(store: &MemoryStore, user: UserId, place_id: &str) {
        store
            .add(
                user,
                &NewFavorite {
                    place_id: PlaceId::parse(place_id).unwrap(),
                    name: place_id.to_string(),
                    latitude: 0.0,
                    longitude: 0.0,
                },
            )
            .await
            .unwrap();
    }

    #[test]
    fn test_policy_for_environment() {
        assert_eq!(
            ProviderFailurePolicy::for_environment(Environment::Production),
            ProviderFailurePolicy::Propagate
        );
        assert_eq!(
            ProviderFailurePolicy::for_environment(Environment::Development),
            ProviderFailurePolicy::Fallback
        );
    }

    #[tokio::test]
    async fn test_list_nearby_normalizes_and_overlays() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::new(1);
        favorite(&store, user, "def").await;
        let service = service(StubProvider::up(), store, ProviderFailurePolicy::Propagate);

        let shops = service
            .list_nearby(&NearbySearch::default(), user)
            .await
            .unwrap();

        let summary: Vec<(&str, bool)> = shops
            .iter()
            .map(|s| (s.id.as_str(), s.is_favorite))
            .collect();
        assert_eq!(summary, vec![("abc", false), ("def", true)]);
        assert_eq!(shops[0].name, "Sightglass");
    }

    #[tokio::test]
    async fn test_favorites_outage_does_not_fail_detail() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::new(1);
        favorite(&store, user, "abc").await;
        store.set_unavailable(true);
        let service = service(StubProvider::up(), store, ProviderFailurePolicy::Propagate);

        let details = service
            .get_detail(&PlaceId::parse("abc").unwrap(), user)
            .await
            .unwrap();

        assert_eq!(details.id, "abc");
        assert!(!details.is_favorite);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates_in_production() {
        let store = Arc::new(MemoryStore::new());
        let service = service(StubProvider::down(), store, ProviderFailurePolicy::Propagate);

        let err = service
            .list_nearby(&NearbySearch::default(), UserId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, PlacesError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_provider_failure_falls_back_in_development() {
        let store = Arc::new(MemoryStore::new());
        let user = UserId::new(1);
        favorite(&store, user, "mock_3").await;
        let service = service(StubProvider::down(), store, ProviderFailurePolicy::Fallback);

        let shops = service
            .list_nearby(&NearbySearch::default(), user)
            .await
            .unwrap();
        let ids: Vec<&str> = shops.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["mock_1", "mock_2", "mock_3"]);
        assert!(shops[2].is_favorite);

        let details = service
            .get_detail(&PlaceId::parse("xyz").unwrap(), user)
            .await
            .unwrap();
        assert_eq!(details.id, "xyz");
        assert_eq!(details.opening_hours.len(), 7);
    }
}
