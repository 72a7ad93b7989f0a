//! HTTP client for the places provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use ristretto_core::{NearbySearch, PlaceId};

use super::types::{
    Center, Circle, LocationRestriction, RawPlace, RawPlaceDetail, SearchNearbyRequest,
    SearchNearbyResponse,
};
use super::{PlaceProvider, PlacesError};
use crate::config::PlacesConfig;

const API_KEY_HEADER: &str = "X-Goog-Api-Key";
const FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";

/// Fields requested from nearby search.
const SEARCH_FIELD_MASK: &str = "places.id,places.displayName,places.location";

/// Fields requested from place details.
const DETAIL_FIELD_MASK: &str = "id,displayName,formattedAddress,location,websiteUri,internationalPhoneNumber,rating,priceLevel,currentOpeningHours,photos";

/// Place types included in nearby search.
const INCLUDED_TYPES: &[&str] = &["cafe"];

/// Longest slice of a provider error body kept in `PlacesError::Api`.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Places provider API client.
#[derive(Clone)]
pub struct PlacesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for PlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacesClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl PlacesClient {
    /// Create a new places client.
    ///
    /// A missing API key is not an error here; each call reports
    /// `PlacesError::MissingApiKey` instead.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &PlacesConfig) -> Result<Self, PlacesError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn api_key(&self) -> Result<&str, PlacesError> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or(PlacesError::MissingApiKey)
    }

    /// Send a request and decode a 200 response body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        field_mask: &str,
    ) -> Result<T, PlacesError> {
        let response = request
            .header(API_KEY_HEADER, self.api_key()?)
            .header(FIELD_MASK_HEADER, field_mask)
            .send()
            .await?;
        let status = response.status();

        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(PlacesError::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Parse(e.to_string()))
    }
}

#[async_trait]
impl PlaceProvider for PlacesClient {
    #[instrument(skip(self, search), fields(
        latitude = search.center().latitude(),
        longitude = search.center().longitude(),
        radius = search.radius_meters(),
    ))]
    async fn search_nearby(&self, search: &NearbySearch) -> Result<Vec<RawPlace>, PlacesError> {
        let body = SearchNearbyRequest {
            included_types: INCLUDED_TYPES,
            max_result_count: search.max_results(),
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: Center {
                        latitude: search.center().latitude(),
                        longitude: search.center().longitude(),
                    },
                    radius: search.radius_meters(),
                },
            },
        };

        let url = format!("{}/places:searchNearby", self.base_url);
        let response: SearchNearbyResponse = self
            .execute(self.client.post(url).json(&body), SEARCH_FIELD_MASK)
            .await?;

        let places = response.places.unwrap_or_default();
        debug!(count = places.len(), "Nearby search complete");
        Ok(places)
    }

    #[instrument(skip(self, place_id), fields(place_id = %place_id))]
    async fn get_detail(&self, place_id: &PlaceId) -> Result<RawPlaceDetail, PlacesError> {
        let url = format!("{}/places/{}", self.base_url, place_id.as_str());
        self.execute(self.client.get(url), DETAIL_FIELD_MASK).await
    }
}
