//! Places provider client and response normalization.
//!
//! # Architecture
//!
//! - [`PlaceProvider`] is the seam between the aggregation service and the
//!   outside world; [`PlacesClient`] implements it over HTTP
//! - Provider payloads deserialize into the lenient [`types`], where every
//!   field is optional and type mismatches degrade to `None`
//! - [`PlaceNormalizer`] turns those into the stable client-facing models
//!
//! # Example
//!
//! ```rust,ignore
//! use ristretto_api::places::{PlaceNormalizer, PlaceProvider, PlacesClient};
//!
//! let client = PlacesClient::new(&config.places)?;
//! let raw = client.get_detail(&place_id).await?;
//! let details = normalizer.detail(raw, &place_id);
//! ```

mod client;
pub mod normalize;
pub mod types;

pub use client::PlacesClient;
pub use normalize::{PhotoSize, PhotoUrlBuilder, PlaceNormalizer};
pub use types::{RawOpeningHours, RawPhoto, RawPlace, RawPlaceDetail};

use async_trait::async_trait;
use thiserror::Error;

use ristretto_core::{NearbySearch, PlaceId};

/// Errors that can occur when interacting with the places provider.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// No API key is configured.
    #[error("places API key is not configured")]
    MissingApiKey,

    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a status other than 200.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// External place search and details source.
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Cafes within a circle around the search centre.
    async fn search_nearby(&self, search: &NearbySearch) -> Result<Vec<RawPlace>, PlacesError>;

    /// Full details for one place.
    async fn get_detail(&self, place_id: &PlaceId) -> Result<RawPlaceDetail, PlacesError>;
}
