//! Geographic coordinates and nearby-search parameters.

use serde::{Deserialize, Serialize};

/// Errors that can occur when building geographic search parameters.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    /// Latitude outside [-90, 90] or not finite.
    #[error("latitude must be between -90 and 90 (got {0})")]
    Latitude(f64),
    /// Longitude outside [-180, 180] or not finite.
    #[error("longitude must be between -180 and 180 (got {0})")]
    Longitude(f64),
    /// Radius not in (0, max].
    #[error("radius must be greater than 0 and at most {max} meters (got {value})")]
    Radius {
        /// Rejected value.
        value: f64,
        /// Maximum allowed radius.
        max: f64,
    },
    /// Result count not in [1, max].
    #[error("max results must be between 1 and {max} (got {value})")]
    MaxResults {
        /// Rejected value.
        value: u32,
        /// Maximum allowed result count.
        max: u32,
    },
}

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Create validated coordinates.
    ///
    /// # Errors
    ///
    /// Returns `GeoError::Latitude` or `GeoError::Longitude` if either value
    /// is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Parameters for a circle-restricted nearby search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbySearch {
    center: Coordinates,
    radius_meters: f64,
    max_results: u32,
}

impl NearbySearch {
    /// Default search centre latitude (San Francisco Ferry Building).
    pub const DEFAULT_LATITUDE: f64 = 37.7937;
    /// Default search centre longitude.
    pub const DEFAULT_LONGITUDE: f64 = -122.3965;
    /// Default search radius in meters.
    pub const DEFAULT_RADIUS_METERS: f64 = 500.0;
    /// Default number of results.
    pub const DEFAULT_MAX_RESULTS: u32 = 10;
    /// Largest radius the provider accepts.
    pub const MAX_RADIUS_METERS: f64 = 50_000.0;
    /// Largest result count the provider accepts.
    pub const MAX_RESULTS_LIMIT: u32 = 20;

    /// Create validated nearby-search parameters.
    ///
    /// # Errors
    ///
    /// Returns `GeoError::Radius` if the radius is not in (0, 50000] and
    /// `GeoError::MaxResults` if the count is not in [1, 20].
    pub fn new(center: Coordinates, radius_meters: f64, max_results: u32) -> Result<Self, GeoError> {
        if !radius_meters.is_finite()
            || radius_meters <= 0.0
            || radius_meters > Self::MAX_RADIUS_METERS
        {
            return Err(GeoError::Radius {
                value: radius_meters,
                max: Self::MAX_RADIUS_METERS,
            });
        }
        if max_results == 0 || max_results > Self::MAX_RESULTS_LIMIT {
            return Err(GeoError::MaxResults {
                value: max_results,
                max: Self::MAX_RESULTS_LIMIT,
            });
        }
        Ok(Self {
            center,
            radius_meters,
            max_results,
        })
    }

    /// Search centre.
    #[must_use]
    pub const fn center(&self) -> Coordinates {
        self.center
    }

    /// Search radius in meters.
    #[must_use]
    pub const fn radius_meters(&self) -> f64 {
        self.radius_meters
    }

    /// Maximum number of results to request.
    #[must_use]
    pub const fn max_results(&self) -> u32 {
        self.max_results
    }
}

impl Default for NearbySearch {
    fn default() -> Self {
        Self {
            center: Coordinates {
                latitude: Self::DEFAULT_LATITUDE,
                longitude: Self::DEFAULT_LONGITUDE,
            },
            radius_meters: Self::DEFAULT_RADIUS_METERS,
            max_results: Self::DEFAULT_MAX_RESULTS,
        }
    }
}
