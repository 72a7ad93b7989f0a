//! Core types for Ristretto.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod geo;
pub mod id;
pub mod place_id;

pub use geo::{Coordinates, GeoError, NearbySearch};
pub use id::*;
pub use place_id::{PlaceId, PlaceIdError};
