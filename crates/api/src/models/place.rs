//! Normalized coffee shop records returned to clients.
//!
//! These are the only place shapes that cross the service boundary. Provider
//! payloads are converted into them by [`crate::places::PlaceNormalizer`].

use serde::Serialize;

/// A coffee shop in a nearby-search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeShop {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub is_favorite: bool,
}

/// Full coffee shop details.
///
/// Optional fields are omitted from JSON when the provider had no value.
/// `opening_hours` is either empty or exactly seven entries, Monday first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeShopDetails {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    pub is_favorite: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub opening_hours: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
}
