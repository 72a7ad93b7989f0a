//! Provider-shaped place records.
//!
//! The provider omits fields freely and has been observed to change the
//! representation of some of them (price level as enum string or number,
//! opening time as `HHMM` string or hour/minute pair). Every field here is an
//! `Option` and is deserialized leniently: a value of the wrong type becomes
//! `None` rather than failing the whole response, and `null` or malformed
//! entries inside arrays are dropped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// =============================================================================
// Requests
// =============================================================================

/// Body of a `places:searchNearby` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchNearbyRequest<'a> {
    pub included_types: &'a [&'a str],
    pub max_result_count: u32,
    pub location_restriction: LocationRestriction,
}

#[derive(Debug, Serialize)]
pub(crate) struct LocationRestriction {
    pub circle: Circle,
}

#[derive(Debug, Serialize)]
pub(crate) struct Circle {
    pub center: Center,
    pub radius: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct Center {
    pub latitude: f64,
    pub longitude: f64,
}

// =============================================================================
// Responses
// =============================================================================

/// Response of a `places:searchNearby` call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchNearbyResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub places: Option<Vec<RawPlace>>,
}

/// A place as returned by nearby search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlace {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<LocalizedText>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<LatLng>,
}

/// A place as returned by the details endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlaceDetail {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<LocalizedText>,
    #[serde(default, deserialize_with = "lenient")]
    pub formatted_address: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<LatLng>,
    #[serde(default, deserialize_with = "lenient")]
    pub website_uri: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub international_phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "price_level")]
    pub price_level: Option<u8>,
    #[serde(default, deserialize_with = "lenient")]
    pub current_opening_hours: Option<RawOpeningHours>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub photos: Option<Vec<RawPhoto>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LatLng {
    #[serde(default, deserialize_with = "lenient")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub longitude: Option<f64>,
}

/// Photo reference. `name` is a resource path like `places/X/photos/Y`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPhoto {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOpeningHours {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub periods: Option<Vec<RawPeriod>>,
}

/// One opening interval. A missing `close` means open around the clock.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPeriod {
    #[serde(default, deserialize_with = "lenient")]
    pub open: Option<RawTimePoint>,
    #[serde(default, deserialize_with = "lenient")]
    pub close: Option<RawTimePoint>,
}

/// A weekday and time. `day` is 0 for Sunday through 6 for Saturday.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTimePoint {
    #[serde(default, deserialize_with = "lenient")]
    pub day: Option<u8>,
    #[serde(default, deserialize_with = "lenient")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub hour: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub minute: Option<u32>,
}

// =============================================================================
// Lenient deserializers
// =============================================================================

/// Deserialize any JSON value, keeping it only if it converts to `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Deserialize an array, dropping entries that do not convert to `T`.
///
/// A non-array value becomes `None`.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter(|item| !item.is_null())
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

/// Price level as a number (0-4) or a `PRICE_LEVEL_*` enum name.
fn price_level<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|level| u8::try_from(level).ok())
            .filter(|level| *level <= 4),
        Some(Value::String(s)) => match s.as_str() {
            "PRICE_LEVEL_FREE" => Some(0),
            "PRICE_LEVEL_INEXPENSIVE" => Some(1),
            "PRICE_LEVEL_MODERATE" => Some(2),
            "PRICE_LEVEL_EXPENSIVE" => Some(3),
            "PRICE_LEVEL_VERY_EXPENSIVE" => Some(4),
            _ => None,
        },
        _ => None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_with_everything_missing() {
        let detail: RawPlaceDetail = serde_json::from_str("{}").unwrap();
        assert!(detail.id.is_none());
        assert!(detail.current_opening_hours.is_none());
        assert!(detail.photos.is_none());
    }

    #[test]
    fn test_nulls_and_wrong_types_become_none() {
        let detail: RawPlaceDetail = serde_json::from_str(
            r#"{
                "id": "abc",
                "displayName": null,
                "location": "somewhere",
                "rating": "4.5",
                "currentOpeningHours": null,
                "photos": null
            }"#,
        )
        .unwrap();

        assert_eq!(detail.id.as_deref(), Some("abc"));
        assert!(detail.display_name.is_none());
        assert!(detail.location.is_none());
        assert!(detail.rating.is_none());
        assert!(detail.current_opening_hours.is_none());
        assert!(detail.photos.is_none());
    }

    #[test]
    fn test_null_array_entries_are_dropped() {
        let detail: RawPlaceDetail = serde_json::from_str(
            r#"{
                "photos": [null, {"name": "places/abc/photos/1"}, 7],
                "currentOpeningHours": {"periods": [null, {"open": {"day": 1, "time": "0800"}}]}
            }"#,
        )
        .unwrap();

        let photos = detail.photos.unwrap();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].name.as_deref(), Some("places/abc/photos/1"));

        let periods = detail.current_opening_hours.unwrap().periods.unwrap();
        assert_eq!(periods.len(), 1);
        assert!(periods[0].close.is_none());
    }

    #[test]
    fn test_price_level_forms() {
        let parse = |json: &str| -> Option<u8> {
            serde_json::from_str::<RawPlaceDetail>(json)
                .unwrap()
                .price_level
        };

        assert_eq!(parse(r#"{"priceLevel": 2}"#), Some(2));
        assert_eq!(parse(r#"{"priceLevel": "PRICE_LEVEL_EXPENSIVE"}"#), Some(3));
        assert_eq!(parse(r#"{"priceLevel": "PRICE_LEVEL_UNSPECIFIED"}"#), None);
        assert_eq!(parse(r#"{"priceLevel": 9}"#), None);
        assert_eq!(parse(r#"{"priceLevel": -1}"#), None);
    }

    #[test]
    fn test_search_response_without_places() {
        let response: SearchNearbyResponse = serde_json::from_str("{}").unwrap();
        assert!(response.places.is_none());
    }

    #[test]
    fn test_search_request_shape() {
        let body = SearchNearbyRequest {
            included_types: &["cafe"],
            max_result_count: 10,
            location_restriction: LocationRestriction {
                circle: Circle {
                    center: Center {
                        latitude: 37.7937,
                        longitude: -122.3965,
                    },
                    radius: 500.0,
                },
            },
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "includedTypes": ["cafe"],
                "maxResultCount": 10,
                "locationRestriction": {
                    "circle": {
                        "center": {"latitude": 37.7937, "longitude": -122.3965},
                        "radius": 500.0
                    }
                }
            })
        );
    }
}
