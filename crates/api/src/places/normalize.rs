//! Conversion of provider payloads into client-facing records.
//!
//! Every function here is total: any combination of missing provider fields
//! maps to a defined output.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use super::types::{RawOpeningHours, RawPhoto, RawPlace, RawPlaceDetail, RawTimePoint};
use crate::config::PlacesConfig;
use crate::models::{CoffeeShop, CoffeeShopDetails};

/// Internal schedule order. Index 0 is Monday.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Close time rendered for periods without a close point.
const OPEN_ALL_DAY_CLOSE: &str = "24:00";

/// Requested photo dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PhotoSize {
    pub max_width_px: Option<u32>,
    pub max_height_px: Option<u32>,
}

impl PhotoSize {
    /// Width used when neither dimension is given.
    pub const DEFAULT_MAX_WIDTH_PX: u32 = 400;

    /// The size actually requested from the provider.
    #[must_use]
    pub const fn resolved(self) -> Self {
        match (self.max_width_px, self.max_height_px) {
            (None, None) => Self {
                max_width_px: Some(Self::DEFAULT_MAX_WIDTH_PX),
                max_height_px: None,
            },
            _ => self,
        }
    }
}

/// Builds fetchable media URLs from photo resource names.
#[derive(Clone)]
pub struct PhotoUrlBuilder {
    base_url: Url,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for PhotoUrlBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoUrlBuilder")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl PhotoUrlBuilder {
    #[must_use]
    pub fn new(base_url: &Url, api_key: Option<SecretString>) -> Self {
        Self {
            base_url: base_url.clone(),
            api_key,
        }
    }

    /// URL for one photo, or `None` if the name is blank.
    ///
    /// Each `/`-separated part of the name becomes one escaped path segment.
    #[must_use]
    pub fn url(&self, name: &str, size: PhotoSize) -> Option<String> {
        let name = name.trim().trim_matches('/');
        if name.is_empty() {
            return None;
        }

        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(name.split('/').filter(|segment| !segment.is_empty()))
            .push("media");
        {
            let size = size.resolved();
            let mut query = url.query_pairs_mut();
            if let Some(key) = &self.api_key {
                query.append_pair("key", key.expose_secret());
            }
            if let Some(width) = size.max_width_px {
                query.append_pair("maxWidthPx", &width.to_string());
            }
            if let Some(height) = size.max_height_px {
                query.append_pair("maxHeightPx", &height.to_string());
            }
        }
        Some(url.into())
    }
}

/// Converts raw provider records into [`CoffeeShop`] and [`CoffeeShopDetails`].
///
/// Favorite flags are left `false`; the favorites overlay sets them.
#[derive(Debug, Clone)]
pub struct PlaceNormalizer {
    photos: PhotoUrlBuilder,
    photo_size: PhotoSize,
}

impl PlaceNormalizer {
    #[must_use]
    pub const fn new(photos: PhotoUrlBuilder, photo_size: PhotoSize) -> Self {
        Self { photos, photo_size }
    }

    /// Normalizer configured from the provider settings.
    #[must_use]
    pub fn from_config(config: &PlacesConfig) -> Self {
        Self::new(
            PhotoUrlBuilder::new(&config.base_url, config.api_key.clone()),
            PhotoSize {
                max_width_px: config.photo_max_width_px,
                max_height_px: config.photo_max_height_px,
            },
        )
    }

    /// A nearby-search entry, or `None` if the provider gave no id.
    #[must_use]
    pub fn place(&self, raw: RawPlace) -> Option<CoffeeShop> {
        let id = raw.id.filter(|id| !id.is_empty())?;
        let location = raw.location.unwrap_or_default();

        Some(CoffeeShop {
            id,
            name: raw
                .display_name
                .and_then(|name| name.text)
                .unwrap_or_default(),
            latitude: location.latitude.unwrap_or_default(),
            longitude: location.longitude.unwrap_or_default(),
            is_favorite: false,
        })
    }

    /// Full details. Falls back to `requested_id` when the payload has no id.
    #[must_use]
    pub fn detail(&self, raw: RawPlaceDetail, requested_id: &str) -> CoffeeShopDetails {
        let location = raw.location.unwrap_or_default();

        CoffeeShopDetails {
            id: raw
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| requested_id.to_string()),
            name: raw
                .display_name
                .and_then(|name| name.text)
                .unwrap_or_default(),
            latitude: location.latitude.unwrap_or_default(),
            longitude: location.longitude.unwrap_or_default(),
            address: non_empty(raw.formatted_address),
            phone_number: non_empty(raw.international_phone_number),
            website: non_empty(raw.website_uri),
            rating: raw.rating.filter(|rating| rating.is_finite()),
            price_level: raw.price_level,
            is_favorite: false,
            opening_hours: normalize_hours(raw.current_opening_hours.as_ref()),
            photos: self.normalize_photos(raw.photos.as_deref()),
        }
    }

    /// Media URLs for every named photo, in provider order.
    #[must_use]
    pub fn normalize_photos(&self, photos: Option<&[RawPhoto]>) -> Vec<String> {
        normalize_photos(&self.photos, photos, self.photo_size)
    }
}

/// Media URLs for every named photo. Blank names are skipped.
#[must_use]
pub fn normalize_photos(
    builder: &PhotoUrlBuilder,
    photos: Option<&[RawPhoto]>,
    size: PhotoSize,
) -> Vec<String> {
    photos
        .unwrap_or_default()
        .iter()
        .filter_map(|photo| photo.name.as_deref())
        .filter_map(|name| builder.url(name, size))
        .collect()
}

/// Weekly schedule, Monday first.
///
/// Returns an empty list when there is no hours block or it has no period
/// list, and exactly seven entries otherwise. Each internal day takes the
/// first provider period that opens on that day (provider day 0 is Sunday).
#[must_use]
pub fn normalize_hours(hours: Option<&RawOpeningHours>) -> Vec<String> {
    let Some(periods) = hours.and_then(|hours| hours.periods.as_deref()) else {
        return Vec::new();
    };

    WEEKDAYS
        .iter()
        .zip(1u8..)
        .map(|(day_name, index)| {
            let provider_day = index % 7;
            periods
                .iter()
                .find_map(|period| {
                    let open = period.open.as_ref()?;
                    (open.day == Some(provider_day)).then(|| {
                        let close = period
                            .close
                            .as_ref()
                            .map_or_else(|| OPEN_ALL_DAY_CLOSE.to_string(), format_time_point);
                        format!("{day_name}: {} - {close}", format_time_point(open))
                    })
                })
                .unwrap_or_else(|| format!("{day_name}: Closed"))
        })
        .collect()
}

/// `HH:MM` for a time point given either as a `time` string or hour/minute.
fn format_time_point(point: &RawTimePoint) -> String {
    match &point.time {
        Some(time) => format_time(time),
        None => format_time(&format!(
            "{:02}{:02}",
            point.hour.unwrap_or(0),
            point.minute.unwrap_or(0)
        )),
    }
}

/// `HHMM` to `HH:MM`. Anything that is not four ASCII digits passes through.
fn format_time(time: &str) -> String {
    if time.len() != 4 || !time.bytes().all(|b| b.is_ascii_digit()) {
        return time.to_string();
    }
    match (time.get(..2), time.get(2..)) {
        (Some(hours), Some(minutes)) => format!("{hours}:{minutes}"),
        _ => time.to_string(),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::places::types::RawPeriod;

    fn point(day: u8, time: &str) -> RawTimePoint {
        RawTimePoint {
            day: Some(day),
            time: Some(time.to_string()),
            ..RawTimePoint::default()
        }
    }

    fn period(day: u8, open: &str, close: Option<&str>) -> RawPeriod {
        RawPeriod {
            open: Some(point(day, open)),
            close: close.map(|c| point(day, c)),
        }
    }

    fn hours(periods: Vec<RawPeriod>) -> RawOpeningHours {
        RawOpeningHours {
            periods: Some(periods),
        }
    }

    fn builder(key: Option<&str>) -> PhotoUrlBuilder {
        PhotoUrlBuilder::new(
            &Url::parse("https://places.googleapis.com/v1").unwrap(),
            key.map(SecretString::from),
        )
    }

    fn photo(name: Option<&str>) -> RawPhoto {
        RawPhoto {
            name: name.map(String::from),
        }
    }

    #[test]
    fn test_hours_absent_block_is_empty() {
        assert!(normalize_hours(None).is_empty());
        assert!(normalize_hours(Some(&RawOpeningHours::default())).is_empty());
    }

    #[test]
    fn test_hours_empty_periods_are_all_closed() {
        let schedule = normalize_hours(Some(&hours(vec![])));
        assert_eq!(schedule.len(), 7);
        assert_eq!(schedule[0], "Monday: Closed");
        assert_eq!(schedule[6], "Sunday: Closed");
    }

    #[test]
    fn test_hours_remap_sunday_to_last() {
        let schedule = normalize_hours(Some(&hours(vec![
            period(0, "1000", Some("1600")),
            period(1, "0700", Some("1830")),
            period(6, "0800", Some("2000")),
        ])));

        assert_eq!(
            schedule,
            vec![
                "Monday: 07:00 - 18:30",
                "Tuesday: Closed",
                "Wednesday: Closed",
                "Thursday: Closed",
                "Friday: Closed",
                "Saturday: 08:00 - 20:00",
                "Sunday: 10:00 - 16:00",
            ]
        );
    }

    #[test]
    fn test_hours_missing_close_is_24_hours() {
        let schedule = normalize_hours(Some(&hours(vec![period(3, "0000", None)])));
        assert_eq!(schedule[2], "Wednesday: 00:00 - 24:00");
    }

    #[test]
    fn test_hours_first_period_wins() {
        let schedule = normalize_hours(Some(&hours(vec![
            period(2, "0700", Some("1100")),
            period(2, "1300", Some("1700")),
        ])));
        assert_eq!(schedule[1], "Tuesday: 07:00 - 11:00");
    }

    #[test]
    fn test_hours_malformed_times_pass_through() {
        let schedule = normalize_hours(Some(&hours(vec![
            period(1, "730", Some("17:00")),
            period(2, "", Some("ab12")),
        ])));
        assert_eq!(schedule[0], "Monday: 730 - 17:00");
        assert_eq!(schedule[1], "Tuesday:  - ab12");
    }

    #[test]
    fn test_hours_from_hour_and_minute() {
        let open = RawTimePoint {
            day: Some(5),
            hour: Some(6),
            minute: Some(30),
            ..RawTimePoint::default()
        };
        let close = RawTimePoint {
            day: Some(5),
            hour: Some(14),
            ..RawTimePoint::default()
        };
        let schedule = normalize_hours(Some(&hours(vec![RawPeriod {
            open: Some(open),
            close: Some(close),
        }])));
        assert_eq!(schedule[4], "Friday: 06:30 - 14:00");
    }

    #[test]
    fn test_hours_skip_periods_without_open() {
        let schedule = normalize_hours(Some(&hours(vec![RawPeriod {
            open: None,
            close: Some(point(1, "1700")),
        }])));
        assert_eq!(schedule[0], "Monday: Closed");
    }

    #[test]
    fn test_hours_always_seven_entries() {
        for day in 0..7u8 {
            let schedule = normalize_hours(Some(&hours(vec![period(day, "0900", None)])));
            assert_eq!(schedule.len(), 7);
            for (entry, name) in schedule.iter().zip(WEEKDAYS) {
                assert!(entry.starts_with(&format!("{name}: ")));
                assert!(
                    entry.ends_with("Closed") || entry.ends_with("09:00 - 24:00"),
                    "unexpected entry {entry}"
                );
            }
        }
    }

    #[test]
    fn test_photos_none_and_empty() {
        let b = builder(None);
        assert!(normalize_photos(&b, None, PhotoSize::default()).is_empty());
        assert!(normalize_photos(&b, Some(&[]), PhotoSize::default()).is_empty());
    }

    #[test]
    fn test_photos_skip_blank_names() {
        let b = builder(None);
        let photos = [photo(None), photo(Some("")), photo(Some("places/abc/photos/1"))];
        let urls = normalize_photos(&b, Some(&photos), PhotoSize::default());
        assert_eq!(
            urls,
            vec!["https://places.googleapis.com/v1/places/abc/photos/1/media?maxWidthPx=400"]
        );
    }

    #[test]
    fn test_photos_include_name_and_size() {
        let b = builder(Some("k3y"));
        let photos = [
            photo(Some("places/abc/photos/1")),
            photo(Some("places/abc/photos/2")),
        ];
        let size = PhotoSize {
            max_width_px: Some(800),
            max_height_px: Some(600),
        };

        let urls = normalize_photos(&b, Some(&photos), size);
        assert_eq!(urls.len(), 2);
        for (url, name) in urls.iter().zip(["places/abc/photos/1", "places/abc/photos/2"]) {
            assert!(url.contains(name));
            assert!(url.contains("maxWidthPx=800"));
            assert!(url.contains("maxHeightPx=600"));
            assert!(url.contains("key=k3y"));
        }
    }

    #[test]
    fn test_photo_name_is_escaped_into_the_path() {
        let url = builder(Some("k3y"))
            .url("places/a?b#c/photos/1", PhotoSize::default())
            .unwrap();
        assert_eq!(
            url,
            "https://places.googleapis.com/v1/places/a%3Fb%23c/photos/1/media?key=k3y&maxWidthPx=400"
        );

        let parsed = Url::parse(&url).unwrap();
        assert!(parsed.fragment().is_none());
        assert!(parsed.path().ends_with("/photos/1/media"));
    }

    #[test]
    fn test_photo_base_with_trailing_slash() {
        let b = PhotoUrlBuilder::new(
            &Url::parse("https://places.googleapis.com/v1/").unwrap(),
            None,
        );
        assert_eq!(
            b.url("places/abc/photos/1", PhotoSize::default()).unwrap(),
            "https://places.googleapis.com/v1/places/abc/photos/1/media?maxWidthPx=400"
        );
    }

    #[test]
    fn test_photo_height_only_has_no_default_width() {
        let url = builder(None)
            .url(
                "places/abc/photos/1",
                PhotoSize {
                    max_width_px: None,
                    max_height_px: Some(300),
                },
            )
            .unwrap();
        assert!(url.ends_with("/media?maxHeightPx=300"));
    }

    #[test]
    fn test_place_without_id_is_dropped() {
        let normalizer = PlaceNormalizer::new(builder(None), PhotoSize::default());
        assert!(normalizer.place(RawPlace::default()).is_none());
    }

    #[test]
    fn test_place_defaults_missing_fields() {
        let normalizer = PlaceNormalizer::new(builder(None), PhotoSize::default());
        let shop = normalizer
            .place(RawPlace {
                id: Some("abc".to_string()),
                ..RawPlace::default()
            })
            .unwrap();

        assert_eq!(shop.id, "abc");
        assert_eq!(shop.name, "");
        assert!(shop.latitude.abs() < f64::EPSILON);
        assert!(!shop.is_favorite);
    }

    #[test]
    fn test_detail_with_null_hours_and_photos() {
        let normalizer = PlaceNormalizer::new(builder(None), PhotoSize::default());
        let raw: RawPlaceDetail = serde_json::from_str(
            r#"{
                "id": "abc",
                "displayName": {"text": "Blue Bottle"},
                "formattedAddress": "",
                "rating": 4.6,
                "priceLevel": "PRICE_LEVEL_MODERATE",
                "currentOpeningHours": null,
                "photos": null
            }"#,
        )
        .unwrap();

        let details = normalizer.detail(raw, "abc");
        assert_eq!(details.name, "Blue Bottle");
        assert!(details.address.is_none());
        assert_eq!(details.rating, Some(4.6));
        assert_eq!(details.price_level, Some(2));
        assert!(details.opening_hours.is_empty());
        assert!(details.photos.is_empty());
    }

    #[test]
    fn test_detail_falls_back_to_requested_id() {
        let normalizer = PlaceNormalizer::new(builder(None), PhotoSize::default());
        let details = normalizer.detail(RawPlaceDetail::default(), "requested");
        assert_eq!(details.id, "requested");
    }
}
