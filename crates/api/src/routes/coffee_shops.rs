//! Coffee shop search and detail handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ristretto_core::{Coordinates, NearbySearch, PlaceId};

use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{CoffeeShop, CoffeeShopDetails};
use crate::state::AppState;

/// Raw nearby-search query parameters.
///
/// Kept as strings so that a malformed value is reported as a 400 rather
/// than silently replaced by its default.
#[derive(Debug, Default, Deserialize)]
pub struct NearbyQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub max: Option<String>,
}

impl NearbyQuery {
    /// Validate the parameters, filling in defaults for absent ones.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if a value does not parse or is out of range.
    pub fn into_search(self) -> Result<NearbySearch> {
        let latitude = parse_param(self.lat.as_deref(), "lat")?
            .unwrap_or(NearbySearch::DEFAULT_LATITUDE);
        let longitude = parse_param(self.lng.as_deref(), "lng")?
            .unwrap_or(NearbySearch::DEFAULT_LONGITUDE);
        let radius = parse_param(self.radius.as_deref(), "radius")?
            .unwrap_or(NearbySearch::DEFAULT_RADIUS_METERS);
        let max = parse_param(self.max.as_deref(), "max")?
            .unwrap_or(NearbySearch::DEFAULT_MAX_RESULTS);

        Ok(NearbySearch::new(
            Coordinates::new(latitude, longitude)?,
            radius,
            max,
        )?)
    }
}

/// Parse an optional query value. Blank values count as absent.
fn parse_param<T: std::str::FromStr>(value: Option<&str>, name: &str) -> Result<Option<T>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid {name} parameter"))),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeShopsResponse {
    pub coffee_shops: Vec<CoffeeShop>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeShopResponse {
    pub coffee_shop: CoffeeShopDetails,
}

/// `GET /coffee_shops`
#[instrument(skip(state, user, query), fields(user_id = %user.user_id))]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<CoffeeShopsResponse>> {
    let search = query.into_search()?;
    let coffee_shops = state
        .coffee_shops()
        .list_nearby(&search, user.user_id)
        .await?;

    Ok(Json(CoffeeShopsResponse { coffee_shops }))
}

/// `GET /coffee_shops/{place_id}`
#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(place_id): Path<String>,
) -> Result<Json<CoffeeShopResponse>> {
    let place_id = PlaceId::parse(&place_id)?;
    let coffee_shop = state
        .coffee_shops()
        .get_detail(&place_id, user.user_id)
        .await?;

    Ok(Json(CoffeeShopResponse { coffee_shop }))
}
