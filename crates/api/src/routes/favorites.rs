//! Favorite coffee shop handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use ristretto_core::{Coordinates, PlaceId};

use super::MessageResponse;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{CoffeeShop, NewFavorite};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<CoffeeShop>,
}

/// Body of `POST /favorites`.
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AddFavoriteRequest {
    fn into_new_favorite(self) -> Result<NewFavorite> {
        let (Some(id), Some(name)) = (non_blank(self.id), non_blank(self.name)) else {
            return Err(AppError::BadRequest(
                "Place ID and Name are required".to_string(),
            ));
        };

        let coordinates = Coordinates::new(
            self.latitude.unwrap_or_default(),
            self.longitude.unwrap_or_default(),
        )?;

        Ok(NewFavorite {
            place_id: PlaceId::parse(&id)?,
            name,
            latitude: coordinates.latitude(),
            longitude: coordinates.longitude(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFavoriteQuery {
    pub place_id: Option<String>,
}

pub(super) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `GET /favorites`
#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<FavoritesResponse>> {
    let favorites = state
        .repositories()
        .favorites
        .list(user.user_id)
        .await?
        .into_iter()
        .map(CoffeeShop::from)
        .collect();

    Ok(Json(FavoritesResponse { favorites }))
}

/// `POST /favorites`
///
/// Saving a place twice is not an error.
#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: std::result::Result<Json<AddFavoriteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let Json(body) = body.map_err(|_| AppError::BadRequest("Invalid request body".to_string()))?;
    let favorite = body.into_new_favorite()?;

    let inserted = state
        .repositories()
        .favorites
        .add(user.user_id, &favorite)
        .await?;
    info!(place_id = %favorite.place_id, inserted, "Favorite saved");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Added to favorites")),
    ))
}

/// `DELETE /favorites?placeId=`
#[instrument(skip_all, fields(user_id = %user.user_id))]
pub async fn remove(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RemoveFavoriteQuery>,
) -> Result<Json<MessageResponse>> {
    let place_id = non_blank(query.place_id)
        .ok_or_else(|| AppError::BadRequest("Place ID is required".to_string()))?;
    let place_id = PlaceId::parse(&place_id)?;

    let removed = state
        .repositories()
        .favorites
        .remove(user.user_id, &place_id)
        .await?;

    if !removed {
        return Err(AppError::NotFound("Favorite not found".to_string()));
    }

    info!(place_id = %place_id, "Favorite removed");
    Ok(Json(MessageResponse::new("Removed from favorites")))
}
