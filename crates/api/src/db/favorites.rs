//! Favorite coffee shop repository.
//!
//! Saving is a single `INSERT ... ON CONFLICT DO NOTHING`, so concurrent or
//! repeated saves of the same place never create a second row.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use ristretto_core::{FavoriteId, PlaceId, UserId};

use super::{FavoriteStore, RepositoryError, stored_place_id};
use crate::models::{Favorite, NewFavorite};

#[derive(sqlx::FromRow)]
struct FavoriteRow {
    id: FavoriteId,
    place_id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    created_at: DateTime<Utc>,
}

impl TryFrom<FavoriteRow> for Favorite {
    type Error = RepositoryError;

    fn try_from(row: FavoriteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            place_id: stored_place_id(&row.place_id)?,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            created_at: row.created_at,
        })
    }
}

/// Repository for favorite database operations.
#[derive(Clone)]
pub struct FavoriteRepository {
    pool: PgPool,
}

impl FavoriteRepository {
    /// Create a new favorite repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteStore for FavoriteRepository {
    #[instrument(skip(self))]
    async fn favorite_place_ids(&self, user_id: UserId) -> Result<HashSet<String>, RepositoryError> {
        let ids: Vec<String> = sqlx::query_scalar(
            r"
            SELECT place_id FROM favorite_coffee_shops WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    #[instrument(skip(self))]
    async fn list(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        let rows: Vec<FavoriteRow> = sqlx::query_as(
            r"
            SELECT id, place_id, name, latitude, longitude, created_at
            FROM favorite_coffee_shops
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Favorite::try_from).collect()
    }

    #[instrument(skip(self, favorite), fields(place_id = %favorite.place_id))]
    async fn add(&self, user_id: UserId, favorite: &NewFavorite) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO favorite_coffee_shops (user_id, place_id, name, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, place_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(favorite.place_id.as_str())
        .bind(&favorite.name)
        .bind(favorite.latitude)
        .bind(favorite.longitude)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn remove(&self, user_id: UserId, place_id: &PlaceId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM favorite_coffee_shops WHERE user_id = $1 AND place_id = $2
            ",
        )
        .bind(user_id)
        .bind(place_id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
