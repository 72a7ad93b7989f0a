//! Visit history repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use ristretto_core::{UserId, VisitId};

use super::{RepositoryError, VisitStore, stored_place_id};
use crate::models::{NewVisit, Visit};

#[derive(sqlx::FromRow)]
struct VisitRow {
    id: VisitId,
    place_id: String,
    name: String,
    visited_at: DateTime<Utc>,
}

impl TryFrom<VisitRow> for Visit {
    type Error = RepositoryError;

    fn try_from(row: VisitRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            place_id: stored_place_id(&row.place_id)?,
            name: row.name,
            visited_at: row.visited_at,
        })
    }
}

/// Repository for visit database operations.
#[derive(Clone)]
pub struct VisitRepository {
    pool: PgPool,
}

impl VisitRepository {
    /// Create a new visit repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VisitStore for VisitRepository {
    #[instrument(skip(self))]
    async fn list_recent(&self, user_id: UserId, limit: i64) -> Result<Vec<Visit>, RepositoryError> {
        let rows: Vec<VisitRow> = sqlx::query_as(
            r"
            SELECT id, place_id, name, visited_at
            FROM visits
            WHERE user_id = $1
            ORDER BY visited_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Visit::try_from).collect()
    }

    #[instrument(skip(self, visit), fields(place_id = %visit.place_id))]
    async fn record(&self, user_id: UserId, visit: &NewVisit) -> Result<Visit, RepositoryError> {
        let row: VisitRow = sqlx::query_as(
            r"
            INSERT INTO visits (user_id, place_id, name)
            VALUES ($1, $2, $3)
            RETURNING id, place_id, name, visited_at
            ",
        )
        .bind(user_id)
        .bind(visit.place_id.as_str())
        .bind(&visit.name)
        .fetch_one(&self.pool)
        .await?;

        Visit::try_from(row)
    }
}
