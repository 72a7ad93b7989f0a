//! User repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use ristretto_core::UserId;

use super::{RepositoryError, StoreHealth, UserStore, conflict_on_unique};
use crate::models::{NewUser, User};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    external_id: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            external_id: row.external_id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for user database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    #[instrument(skip(self))]
    async fn find_id_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserId>, RepositoryError> {
        let id: Option<UserId> = sqlx::query_scalar(
            r"
            SELECT id FROM users WHERE external_id = $1
            ",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    #[instrument(skip(self, user), fields(external_id = %user.external_id))]
    async fn create(&self, user: &NewUser) -> Result<UserId, RepositoryError> {
        let id: UserId = sqlx::query_scalar(
            r"
            INSERT INTO users (external_id, email, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&user.external_id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "user"))?;

        Ok(id)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, external_id, email, first_name, last_name, created_at, updated_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}

#[async_trait]
impl StoreHealth for UserRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
