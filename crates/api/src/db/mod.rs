//! Storage access for the API.
//!
//! # Tables
//!
//! - `users` - Local users keyed by identity provider subject (`external_id` is unique)
//! - `favorite_coffee_shops` - Saved places, unique per `(user_id, place_id)`
//! - `visits` - Append-only visit history
//!
//! Handlers and services never see a pool directly. They receive the
//! [`Repositories`] bundle, whose members are trait objects so tests can
//! substitute [`memory::MemoryStore`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p ristretto-cli -- migrate
//! ```

pub mod favorites;
pub mod memory;
pub mod users;
pub mod visits;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use ristretto_core::{PlaceId, UserId};

use crate::models::{Favorite, NewFavorite, NewUser, NewVisit, User, Visit};

pub use favorites::FavoriteRepository;
pub use memory::MemoryStore;
pub use users::UserRepository;
pub use visits::VisitRepository;

/// Most visits returned by a history read.
pub const VISIT_HISTORY_LIMIT: i64 = 50;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate external id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// User lookup and provisioning.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find the local id for an identity provider subject.
    async fn find_id_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserId>, RepositoryError>;

    /// Insert a new user.
    ///
    /// Returns `RepositoryError::Conflict` if the external id already exists.
    async fn create(&self, user: &NewUser) -> Result<UserId, RepositoryError>;

    /// Load a user's stored profile.
    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
}

/// Favorite place reads and writes.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Place ids the user has saved.
    async fn favorite_place_ids(&self, user_id: UserId) -> Result<HashSet<String>, RepositoryError>;

    /// Saved places, newest first.
    async fn list(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError>;

    /// Save a place. Saving an already-saved place is a no-op.
    ///
    /// Returns `true` if a row was inserted.
    async fn add(&self, user_id: UserId, favorite: &NewFavorite) -> Result<bool, RepositoryError>;

    /// Remove a saved place. Returns `false` if it was not saved.
    async fn remove(&self, user_id: UserId, place_id: &PlaceId) -> Result<bool, RepositoryError>;
}

/// Visit history reads and writes.
#[async_trait]
pub trait VisitStore: Send + Sync {
    /// Most recent visits first, at most `limit`.
    async fn list_recent(&self, user_id: UserId, limit: i64) -> Result<Vec<Visit>, RepositoryError>;

    /// Append a visit stamped with the current time.
    async fn record(&self, user_id: UserId, visit: &NewVisit) -> Result<Visit, RepositoryError>;
}

/// Storage connectivity probe for readiness checks.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// The storage handles passed to services and handlers.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserStore>,
    pub favorites: Arc<dyn FavoriteStore>,
    pub visits: Arc<dyn VisitStore>,
    pub health: Arc<dyn StoreHealth>,
}

impl Repositories {
    /// `PostgreSQL`-backed repositories sharing one pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        let users = Arc::new(UserRepository::new(pool.clone()));
        Self {
            users: users.clone(),
            favorites: Arc::new(FavoriteRepository::new(pool.clone())),
            visits: Arc::new(VisitRepository::new(pool)),
            health: users,
        }
    }

    /// Repositories backed by a single in-memory store.
    #[must_use]
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            favorites: store.clone(),
            visits: store.clone(),
            health: store,
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse a place id read back from storage.
fn stored_place_id(raw: &str) -> Result<PlaceId, RepositoryError> {
    PlaceId::parse(raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid place id in database: {e}"))
    })
}

/// Map a unique-constraint violation to `RepositoryError::Conflict`.
fn conflict_on_unique(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}
