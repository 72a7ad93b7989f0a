//! In-memory storage used by tests.
//!
//! Enforces the same uniqueness rules as the `PostgreSQL` schema (unique
//! `external_id`, unique `(user_id, place_id)` favorites) and can simulate
//! an outage so degradation paths can be exercised.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use ristretto_core::{FavoriteId, PlaceId, UserId, VisitId};

use super::{FavoriteStore, RepositoryError, StoreHealth, UserStore, VisitStore};
use crate::models::{Favorite, NewFavorite, NewUser, NewVisit, User, Visit};

#[derive(Default)]
struct State {
    users: Vec<User>,
    favorites: Vec<(UserId, Favorite)>,
    visits: Vec<(UserId, Visit)>,
    next_id: i32,
}

impl State {
    const fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Thread-safe in-memory implementation of every store trait.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail (`true`) or succeed again (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of provisioned users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    /// Number of favorites saved by a user.
    #[must_use]
    pub fn favorite_count(&self, user_id: UserId) -> usize {
        self.lock()
            .favorites
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_id_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<UserId>, RepositoryError> {
        self.check_available()?;
        Ok(self
            .lock()
            .users
            .iter()
            .find(|user| user.external_id == external_id)
            .map(|user| user.id))
    }

    async fn create(&self, user: &NewUser) -> Result<UserId, RepositoryError> {
        self.check_available()?;
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|existing| existing.external_id == user.external_id)
        {
            return Err(RepositoryError::Conflict("user already exists".to_owned()));
        }

        let id = UserId::new(state.next_id());
        let now = Utc::now();
        state.users.push(User {
            id,
            external_id: user.external_id.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        self.check_available()?;
        Ok(self.lock().users.iter().find(|user| user.id == id).cloned())
    }
}

#[async_trait]
impl FavoriteStore for MemoryStore {
    async fn favorite_place_ids(&self, user_id: UserId) -> Result<HashSet<String>, RepositoryError> {
        self.check_available()?;
        Ok(self
            .lock()
            .favorites
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, favorite)| favorite.place_id.as_str().to_owned())
            .collect())
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<Favorite>, RepositoryError> {
        self.check_available()?;
        // Insertion order is creation order, so reverse for newest first
        Ok(self
            .lock()
            .favorites
            .iter()
            .rev()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, favorite)| favorite.clone())
            .collect())
    }

    async fn add(&self, user_id: UserId, favorite: &NewFavorite) -> Result<bool, RepositoryError> {
        self.check_available()?;
        let mut state = self.lock();
        if state
            .favorites
            .iter()
            .any(|(owner, existing)| *owner == user_id && existing.place_id == favorite.place_id)
        {
            return Ok(false);
        }

        let id = FavoriteId::new(state.next_id());
        state.favorites.push((
            user_id,
            Favorite {
                id,
                place_id: favorite.place_id.clone(),
                name: favorite.name.clone(),
                latitude: favorite.latitude,
                longitude: favorite.longitude,
                created_at: Utc::now(),
            },
        ));
        Ok(true)
    }

    async fn remove(&self, user_id: UserId, place_id: &PlaceId) -> Result<bool, RepositoryError> {
        self.check_available()?;
        let mut state = self.lock();
        let before = state.favorites.len();
        state
            .favorites
            .retain(|(owner, favorite)| !(*owner == user_id && &favorite.place_id == place_id));
        Ok(state.favorites.len() < before)
    }
}

#[async_trait]
impl VisitStore for MemoryStore {
    async fn list_recent(&self, user_id: UserId, limit: i64) -> Result<Vec<Visit>, RepositoryError> {
        self.check_available()?;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .lock()
            .visits
            .iter()
            .rev()
            .filter(|(owner, _)| *owner == user_id)
            .take(limit)
            .map(|(_, visit)| visit.clone())
            .collect())
    }

    async fn record(&self, user_id: UserId, visit: &NewVisit) -> Result<Visit, RepositoryError> {
        self.check_available()?;
        let mut state = self.lock();
        let recorded = Visit {
            id: VisitId::new(state.next_id()),
            place_id: visit.place_id.clone(),
            name: visit.name.clone(),
            visited_at: Utc::now(),
        };
        state.visits.push((user_id, recorded.clone()));
        Ok(recorded)
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}
