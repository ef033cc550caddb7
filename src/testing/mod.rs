//! In-memory collaborators for exercising handlers without Postgres.
//!
//! Used by unit tests and by the integration tests under `tests/`, which is
//! why this module is not gated on `cfg(test)`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims, JwtSessionValidator, UserDirectory};
use crate::database::manager::DatabaseError;
use crate::database::models::{DietarySettings, DietarySettingsPatch, User};
use crate::database::store::DietarySettingsStore;
use crate::goals::DefaultGoals;
use crate::state::AppState;

pub const TEST_JWT_SECRET: &str = "nutrical-test-secret";

/// Settings rows in a map, with a counter of mutating calls.
#[derive(Default)]
pub struct MemoryDietarySettingsStore {
    rows: RwLock<HashMap<Uuid, DietarySettings>>,
    writes: AtomicUsize,
}

impl MemoryDietarySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, settings: DietarySettings) {
        self.rows
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(settings.user_id, settings);
    }

    pub fn get(&self, user_id: Uuid) -> Option<DietarySettings> {
        self.rows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `create` / `upsert_patch` calls that reached the store.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DietarySettingsStore for MemoryDietarySettingsStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<DietarySettings>, DatabaseError> {
        Ok(self.get(user_id))
    }

    async fn create(&self, user_id: Uuid, goals: &DefaultGoals) -> Result<DietarySettings, DatabaseError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        let row = rows.entry(user_id).or_insert_with(|| DietarySettings {
            user_id,
            water_goal: goals.water_goal,
            calorie_goal: goals.calorie_goal,
            fat_goal: goals.fat_goal,
            protein_goal: goals.protein_goal,
            carbs_goal: goals.carbs_goal,
        });
        Ok(row.clone())
    }

    async fn upsert_patch(
        &self,
        user_id: Uuid,
        patch: &DietarySettingsPatch,
    ) -> Result<Vec<DietarySettings>, DatabaseError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        let row = rows
            .entry(user_id)
            .or_insert_with(|| DietarySettings::with_defaults(user_id));
        row.apply(patch);
        Ok(vec![row.clone()])
    }
}

/// A store whose every call fails, for the 500 paths.
pub struct UnavailableStore;

#[async_trait]
impl DietarySettingsStore for UnavailableStore {
    async fn find_by_user(&self, _user_id: Uuid) -> Result<Option<DietarySettings>, DatabaseError> {
        Err(DatabaseError::QueryError("connection refused".to_string()))
    }

    async fn create(&self, _user_id: Uuid, _goals: &DefaultGoals) -> Result<DietarySettings, DatabaseError> {
        Err(DatabaseError::QueryError("connection refused".to_string()))
    }

    async fn upsert_patch(
        &self,
        _user_id: Uuid,
        _patch: &DietarySettingsPatch,
    ) -> Result<Vec<DietarySettings>, DatabaseError> {
        Err(DatabaseError::QueryError("connection refused".to_string()))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Err(DatabaseError::QueryError("connection refused".to_string()))
    }
}

/// User profiles in a map.
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: HashMap<Uuid, User>,
}

impl MemoryUserDirectory {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id, u)).collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.get(&id).cloned())
    }
}

/// Application state over `store`, accepting tokens for `users`.
pub fn test_state(store: Arc<dyn DietarySettingsStore>, users: impl IntoIterator<Item = User>) -> AppState {
    let sessions = JwtSessionValidator::new(MemoryUserDirectory::with_users(users), TEST_JWT_SECRET);
    AppState::new(store, Arc::new(sessions))
}

/// Bearer token for `user_id` signed with [`TEST_JWT_SECRET`].
pub fn test_token(user_id: Uuid) -> String {
    generate_jwt(&Claims::new(user_id, 1), TEST_JWT_SECRET).expect("test secret is non-empty")
}
