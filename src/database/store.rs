use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{DietarySettings, DietarySettingsPatch};
use crate::goals::DefaultGoals;

const TABLE: &str = "nc_dietary_settings";
const RETURNING: &str = "user_id, water_goal, calorie_goal, fat_goal, protein_goal, carbs_goal";

/// Persistent dietary settings, keyed by user. At most one row per user.
#[async_trait]
pub trait DietarySettingsStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<DietarySettings>, DatabaseError>;

    /// Insert the seeded row for `user_id`. If a row already exists it is
    /// returned untouched instead.
    async fn create(&self, user_id: Uuid, goals: &DefaultGoals) -> Result<DietarySettings, DatabaseError>;

    /// Insert with the supplied fields, or update exactly those fields when
    /// the user already has a row. Returns the affected rows.
    async fn upsert_patch(
        &self,
        user_id: Uuid,
        patch: &DietarySettingsPatch,
    ) -> Result<Vec<DietarySettings>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

pub struct PgDietarySettingsStore {
    pool: PgPool,
}

impl PgDietarySettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DietarySettingsStore for PgDietarySettingsStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<DietarySettings>, DatabaseError> {
        let sql = format!("SELECT {} FROM {} WHERE user_id = $1", RETURNING, TABLE);
        let row = sqlx::query_as::<_, DietarySettings>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, user_id: Uuid, goals: &DefaultGoals) -> Result<DietarySettings, DatabaseError> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let sql = format!(
            "INSERT INTO {} (user_id, water_goal, calorie_goal, fat_goal, protein_goal, carbs_goal) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING {}",
            TABLE, RETURNING
        );
        let row = sqlx::query_as::<_, DietarySettings>(&sql)
            .bind(user_id)
            .bind(goals.water_goal)
            .bind(goals.calorie_goal)
            .bind(goals.fat_goal)
            .bind(goals.protein_goal)
            .bind(goals.carbs_goal)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn upsert_patch(
        &self,
        user_id: Uuid,
        patch: &DietarySettingsPatch,
    ) -> Result<Vec<DietarySettings>, DatabaseError> {
        let mut query = build_upsert(user_id, patch);
        let rows = query
            .build_query_as::<DietarySettings>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

/// Columns supplied by `patch`, in bind order.
fn patch_columns(patch: &DietarySettingsPatch) -> Vec<&'static str> {
    let mut columns = Vec::new();
    if patch.water_goal.is_some() {
        columns.push("water_goal");
    }
    if patch.calorie_goal.is_some() {
        columns.push("calorie_goal");
    }
    if patch.protein_goal.is_some() {
        columns.push("protein_goal");
    }
    if patch.fat_goal.is_some() {
        columns.push("fat_goal");
    }
    if patch.carbs_goal.is_some() {
        columns.push("carbs_goal");
    }
    columns
}

fn build_upsert(user_id: Uuid, patch: &DietarySettingsPatch) -> QueryBuilder<'static, Postgres> {
    let columns = patch_columns(patch);

    let mut query = QueryBuilder::<Postgres>::new(format!("INSERT INTO {} (user_id", TABLE));
    for column in &columns {
        query.push(", ").push(*column);
    }
    query.push(") VALUES (");

    let mut values = query.separated(", ");
    values.push_bind(user_id);
    if let Some(v) = patch.water_goal {
        values.push_bind(v);
    }
    if let Some(v) = patch.calorie_goal {
        values.push_bind(v);
    }
    if let Some(v) = patch.protein_goal {
        values.push_bind(v);
    }
    if let Some(v) = patch.fat_goal {
        values.push_bind(v);
    }
    if let Some(v) = patch.carbs_goal {
        values.push_bind(v);
    }

    query.push(") ON CONFLICT (user_id) DO UPDATE SET ");
    if columns.is_empty() {
        // Nothing to change; still return the existing row
        query.push("user_id = EXCLUDED.user_id");
    } else {
        let assignments: Vec<String> = columns
            .iter()
            .map(|c| format!("{c} = EXCLUDED.{c}"))
            .collect();
        query.push(assignments.join(", "));
    }
    query.push(" RETURNING ").push(RETURNING);
    query
}
