use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;

use crate::goals::DEFAULT_WATER_GOAL_ML;

/// Per-user nutrition goals, one row per user.
///
/// Macro and calorie goals are `NUMERIC` in Postgres and serialize as decimal
/// strings so nothing downstream sees float drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DietarySettings {
    pub user_id: Uuid,
    /// Millilitres
    pub water_goal: i32,
    pub calorie_goal: Decimal,
    pub fat_goal: Decimal,
    pub protein_goal: Decimal,
    pub carbs_goal: Decimal,
}

impl DietarySettings {
    /// Row as the database would create it for `user_id` with no explicit values,
    /// matching the column defaults in the migration.
    pub fn with_defaults(user_id: Uuid) -> Self {
        Self {
            user_id,
            water_goal: DEFAULT_WATER_GOAL_ML,
            calorie_goal: Decimal::new(2000, 0),
            fat_goal: Decimal::new(400, 0),
            protein_goal: Decimal::new(400, 0),
            carbs_goal: Decimal::new(1200, 0),
        }
    }

    /// Overwrite exactly the fields present in `patch`.
    pub fn apply(&mut self, patch: &DietarySettingsPatch) {
        if let Some(v) = patch.water_goal {
            self.water_goal = v;
        }
        if let Some(v) = patch.calorie_goal {
            self.calorie_goal = v;
        }
        if let Some(v) = patch.protein_goal {
            self.protein_goal = v;
        }
        if let Some(v) = patch.fat_goal {
            self.fat_goal = v;
        }
        if let Some(v) = patch.carbs_goal {
            self.carbs_goal = v;
        }
    }
}

/// Body of `PATCH /users/dietary-settings`.
///
/// Every field is optional, but when present it must be a JSON number.
/// Unknown fields are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DietarySettingsPatch {
    #[serde(default, deserialize_with = "present_integer", skip_serializing_if = "Option::is_none")]
    pub water_goal: Option<i32>,
    #[serde(
        default,
        deserialize_with = "present_number",
        serialize_with = "as_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub calorie_goal: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "present_number",
        serialize_with = "as_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub protein_goal: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "present_number",
        serialize_with = "as_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub fat_goal: Option<Decimal>,
    #[serde(
        default,
        deserialize_with = "present_number",
        serialize_with = "as_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub carbs_goal: Option<Decimal>,
}

impl DietarySettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.water_goal.is_none()
            && self.calorie_goal.is_none()
            && self.protein_goal.is_none()
            && self.fat_goal.is_none()
            && self.carbs_goal.is_none()
    }
}

// `null` is not "absent": only a missing key leaves the field unset.
fn present_integer<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    i32::deserialize(deserializer).map(Some)
}

fn present_number<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let n = f64::deserialize(deserializer)?;
    Decimal::try_from(n)
        .map(|d| Some(d.normalize()))
        .map_err(|e| D::Error::custom(format!("{} is not a representable goal: {}", n, e)))
}

fn as_number<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value.and_then(|d| d.to_f64()) {
        Some(n) => serializer.serialize_f64(n),
        None => serializer.serialize_none(),
    }
}
