// handlers/protected/users/dietary_settings.rs - /users/dietary-settings

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;

use crate::database::models::{DietarySettings, DietarySettingsPatch};
use crate::error::ApiError;
use crate::goals::compute_default_goals;
use crate::middleware::{authenticate, ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /users/dietary-settings - Current user's goals
///
/// The first read for a user seeds the row from their biometrics (or the
/// fallback goals) and returns it.
pub async fn get(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<DietarySettings> {
    let session = authenticate(&state, &headers).await?;
    let user_id = session.user.id;

    if let Some(settings) = state.store.find_by_user(user_id).await? {
        return Ok(ApiResponse::success(settings));
    }

    let goals = compute_default_goals(&session.user, Utc::now().date_naive());
    tracing::info!(
        %user_id,
        calorie_goal = %goals.calorie_goal,
        "Seeding default dietary settings"
    );

    let settings = state.store.create(user_id, &goals).await?;
    Ok(ApiResponse::success(settings))
}

/// PATCH /users/dietary-settings - Partial update
///
/// Body: any subset of `waterGoal`, `calorieGoal`, `proteinGoal`, `fatGoal`,
/// `carbsGoal`, all numbers. The body is validated before the token is
/// looked at. Creates the row when the user has none yet.
pub async fn patch(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<DietarySettingsPatch>, JsonRejection>,
) -> ApiResult<Vec<DietarySettings>> {
    let Json(patch) = payload?;
    let session = authenticate(&state, &headers).await?;

    let rows = state.store.upsert_patch(session.user.id, &patch).await?;
    if rows.is_empty() {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::debug!(user_id = %session.user.id, "Updated dietary settings");
    Ok(ApiResponse::success(rows))
}
