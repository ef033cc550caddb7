// handlers/public/mod.rs - Endpoints that need no session

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

/// GET / - Service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "error": false,
        "data": {
            "name": "Nutrical API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "health": "/health (public)",
                "dietary_settings": "/users/dietary-settings (bearer)",
            }
        }
    }))
}

/// GET /health - Store connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => ApiResponse::with_status(
            json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            }),
            StatusCode::OK,
        )
        .into_response(),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            ApiError::service_unavailable(format!("database unavailable: {}", e)).into_response()
        }
    }
}
