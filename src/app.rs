use axum::{extract::DefaultBodyLimit, http::HeaderValue, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, Environment};
use crate::handlers::{protected, public};
use crate::state::AppState;

/// Build the full HTTP router over `state`.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected
        .merge(user_routes())
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes));

    let router = match cors_layer(config) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/users/dietary-settings",
        get(protected::dietary_settings_get).patch(protected::dietary_settings_patch),
    )
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if !config.security.enable_cors {
        return None;
    }
    if config.environment == Environment::Development {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    )
}
