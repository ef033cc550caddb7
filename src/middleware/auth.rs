use axum::http::HeaderMap;

use crate::auth::Session;
use crate::error::ApiError;
use crate::state::AppState;

/// Resolve the request's bearer token to a session.
///
/// Missing header, malformed header and unknown/expired token all map to the
/// same 401 so callers cannot tell them apart.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Session, ApiError> {
    let token = extract_bearer_token(headers).map_err(|msg| {
        tracing::debug!("Authentication failed: {}", msg);
        ApiError::unauthorized()
    })?;

    match state.sessions.validate(token).await? {
        Some(session) => Ok(session),
        None => {
            tracing::debug!("Authentication failed: no session for token");
            Err(ApiError::unauthorized())
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        let token = token.trim();
        if token.is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token)
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
