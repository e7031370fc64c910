use axum::extract::State;

use crate::api::{LoginRequest, LoginResponse};
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};

/// POST /auth/login - exchange username and password for a bearer token
///
/// Expected Input:
/// ```json
/// { "username": "user", "password": "password" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiI...", "tokenType": "Bearer", "expiresIn": 3600 }
/// ```
///
/// Blank fields yield 400 with `fields`; bad credentials yield 401 with no body.
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let (username, password) = request.validate()?;

    let principal = state.users.authenticate(&username, &password).map_err(|e| {
        tracing::warn!("Login failed for '{}': {}", username, e);
        ApiError::from(e)
    })?;

    let token = state.tokens.issue(&principal.username, &principal.roles).map_err(|e| {
        tracing::error!("Token generation failed for '{}': {}", principal.username, e);
        ApiError::internal_server_error("Failed to issue token")
    })?;

    tracing::info!("Issued token for '{}'", principal.username);
    Ok(ApiResponse::success(LoginResponse::bearer(token, state.tokens.ttl_seconds())))
}
