use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{AuthUser, ROLE_USER};
use crate::error::ApiError;

/// Runs on every request. A verified bearer token attaches an `AuthUser`
/// to the request; anything else leaves the request anonymous for the
/// route guards to reject.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(token) = extract_bearer_token(request.headers()) {
        match state.tokens.verify(token) {
            Ok(claims) => {
                let auth_user = AuthUser::from(claims);
                request.extensions_mut().insert(auth_user);
            }
            Err(e) => {
                tracing::debug!("Ignoring bearer token on {} {}: {}", request.method(), request.uri().path(), e);
            }
        }
    }

    next.run(request).await
}

/// Route guard for `/api/*`: the caller must be authenticated and hold `USER`.
pub async fn require_user_role(request: Request, next: Next) -> Result<Response, ApiError> {
    authorize(&request, ROLE_USER)?;
    Ok(next.run(request).await)
}

fn authorize(request: &Request, role: &str) -> Result<(), ApiError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.has_role(role) => Ok(()),
        Some(user) => {
            tracing::warn!("User '{}' lacks role {} for {}", user.username, role, request.uri().path());
            Err(ApiError::Forbidden)
        }
        None => Err(ApiError::Forbidden),
    }
}

/// Token from `Authorization: Bearer <token>`, if present and non-empty.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(ApiError::Forbidden)
    }
}
