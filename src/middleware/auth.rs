use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{verify_jwt, Claims};
use crate::error::ApiError;
use crate::AppState;

/// Authenticated principal extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
        }
    }
}

/// Validates the bearer token and attaches the principal to the request.
/// Missing or invalid tokens never reach the downstream handler.
pub async fn authenticate_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(ApiError::unauthorized)?;
    let claims =
        verify_jwt(&token, &state.config.security).map_err(ApiError::unauthorized)?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Role check over the principal attached by `authenticate_token`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin() => Ok(next.run(request).await),
        Some(_) => Err(ApiError::forbidden("Admin access required")),
        None => Err(ApiError::unauthorized("Authentication required")),
    }
}

/// Attaches the principal when a valid token is present but never fails the
/// request; list endpoints use this to widen visibility for admins.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Ok(token) = extract_bearer(request.headers()) {
        if let Ok(claims) = verify_jwt(&token, &state.config.security) {
            request.extensions_mut().insert(AuthUser::from(claims));
        }
    }
    next.run(request).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err("Empty bearer token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
