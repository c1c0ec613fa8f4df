//! Token acquisition and session introspection for the admin principal.

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::error::{ApiError, FieldError};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::store::users;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// POST /api/auth/login - verify credentials, return a bearer token.
/// Failure messages never reveal which part of the credentials was wrong.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Value> {
    let mut errors = Vec::new();
    if body.email.as_deref().map(str::trim).unwrap_or("").is_empty() {
        errors.push(FieldError::new("email", "Email is required", None));
    }
    if body.password.as_deref().unwrap_or("").is_empty() {
        errors.push(FieldError::new("password", "Password is required", None));
    }
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let email = body.email.as_deref().unwrap_or("").trim();
    let password = body.password.as_deref().unwrap_or("");

    let user = users::find_by_email(&state.pool, email)
        .await?
        .filter(|user| crate::auth::verify_password(password, &user.password_hash))
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let claims = Claims::new(user.id, user.role.clone(), &state.config.security);
    let token = generate_jwt(&claims, &state.config.security)?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": {
            "id": user.id,
            "email": user.email,
            "role": user.role,
        },
        "expiresIn": state.config.security.jwt_expiry_hours * 3600,
    })))
}

/// GET /api/auth/me - the principal attached by the auth middleware
pub async fn me(Extension(user): Extension<AuthUser>) -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "id": user.id,
        "role": user.role,
    })))
}
