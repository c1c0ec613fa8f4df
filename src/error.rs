// HTTP API error types and the single process-wide translation layer
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One field-level validation violation, reported alongside every other
/// violation found in the same request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value,
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError { message: String, errors: Vec<FieldError> },
    MalformedIdentifier(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 429 Too Many Requests
    TooManyRequests(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::MalformedIdentifier(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::MalformedIdentifier(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::TooManyRequests(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Uniform failure envelope: `{ success: false, message, errors? }`
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, errors } => json!({
                "success": false,
                "message": message,
                "errors": errors,
            }),
            _ => json!({
                "success": false,
                "message": self.message(),
            }),
        }
    }
}

// Constructor shorthands, mirroring how handlers raise failures
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        ApiError::ValidationError {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    pub fn malformed_id(id: &str) -> Self {
        ApiError::MalformedIdentifier(format!("Invalid identifier format: {}", id))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        ApiError::TooManyRequests(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        match err {
            crate::store::StoreError::NotFound(msg) => ApiError::not_found(msg),
            crate::store::StoreError::Connection(msg) => {
                tracing::error!("database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            crate::store::StoreError::Internal(msg) => {
                tracing::error!("store error: {}", msg);
                ApiError::internal("An error occurred while processing your request")
            }
            crate::store::StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return a generic message
                tracing::error!("sqlx error: {}", sqlx_err);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        tracing::error!("jwt error: {}", err);
        ApiError::internal("Failed to issue token")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
