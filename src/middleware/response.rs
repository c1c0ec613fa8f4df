use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// List-endpoint pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pagination {
    pub current: i64,
    pub pages: i64,
    pub total: i64,
}

impl Pagination {
    pub fn new(current: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self { current, pages, total }
    }
}

/// Wrapper for API responses that adds the uniform success envelope
/// `{ success: true, data?, message?, pagination? }`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub pagination: Option<Pagination>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            message: None,
            pagination: None,
            status_code: StatusCode::OK,
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            ..Self::success(data)
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::success(data)
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }
}

impl ApiResponse<Value> {
    /// A success envelope carrying only a human-readable message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            data: None,
            message: Some(message.into()),
            pagination: None,
            status_code: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match self.data {
            Some(data) => match serde_json::to_value(&data) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::error!("failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "success": false,
                            "message": "Failed to serialize response data"
                        })),
                    )
                        .into_response();
                }
            },
            None => None,
        };

        let mut envelope = json!({ "success": true });
        if let Some(data) = data_value {
            envelope["data"] = data;
        }
        if let Some(message) = self.message {
            envelope["message"] = Value::String(message);
        }
        if let Some(pagination) = self.pagination {
            envelope["pagination"] = json!(pagination);
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
