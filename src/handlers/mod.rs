pub mod auth;
pub mod contact;
pub mod messages;
pub mod resources;

use uuid::Uuid;

use crate::error::ApiError;

/// Parse a path identifier, surfacing malformed ids as 400 rather than 404.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::malformed_id(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_bad_requests_not_missing_records() {
        let err = parse_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert!(parse_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
    }
}
