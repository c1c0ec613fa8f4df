mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

// Lives in its own test binary so the process-wide config can enable the
// limiter without affecting the other suites.
#[tokio::test]
async fn exhausted_window_returns_the_429_envelope() -> Result<()> {
    std::env::set_var("API_ENABLE_RATE_LIMITING", "true");
    std::env::set_var("API_RATE_LIMIT_REQUESTS", "2");
    std::env::set_var("API_RATE_LIMIT_WINDOW_SECS", "60");

    let app = common::test_app();

    // Budget of two; both spent on a cheap malformed-id request
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/skills/not-a-uuid")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/skills/not-a-uuid")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["success"], Value::Bool(false));
    assert!(body["message"].as_str().unwrap().contains("Too many requests"));
    Ok(())
}
