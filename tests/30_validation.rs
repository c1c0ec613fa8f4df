mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn admin_post(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", common::admin_token()))
        .body(Body::from(payload.to_string()))
        .unwrap()
}

#[tokio::test]
async fn project_violations_are_reported_together() -> Result<()> {
    let app = common::test_app();
    let payload = json!({
        "title": "Folio",
        "description": "Backend",
        "technologies": [],
        "category": "Not A Category",
        "githubUrl": "ftp://example.com/repo",
        "startDate": "soon"
    });
    let response = app.oneshot(admin_post("/api/projects", payload)).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["message"], json!("Validation failed"));
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"technologies"));
    assert!(fields.contains(&"category"));
    assert!(fields.contains(&"githubUrl"));
    assert!(fields.contains(&"startDate"));
    Ok(())
}

#[tokio::test]
async fn read_only_fields_cannot_be_written() -> Result<()> {
    let app = common::test_app();
    let payload = json!({
        "name": "Docker",
        "category": "DevOps",
        "level": 60,
        "createdAt": "2020-01-01T00:00:00Z"
    });
    let response = app.oneshot(admin_post("/api/skills", payload)).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["errors"][0]["field"], json!("createdAt"));
    Ok(())
}

#[tokio::test]
async fn non_object_bodies_fail_validation() -> Result<()> {
    let app = common::test_app();
    let response = app
        .oneshot(admin_post("/api/skills", json!(["not", "an", "object"])))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["errors"][0]["field"], json!("body"));
    Ok(())
}

#[tokio::test]
async fn message_status_values_are_enum_checked_before_any_write() -> Result<()> {
    let app = common::test_app();
    let id = "550e8400-e29b-41d4-a716-446655440000";
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/messages/{}/status", id))
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {}", common::admin_token()))
                .body(Body::from(json!({"status": "spam"}).to_string()))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["errors"][0]["field"], json!("status"));
    assert!(body["errors"][0]["message"]
        .as_str()
        .unwrap()
        .contains("new, read, replied, archived"));
    Ok(())
}

#[tokio::test]
async fn order_body_must_be_an_integer() -> Result<()> {
    let app = common::test_app();
    let id = "550e8400-e29b-41d4-a716-446655440000";
    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/skills/{}/order", id))
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {}", common::admin_token()))
                .body(Body::from(json!({"order": "third"}).to_string()))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["errors"][0]["field"], json!("order"));
    Ok(())
}
