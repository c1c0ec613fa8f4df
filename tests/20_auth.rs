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

fn post_skill(token: Option<&str>, payload: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/skills")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(payload.to_string())).unwrap()
}

fn valid_skill() -> Value {
    json!({
        "name": "React",
        "category": "Frontend Development",
        "level": 85
    })
}

#[tokio::test]
async fn mutating_without_a_token_is_unauthorized() -> Result<()> {
    let app = common::test_app();
    let response = app.oneshot(post_skill(None, valid_skill())).await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await?;
    assert_eq!(body["success"], Value::Bool(false));
    Ok(())
}

#[tokio::test]
async fn garbage_tokens_are_unauthorized() -> Result<()> {
    let app = common::test_app();
    let response = app
        .oneshot(post_skill(Some("not.a.token"), valid_skill()))
        .await?;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn non_admin_roles_are_forbidden() -> Result<()> {
    let app = common::test_app();
    let token = common::viewer_token();
    let response = app.oneshot(post_skill(Some(&token), valid_skill())).await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await?;
    assert_eq!(body["success"], Value::Bool(false));
    Ok(())
}

#[tokio::test]
async fn delete_and_order_routes_are_gated_too() -> Result<()> {
    let app = common::test_app();
    let id = "550e8400-e29b-41d4-a716-446655440000";

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/skills/{}", id))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/skills/{}/order", id))
                .header("content-type", "application/json")
                .body(Body::from(json!({"order": 3}).to_string()))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn admin_tokens_pass_the_gate_and_reach_validation() -> Result<()> {
    let app = common::test_app();
    let token = common::admin_token();
    let payload = json!({
        "name": "React",
        "category": "Frontend Development",
        "level": 150
    });
    let response = app.oneshot(post_skill(Some(&token), payload)).await?;

    // Past auth, rejected by validation: proves the write never executed
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors[0]["field"], json!("level"));
    assert_eq!(
        errors[0]["message"],
        json!("Skill level must be between 0 and 100")
    );
    Ok(())
}

#[tokio::test]
async fn whoami_reflects_the_token_principal() -> Result<()> {
    let app = common::test_app();
    let token = common::admin_token();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["data"]["role"], json!("admin"));
    assert!(body["data"]["id"].as_str().is_some());
    Ok(())
}

#[tokio::test]
async fn login_requires_both_credentials() -> Result<()> {
    let app = common::test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(json!({"email": "a@b.co"}).to_string()))?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["password"]);
    Ok(())
}
