//! Contact-form message handlers. Creation is public and stamps submitter
//! metadata; everything else is an admin action. Status transitions carry
//! their timestamp side effects, general field updates do not exist.

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;

use super::parse_id;
use super::resources::{build_list_query, ListParams};
use crate::api::format::{record_to_api_value, records_to_api_values};
use crate::error::{ApiError, FieldError};
use crate::middleware::{client_ip, ApiResponse, ApiResult, Pagination};
use crate::resource::catalog;
use crate::validation::{self, Mode};
use crate::AppState;

/// POST /api/messages - public submission
pub async fn create(
    State(state): State<AppState>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let desc = &catalog::MESSAGES;
    let mut write =
        validation::validate(desc, &body, Mode::Create).map_err(ApiError::validation)?;

    write.doc.insert("status".to_string(), Value::from("new"));
    write.doc.insert("isRead".to_string(), Value::Bool(false));

    let remote = connect.map(|ConnectInfo(addr)| addr);
    if let Some(ip) = client_ip(&headers, remote, state.config.api.trust_proxy) {
        write.doc.insert("ip".to_string(), Value::String(ip.to_string()));
    }
    if let Some(agent) = headers.get("user-agent").and_then(|v| v.to_str().ok()) {
        write
            .doc
            .insert("userAgent".to_string(), Value::String(agent.to_string()));
    }

    let record = state
        .content(desc)
        .insert(Value::Object(write.doc), Some(true), None)
        .await?;

    Ok(ApiResponse::created(record_to_api_value(desc, &record)))
}

/// GET /api/messages - admin inbox with status filter
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Value>> {
    let desc = &catalog::MESSAGES;
    let query = build_list_query(desc, &params, true, &state);
    let (records, total) = state.content(desc).list(&query).await?;

    Ok(ApiResponse::paginated(
        records_to_api_values(desc, &records),
        Pagination::new(query.page, query.limit, total),
    ))
}

/// GET /api/messages/:id - admin read, no side effects
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let desc = &catalog::MESSAGES;
    let id = parse_id(&id)?;
    let record = state
        .content(desc)
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;

    Ok(ApiResponse::success(record_to_api_value(desc, &record)))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: Option<Value>,
}

/// PUT /api/messages/:id/status - admin state transition with timestamp
/// side effects; an invalid status changes nothing.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> ApiResult<Value> {
    let desc = &catalog::MESSAGES;
    let id = parse_id(&id)?;

    let status = body
        .status
        .as_ref()
        .and_then(Value::as_str)
        .filter(|s| catalog::MESSAGE_STATUSES.contains(s))
        .ok_or_else(|| {
            ApiError::validation(vec![FieldError::new(
                "status",
                format!("Status must be one of: {}", catalog::MESSAGE_STATUSES.join(", ")),
                body.status.clone(),
            )])
        })?;

    let record = state
        .content(desc)
        .transition_status(id, status)
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;

    Ok(ApiResponse::success(record_to_api_value(desc, &record)))
}

/// DELETE /api/messages/:id - admin hard delete
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let desc = &catalog::MESSAGES;
    let id = parse_id(&id)?;
    let deleted = state.content(desc).delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found("Message not found"));
    }
    Ok(ApiResponse::message("Message deleted"))
}
