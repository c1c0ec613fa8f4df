//! Contact-info handlers. Contact is a singleton record located by its
//! active flag: the first public read creates it with default values.
//! The find-then-insert pair is deliberately unguarded; see DESIGN.md.

use axum::{extract::State, Json};
use serde_json::Value;

use crate::api::format::record_to_api_value;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::resource::catalog;
use crate::validation::{self, Mode};
use crate::AppState;

/// GET /api/contact - public; lazily creates the singleton
pub async fn get_contact(State(state): State<AppState>) -> ApiResult<Value> {
    let desc = &catalog::CONTACT;
    let defaults = Value::Object(validation::default_doc(desc));
    let record = state.content(desc).singleton_or_create(defaults).await?;

    Ok(ApiResponse::success(record_to_api_value(desc, &record)))
}

/// PUT /api/contact - admin merge update of the singleton
pub async fn update_contact(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let desc = &catalog::CONTACT;
    let write = validation::validate(desc, &body, Mode::Update).map_err(ApiError::validation)?;

    let store = state.content(desc);
    let defaults = Value::Object(validation::default_doc(desc));
    let current = store.singleton_or_create(defaults).await?;

    let record = store
        .merge_update(current.id, Value::Object(write.doc), write.is_active)
        .await?
        .ok_or_else(|| ApiError::not_found("Contact record not found"))?;

    Ok(ApiResponse::success(record_to_api_value(desc, &record)))
}

/// POST /api/contact/download - public atomic resume-download counter
pub async fn count_download(State(state): State<AppState>) -> ApiResult<Value> {
    let desc = &catalog::CONTACT;
    let store = state.content(desc);

    let defaults = Value::Object(validation::default_doc(desc));
    let current = store.singleton_or_create(defaults).await?;
    let record = store
        .increment(current.id, "resumeDownloads")
        .await?
        .ok_or_else(|| ApiError::not_found("Contact record not found"))?;

    Ok(ApiResponse::success(record_to_api_value(desc, &record)))
}
