//! Generic CRUD handlers shared by every catalog resource. The mounted
//! descriptor arrives through a router extension; everything resource-
//! specific is data on the descriptor.

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use super::parse_id;
use crate::api::format::{record_to_api_value, records_to_api_values};
use crate::error::{ApiError, FieldError};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Pagination};
use crate::resource::{RefJoin, ResourceDescriptor, ToggleTarget};
use crate::store::{ContentStore, ListQuery};
use crate::validation::{self, Mode};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub platform: Option<String>,
}

impl ListParams {
    fn filter_value(&self, name: &str) -> Option<String> {
        match name {
            "category" => self.category.clone(),
            "status" => self.status.clone(),
            "platform" => self.platform.clone(),
            "featured" => self.featured.map(|b| b.to_string()),
            _ => None,
        }
    }
}

pub fn build_list_query(
    desc: &'static ResourceDescriptor,
    params: &ListParams,
    include_inactive: bool,
    state: &AppState,
) -> ListQuery {
    let limit = params
        .limit
        .unwrap_or(state.config.api.default_page_size)
        .clamp(1, state.config.api.max_page_size);
    let page = params.page.unwrap_or(1).max(1);

    let filters = desc
        .filters
        .iter()
        .filter_map(|name| params.filter_value(name).map(|value| (*name, value)))
        .collect();

    ListQuery {
        page,
        limit,
        search: params.search.clone(),
        filters,
        include_inactive,
    }
}

/// GET / - list with search, filters and pagination metadata
pub async fn list(
    State(state): State<AppState>,
    Extension(desc): Extension<&'static ResourceDescriptor>,
    auth: Option<Extension<AuthUser>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Value>> {
    let include_inactive = auth.map(|Extension(user)| user.is_admin()).unwrap_or(false);
    let query = build_list_query(desc, &params, include_inactive, &state);

    let store = state.content(desc);
    let (records, total) = store.list(&query).await?;

    let mut data = records_to_api_values(desc, &records);
    if let Some(join) = desc.reference {
        resolve_references(&state, &join, &mut data).await?;
    }

    Ok(ApiResponse::paginated(
        data,
        Pagination::new(query.page, query.limit, total),
    ))
}

/// GET /:id - single record; increments the view counter where declared
pub async fn get_one(
    State(state): State<AppState>,
    Extension(desc): Extension<&'static ResourceDescriptor>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let store = state.content(desc);

    let record = if desc.features.view_counter {
        store.get_and_increment(id, "views").await?
    } else {
        store.get(id).await?
    };
    let record = record.ok_or_else(|| not_found(desc))?;

    let mut data = vec![record_to_api_value(desc, &record)];
    if let Some(join) = desc.reference {
        resolve_references(&state, &join, &mut data).await?;
    }

    Ok(ApiResponse::success(data.remove(0)))
}

/// POST / - validate, apply defaults, run the prepare hook, insert
pub async fn create(
    State(state): State<AppState>,
    Extension(desc): Extension<&'static ResourceDescriptor>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let mut write =
        validation::validate(desc, &body, Mode::Create).map_err(ApiError::validation)?;
    if let Some(prepare) = desc.prepare {
        prepare(&mut write.doc);
    }

    let record = state
        .content(desc)
        .insert(Value::Object(write.doc), write.is_active, write.position)
        .await?;

    Ok(ApiResponse::created(record_to_api_value(desc, &record)))
}

/// PUT /:id - partial or full field replace, re-running the validators
pub async fn update(
    State(state): State<AppState>,
    Extension(desc): Extension<&'static ResourceDescriptor>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let write = validation::validate(desc, &body, Mode::Update).map_err(ApiError::validation)?;

    let store = state.content(desc);
    let existing = store.get(id).await?.ok_or_else(|| not_found(desc))?;

    let mut merged: Map<String, Value> = existing.doc.as_object().cloned().unwrap_or_default();
    for (key, value) in write.doc {
        merged.insert(key, value);
    }

    let missing = validation::missing_required(desc, &merged);
    if !missing.is_empty() {
        return Err(ApiError::validation(missing));
    }
    if let Some(prepare) = desc.prepare {
        prepare(&mut merged);
    }

    let record = store
        .update(id, Value::Object(merged), write.is_active, write.position)
        .await?
        .ok_or_else(|| not_found(desc))?;

    Ok(ApiResponse::success(record_to_api_value(desc, &record)))
}

/// DELETE /:id - hard delete
pub async fn remove(
    State(state): State<AppState>,
    Extension(desc): Extension<&'static ResourceDescriptor>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let deleted = state.content(desc).delete(id).await?;
    if !deleted {
        return Err(not_found(desc));
    }
    Ok(ApiResponse::message(format!("{} record deleted", desc.name)))
}

#[derive(Debug, Deserialize)]
pub struct OrderBody {
    pub order: Value,
}

/// PUT /:id/order - reassign the manual sort key
pub async fn set_order(
    State(state): State<AppState>,
    Extension(desc): Extension<&'static ResourceDescriptor>,
    Path(id): Path<String>,
    Json(body): Json<OrderBody>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let position = body.order.as_i64().ok_or_else(|| {
        ApiError::validation(vec![FieldError::new(
            "order",
            "order must be an integer",
            Some(body.order.clone()),
        )])
    })?;

    let record = state
        .content(desc)
        .set_position(id, position)
        .await?
        .ok_or_else(|| not_found(desc))?;

    Ok(ApiResponse::success(record_to_api_value(desc, &record)))
}

/// PUT /:id/toggle or /:id/featured - flip the descriptor's toggle target
pub async fn toggle(
    State(state): State<AppState>,
    Extension(desc): Extension<&'static ResourceDescriptor>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let store = state.content(desc);

    let record = match desc.features.toggle {
        Some(ToggleTarget::ActiveFlag) => store.toggle_active(id).await?,
        Some(ToggleTarget::DocFlag(field)) => store.toggle_doc_flag(id, field).await?,
        None => return Err(ApiError::bad_request("Resource has no toggle action")),
    };
    let record = record.ok_or_else(|| not_found(desc))?;

    Ok(ApiResponse::success(record_to_api_value(desc, &record)))
}

/// POST /:id/like - atomic counter increment, nothing else
pub async fn like(
    State(state): State<AppState>,
    Extension(desc): Extension<&'static ResourceDescriptor>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let record = state
        .content(desc)
        .increment(id, "likes")
        .await?
        .ok_or_else(|| not_found(desc))?;

    Ok(ApiResponse::success(record_to_api_value(desc, &record)))
}

/// GET /featured - active records with the featured flag set
pub async fn featured(
    State(state): State<AppState>,
    Extension(desc): Extension<&'static ResourceDescriptor>,
) -> ApiResult<Vec<Value>> {
    let query = ListQuery {
        page: 1,
        limit: state.config.api.max_page_size,
        filters: vec![("featured", "true".to_string())],
        ..Default::default()
    };
    let (records, total) = state.content(desc).list(&query).await?;

    Ok(ApiResponse::paginated(
        records_to_api_values(desc, &records),
        Pagination::new(1, query.limit, total),
    ))
}

/// GET /category/:category - enum-checked category filter
pub async fn by_category(
    State(state): State<AppState>,
    Extension(desc): Extension<&'static ResourceDescriptor>,
    Path(category): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Value>> {
    let allowed = desc
        .enum_values("category")
        .map(|values| values.contains(&category.as_str()))
        .unwrap_or(false);
    if !allowed {
        return Err(ApiError::bad_request(format!(
            "Invalid category: {}",
            category
        )));
    }

    let mut query = build_list_query(desc, &params, false, &state);
    query.filters.push(("category", category));
    let (records, total) = state.content(desc).list(&query).await?;

    Ok(ApiResponse::paginated(
        records_to_api_values(desc, &records),
        Pagination::new(query.page, query.limit, total),
    ))
}

fn not_found(desc: &ResourceDescriptor) -> ApiError {
    ApiError::not_found(format!("{} record not found", desc.name))
}

/// Replace raw id arrays with `{id, <label>}` stubs resolved from the
/// referenced resource. Dangling ids are dropped rather than surfaced.
async fn resolve_references(
    state: &AppState,
    join: &RefJoin,
    records: &mut [Value],
) -> Result<(), ApiError> {
    let mut wanted: Vec<Uuid> = Vec::new();
    for record in records.iter() {
        if let Some(ids) = record.get(join.field).and_then(Value::as_array) {
            for id in ids {
                if let Some(parsed) = id.as_str().and_then(|s| Uuid::parse_str(s).ok()) {
                    wanted.push(parsed);
                }
            }
        }
    }
    wanted.sort_unstable();
    wanted.dedup();
    if wanted.is_empty() {
        return Ok(());
    }

    let target = crate::resource::catalog::by_name(join.resource)
        .ok_or_else(|| ApiError::internal("Unknown reference target"))?;
    let resolved = ContentStore::new(state.pool.clone(), target)
        .select_by_ids(&wanted)
        .await?;

    let labels: HashMap<String, Value> = resolved
        .into_iter()
        .map(|record| {
            let label = record
                .doc
                .get(join.label_field)
                .cloned()
                .unwrap_or(Value::Null);
            (record.id.to_string(), label)
        })
        .collect();

    for record in records.iter_mut() {
        let Some(obj) = record.as_object_mut() else { continue };
        let Some(ids) = obj.get(join.field).and_then(Value::as_array).cloned() else {
            continue;
        };
        let stubs: Vec<Value> = ids
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|id| {
                labels.get(id).map(|label| {
                    serde_json::json!({ "id": id, join.label_field: label })
                })
            })
            .collect();
        obj.insert(join.field.to_string(), Value::Array(stubs));
    }

    Ok(())
}
