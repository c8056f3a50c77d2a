//! HTTP endpoint handlers
//!
//! One generic handler per operation, instantiated for every resource kind
//! by [`crate::create_router`].

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use catalogue_core::{CatalogueError, Resource, Validator};

use crate::error::ApiError;
use crate::query::QueryParams;
use crate::resources::{PathKey, RestResource};
use crate::AppState;

/// Header carrying the version a client expects to overwrite.
pub const EXPECTED_VERSION: &str = "X-Expected-Version";

/// `{"<key>": value, ...}`
fn envelope<const N: usize>(entries: [(&str, Value); N]) -> Json<Value> {
    let mut body = Map::new();
    for (key, value) in entries {
        body.insert(key.to_string(), value);
    }
    Json(Value::Object(body))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::from(CatalogueError::from(e)))
}

fn key_from_path<R>(
    path: Result<Path<<R::Key as PathKey>::Params>, PathRejection>,
) -> Result<R::Key, ApiError>
where
    R: RestResource,
    R::Key: PathKey,
{
    let Path(params) = path?;
    Ok(<R::Key as PathKey>::from_params(params))
}

/// Health check
pub async fn healthcheck() -> Json<Value> {
    Json(json!({
        "status": "available",
        "system_info": {
            "version": env!("CARGO_PKG_VERSION"),
        }
    }))
}

/// Request counters and storage settings
pub async fn debug_vars(State(state): State<Arc<AppState>>) -> Json<Value> {
    let mut vars = state.metrics.snapshot();
    vars["version"] = json!(env!("CARGO_PKG_VERSION"));
    vars["timestamp"] = json!(chrono::Utc::now().timestamp());
    vars["database"] = json!({
        "pool_size": state.catalogue.database().pool_size(),
        "query_timeout_ms": state.catalogue.database().query_timeout().as_millis() as u64,
    });
    Json(vars)
}

/// Turn a handler panic into the generic 500 body.
pub fn recover_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(detail).into_response()
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method.to_string())
}

/// List records matching the query-string predicates
pub async fn list<R>(
    State(state): State<Arc<AppState>>,
    Query(raw): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError>
where
    R: RestResource,
    R::Key: PathKey,
{
    let query = QueryParams::from(raw);
    let mut v = Validator::new();
    let filter = R::filter_from_query(&query, &mut v);
    let filters = query.filters(R::DEFAULT_SORT, state.default_page_size, &mut v);
    filters.validate(R::SORT_SAFELIST, &mut v);
    v.finish()?;

    let page = R::repository(&state.catalogue)
        .list(&filter, &filters)
        .await?;

    Ok(envelope([
        (R::COLLECTION, to_json(&page.records)?),
        ("metadata", to_json(&page.metadata)?),
    ]))
}

/// Create a record; responds 201 with its location
pub async fn create<R>(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Response, ApiError>
where
    R: RestResource,
    R::Key: PathKey,
{
    let Json(body) = payload?;
    let record = R::repository(&state.catalogue)
        .insert(R::from_patch(body))
        .await?;

    let location = format!("/v1/{}/{}", R::COLLECTION, record.key().segment());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        envelope([(R::ENVELOPE, to_json(&record)?)]),
    )
        .into_response())
}

/// Fetch one record
pub async fn show<R>(
    State(state): State<Arc<AppState>>,
    path: Result<Path<<R::Key as PathKey>::Params>, PathRejection>,
) -> Result<Json<Value>, ApiError>
where
    R: RestResource,
    R::Key: PathKey,
{
    let key = key_from_path::<R>(path)?;
    let record = R::repository(&state.catalogue).get(key).await?;
    Ok(envelope([(R::ENVELOPE, to_json(&record)?)]))
}

/// Partial update: fetch, merge the fields present in the body, then write
/// back guarded by the fetched version.
pub async fn update<R>(
    State(state): State<Arc<AppState>>,
    path: Result<Path<<R::Key as PathKey>::Params>, PathRejection>,
    headers: HeaderMap,
    payload: Result<Json<R::Patch>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
    R: RestResource,
    R::Key: PathKey,
{
    let key = key_from_path::<R>(path)?;
    let Json(patch) = payload?;
    let repository = R::repository(&state.catalogue);

    let mut record = repository.get(key.clone()).await?;

    if let Some(expected) = headers.get(EXPECTED_VERSION) {
        let expected = expected.to_str().ok().and_then(|s| s.trim().parse::<i64>().ok());
        if expected != Some(record.version()) {
            return Err(CatalogueError::EditConflict.into());
        }
    }

    record.apply_patch(patch);
    let updated = repository.update_from(key, record).await?;
    Ok(envelope([(R::ENVELOPE, to_json(&updated)?)]))
}

/// Delete one record
pub async fn remove<R>(
    State(state): State<Arc<AppState>>,
    path: Result<Path<<R::Key as PathKey>::Params>, PathRejection>,
) -> Result<Json<Value>, ApiError>
where
    R: RestResource,
    R::Key: PathKey,
{
    let key = key_from_path::<R>(path)?;
    R::repository(&state.catalogue).delete(key).await?;
    Ok(envelope([(
        "message",
        Value::String(format!("{} successfully deleted", R::NAME)),
    )]))
}
