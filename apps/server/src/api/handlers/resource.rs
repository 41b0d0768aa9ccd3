//! Generic resource handlers
//!
//! Every route resolves the resource by path segment through the registry and
//! delegates to it; these handlers only translate HTTP into operations.

use crate::{
    representation::{Representation, RepresentationContext},
    resources::{ListQuery, RequestContext},
    state::AppState,
    Error, Result,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Header naming the acting user; falls back to `rest.system_user`.
pub const USER_HEADER: &str = "x-records-user";

/// Query parameters accepted by resource routes. Values are kept as strings
/// so malformed input is reported in the JSON error format.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceParams {
    pub v: Option<String>,
    pub q: Option<String>,
    pub limit: Option<String>,
    pub start_index: Option<String>,
    pub include_all: Option<String>,
    pub reason: Option<String>,
    pub purge: Option<String>,
}

/// Acting user from [`USER_HEADER`]; blank or missing means `rest.system_user`.
pub fn acting_user(state: &AppState, headers: &HeaderMap) -> String {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| state.config.rest.system_user.clone())
}

fn request_context(
    state: &AppState,
    headers: &HeaderMap,
    params: &ResourceParams,
) -> Result<RequestContext> {
    Ok(RequestContext {
        user: acting_user(state, headers),
        representation: Representation::parse(params.v.as_deref())?,
        repr: RepresentationContext::new(state.config.rest.base_path.clone()),
    })
}

fn parse_uuid(resource: &str, raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::not_found(resource, raw))
}

fn parse_count(name: &str, raw: &str) -> Result<usize> {
    raw.trim().parse().map_err(|_| {
        Error::BadRequest(format!(
            "{name} must be a non-negative integer, got '{raw}'"
        ))
    })
}

/// A bare flag (`?includeAll`) counts as true.
fn parse_flag(name: &str, raw: Option<&str>) -> Result<bool> {
    match raw.map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if v.is_empty() || v == "true" => Ok(true),
        Some(v) if v == "false" => Ok(false),
        Some(v) => Err(Error::BadRequest(format!(
            "{name} must be true or false, got '{v}'"
        ))),
    }
}

fn list_query(state: &AppState, params: &ResourceParams) -> Result<ListQuery> {
    let rest = &state.config.rest;
    let limit = match params.limit.as_deref() {
        None => rest.default_limit,
        Some(raw) => match parse_count("limit", raw)? {
            0 => {
                return Err(Error::BadRequest(
                    "limit must be greater than 0".to_string(),
                ))
            }
            n => n.min(rest.max_limit),
        },
    };
    let start_index = params
        .start_index
        .as_deref()
        .map(|raw| parse_count("startIndex", raw))
        .transpose()?
        .unwrap_or(0);

    Ok(ListQuery {
        q: params.q.clone(),
        v: params.v.clone(),
        limit,
        start_index,
        include_all: parse_flag("includeAll", params.include_all.as_deref())?,
    })
}

fn parse_body(body: &Bytes) -> Result<JsonValue> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::BadRequest("Request body is empty".to_string()));
    }
    serde_json::from_slice(body)
        .map_err(|e| Error::BadRequest(format!("Invalid JSON body: {e}")))
}

/// List or search (GET /{resource})
pub async fn list_resources(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    Query(params): Query<ResourceParams>,
) -> Result<Response> {
    let resource = state.registry.get(&resource)?;
    let ctx = request_context(&state, &headers, &params)?;
    let query = list_query(&state, &params)?;

    let result = resource.list(&query, &ctx).await?;
    Ok((StatusCode::OK, Json(result)).into_response())
}

/// Fetch by UUID (GET /{resource}/{uuid})
pub async fn get_resource(
    State(state): State<AppState>,
    Path((resource, uuid)): Path<(String, String)>,
    headers: HeaderMap,
    Query(params): Query<ResourceParams>,
) -> Result<Response> {
    let resource = state.registry.get(&resource)?;
    let uuid = parse_uuid(resource.name(), &uuid)?;
    let ctx = request_context(&state, &headers, &params)?;

    let result = resource.retrieve(&uuid, &ctx).await?;
    Ok((StatusCode::OK, Json(result)).into_response())
}

/// Create (POST /{resource})
pub async fn create_resource(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    headers: HeaderMap,
    Query(params): Query<ResourceParams>,
    body: Bytes,
) -> Result<Response> {
    let resource = state.registry.get(&resource)?;
    let ctx = request_context(&state, &headers, &params)?;
    let payload = parse_body(&body)?;

    let created = resource.create(payload, &ctx).await?;

    let mut response = (StatusCode::CREATED, Json(&created)).into_response();
    if let Some(uuid) = created.get("uuid").and_then(JsonValue::as_str) {
        let location = ctx.repr.link(&format!("{}/{uuid}", resource.name()));
        if let Ok(value) = location.parse() {
            response.headers_mut().insert(header::LOCATION, value);
        }
    }
    Ok(response)
}

/// Partial update (POST /{resource}/{uuid})
pub async fn update_resource(
    State(state): State<AppState>,
    Path((resource, uuid)): Path<(String, String)>,
    headers: HeaderMap,
    Query(params): Query<ResourceParams>,
    body: Bytes,
) -> Result<Response> {
    let resource = state.registry.get(&resource)?;
    let uuid = parse_uuid(resource.name(), &uuid)?;
    let ctx = request_context(&state, &headers, &params)?;
    let payload = parse_body(&body)?;

    let updated = resource.update(&uuid, payload, &ctx).await?;
    Ok((StatusCode::OK, Json(updated)).into_response())
}

/// Void (200 with the voided representation) or purge (204)
/// (DELETE /{resource}/{uuid}[?reason=..|?purge])
pub async fn delete_resource(
    State(state): State<AppState>,
    Path((resource, uuid)): Path<(String, String)>,
    headers: HeaderMap,
    Query(params): Query<ResourceParams>,
) -> Result<Response> {
    let resource = state.registry.get(&resource)?;
    let uuid = parse_uuid(resource.name(), &uuid)?;
    let ctx = request_context(&state, &headers, &params)?;

    if parse_flag("purge", params.purge.as_deref())? {
        resource.purge(&uuid).await?;
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let voided = resource.void(&uuid, params.reason.as_deref(), &ctx).await?;
    Ok((StatusCode::OK, Json(voided)).into_response())
}
