//! Audit middleware for REST interactions
//!
//! Emits one structured event per resource interaction on the `audit`
//! tracing target, after the response status is known.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, Uri},
    middleware::Next,
    response::Response,
};

use crate::api::handlers::resource::acting_user;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RestInteraction {
    interaction: &'static str,
    /// Audit action code: C/R/U/D/E.
    action: &'static str,
    resource: String,
    uuid: Option<String>,
    query: Option<String>,
}

fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(s) = xff.to_str() {
            if let Some(first) = s.split(',').next() {
                let trimmed = first.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn query_param(uri: &Uri, name: &str) -> Option<String> {
    uri.query()?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then(|| {
            urlencoding::decode(&value.replace('+', " "))
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
    })
}

fn parse_rest_interaction(
    method: &Method,
    uri: &Uri,
    base_path: &str,
) -> Option<RestInteraction> {
    let path = uri.path().strip_prefix(base_path)?;
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let (interaction, action) = match (method.as_str(), segments.as_slice()) {
        ("GET", [_]) => {
            if query_param(uri, "q").is_some() {
                ("search", "E")
            } else {
                ("list", "R")
            }
        }
        ("POST", [_]) => ("create", "C"),
        ("GET", [_, _]) => ("read", "R"),
        ("POST", [_, _]) => ("update", "U"),
        ("DELETE", [_, _]) => match query_param(uri, "purge") {
            Some(value) if !value.eq_ignore_ascii_case("false") => ("purge", "D"),
            _ => ("void", "D"),
        },
        _ => return None,
    };

    Some(RestInteraction {
        interaction,
        action,
        resource: segments[0].to_ascii_lowercase(),
        uuid: segments.get(1).map(|s| (*s).to_string()),
        query: if interaction == "search" {
            query_param(uri, "q")
        } else {
            None
        },
    })
}

pub async fn audit_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let audit = &state.config.logging.audit;
    if !audit.enabled {
        return next.run(req).await;
    }

    let Some(interaction) =
        parse_rest_interaction(req.method(), req.uri(), &state.config.rest.base_path)
    else {
        return next.run(req).await;
    };

    let user = acting_user(&state, req.headers());
    let client_ip = extract_client_ip(req.headers());
    let query = interaction
        .query
        .as_deref()
        .filter(|_| audit.capture_search_query);

    let response = next.run(req).await;
    let status = response.status();

    tracing::info!(
        target: "audit",
        interaction = interaction.interaction,
        action = interaction.action,
        resource = %interaction.resource,
        uuid = interaction.uuid.as_deref(),
        query,
        user = %user,
        client_ip = client_ip.as_deref(),
        status = status.as_u16(),
        outcome = if status.is_success() { "success" } else { "failure" },
        "REST interaction"
    );

    response
}
