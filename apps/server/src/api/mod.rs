//! HTTP surface: router, handlers and middleware

pub mod handlers;
pub mod middleware;
pub mod routes;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let base_path = state.config.rest.base_path.clone();

    let mut router = Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest(&base_path, routes::resource_routes())
        .layer(from_fn_with_state(
            state.clone(),
            middleware::audit_middleware,
        ))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(DefaultBodyLimit::max(server.max_request_body_size))
        .layer(TraceLayer::new_for_http());

    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if !origins.is_empty() {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::HeaderName::from_static(handlers::resource::USER_HEADER),
                ]),
        );
    }

    router.with_state(state)
}
