use crate::api::handlers::resource;
use crate::state::AppState;
use axum::{routing::get, Router};

/// Generic resource routes, nested under `rest.base_path`.
pub fn resource_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:resource",
            get(resource::list_resources).post(resource::create_resource),
        )
        .route(
            "/:resource/:uuid",
            get(resource::get_resource)
                .post(resource::update_resource)
                .delete(resource::delete_resource),
        )
}
