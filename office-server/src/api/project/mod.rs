//! Project API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{PM_ADMIN, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/project", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/counts", get(handler::counts))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/tickets", get(handler::tickets))
        .route("/{id}/comments", get(handler::comments))
        .route("/{id}/attachments", get(handler::attachments));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", patch(handler::update).delete(handler::delete))
        .route("/{id}/assignee", post(handler::add_assignees))
        .route(
            "/{id}/github",
            patch(handler::link_repository).put(handler::create_repository),
        )
        .layer(middleware::from_fn(require_roles(PM_ADMIN)));

    read_routes.merge(manage_routes)
}
