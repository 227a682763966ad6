//! Attachment API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, post},
};

use crate::auth::{HR_ADMIN, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/attachment", routes())
}

fn routes() -> Router<ServerState> {
    let upload_routes = Router::new().route("/", post(handler::create));

    let manage_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_roles(HR_ADMIN)));

    upload_routes.merge(manage_routes)
}
