//! Comment API Module

mod handler;

pub(crate) use handler::check_parent;

use axum::{
    Router, middleware,
    routing::{delete, post},
};

use crate::auth::{HR_ADMIN_PM, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/comment", routes())
}

fn routes() -> Router<ServerState> {
    let write_routes = Router::new().route("/", post(handler::create));

    let moderate_routes = Router::new()
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_roles(HR_ADMIN_PM)));

    write_routes.merge(moderate_routes)
}
