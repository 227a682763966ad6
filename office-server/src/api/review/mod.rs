//! Review API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::{PM_ADMIN, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/review", routes())
}

fn routes() -> Router<ServerState> {
    let own_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/user/{user_id}", get(handler::for_user));

    let manager_routes = Router::new()
        .route("/{id}/manager", patch(handler::manager_review))
        .layer(middleware::from_fn(require_roles(PM_ADMIN)));

    own_routes.merge(manager_routes)
}
