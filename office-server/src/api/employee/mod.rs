//! Employee API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::auth::{HR_ADMIN, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/employee", routes())
}

fn routes() -> Router<ServerState> {
    // Any signed-in user; updates check self vs HR/admin in the handler
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/all", get(handler::list_staff))
        .route("/me", get(handler::me))
        .route("/me/{user_id}", get(handler::by_user))
        .route("/{id}", get(handler::get_by_id).patch(handler::update));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_roles(HR_ADMIN)));

    read_routes.merge(manage_routes)
}
