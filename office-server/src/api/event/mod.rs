//! Calendar Event API Module
//!
//! `/event` is the HR-managed collection, `/events` the calendar views.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch},
};

use crate::auth::{HR_ADMIN, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/v1/event", routes())
        .nest("/api/v1/events", calendar_routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new().route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", patch(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_roles(HR_ADMIN)));

    read_routes.merge(manage_routes)
}

fn calendar_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::in_range))
        .route("/upcoming", get(handler::upcoming))
}
