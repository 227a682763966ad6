//! Request API Module
//!
//! Two-stage approval: the project manager named in `requestedTo` decides
//! `pmStatus`, then HR/admin decide `status`.

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::{HR_ADMIN, HR_ADMIN_PM, PM_ONLY, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/v1/request", routes())
        .merge(
            Router::new()
                .route("/api/v1/requests", get(handler::list_all))
                .layer(middleware::from_fn(require_roles(HR_ADMIN_PM))),
        )
}

fn routes() -> Router<ServerState> {
    let own_routes = Router::new()
        .route("/", get(handler::list_mine).post(handler::create))
        .route("/count/{count_type}", get(handler::count_by_type))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete));

    let count_routes = Router::new()
        .route("/count", get(handler::count_all))
        .layer(middleware::from_fn(require_roles(HR_ADMIN)));

    let pm_routes = Router::new()
        .route("/pm/request", get(handler::list_for_pm))
        .layer(middleware::from_fn(require_roles(PM_ONLY)));

    let decide_routes = Router::new()
        .route("/{id}", axum::routing::patch(handler::decide))
        .layer(middleware::from_fn(require_roles(HR_ADMIN_PM)));

    own_routes
        .merge(count_routes)
        .merge(pm_routes)
        .merge(decide_routes)
}
