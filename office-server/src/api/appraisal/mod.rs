//! Appraisal API Module
//!
//! Promotions and salary increases write the new values onto the employee
//! record and keep the previous ones on the appraisal.

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{ADMIN, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/appraisal", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/history/my", get(handler::my_history))
        .route("/{id}", get(handler::get_by_id));

    let admin_routes = Router::new()
        .route("/measures", get(handler::measures))
        .route("/history/all", get(handler::all_history))
        .route("/promote/{user_id}", post(handler::promote))
        .route("/increase-salary/{user_id}", post(handler::increase_salary))
        .route("/feedback/{user_id}", post(handler::feedback))
        .layer(middleware::from_fn(require_roles(ADMIN)));

    read_routes.merge(admin_routes)
}
