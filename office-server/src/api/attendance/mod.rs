//! Attendance API Module
//!
//! | Path | Method | Roles |
//! |------|--------|-------|
//! | /checkin, /checkout, /break | POST | employee, PM |
//! | /manual | POST | HR, admin |
//! | /all | GET | HR, admin |
//! | /me/today, /employee[/{user_id}], /today/total, /today/uncheck | GET | any |
//! | /{id} | GET, PATCH | HR, admin |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{HR_ADMIN, STAFF, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/attendance", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/me/today", get(handler::my_today))
        .route("/employee", get(handler::for_me))
        .route("/employee/{user_id}", get(handler::for_user))
        .route("/today/total", get(handler::today_total))
        .route("/today/uncheck", get(handler::today_unchecked));

    let clock_routes = Router::new()
        .route("/checkin", post(handler::check_in))
        .route("/checkout", post(handler::check_out))
        .route("/break", post(handler::add_break))
        .layer(middleware::from_fn(require_roles(STAFF)));

    let manage_routes = Router::new()
        .route("/manual", post(handler::manual))
        .route("/all", get(handler::all_time))
        .route("/{id}", get(handler::get_by_id).patch(handler::update))
        .layer(middleware::from_fn(require_roles(HR_ADMIN)));

    read_routes.merge(clock_routes).merge(manage_routes)
}
