//! User account routes
//!
//! Login, registration and the PIN flows are public (see `PUBLIC_ROUTES`
//! in the auth middleware); everything else needs a token.

mod handler;

pub(crate) use handler::issue_session;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::{STAFF, require_roles};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/user", routes())
}

fn routes() -> Router<ServerState> {
    let account_routes = Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/logout", post(handler::logout))
        .route("/info", get(handler::info))
        .route("/verify", post(handler::verify))
        .route("/password", patch(handler::change_password))
        .route("/password/forgot", post(handler::forgot_password))
        .route("/password/reset", post(handler::reset_password))
        .route("/information/{user_id}", get(handler::information));

    let staff_routes = Router::new()
        .route("/resignation", post(handler::resignation))
        .layer(middleware::from_fn(require_roles(STAFF)));

    account_routes.merge(staff_routes)
}
