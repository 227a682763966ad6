//! Notification API Module
//!
//! Every route acts on the caller's own notifications.

mod handler;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/v1/notifications", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/count", get(handler::count_unseen))
        .route("/all", patch(handler::mark_all_seen))
        .route("/{id}", patch(handler::mark_seen))
}
