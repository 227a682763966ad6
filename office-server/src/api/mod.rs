//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness
//! - [`user`] - registration, login, passwords, resignation
//! - [`oauth`] - Google sign-in
//! - [`employee`] - onboarding and profiles
//! - [`attendance`] - clocking, breaks, HR corrections
//! - [`request`] - leave/allowance/overtime/attendance requests
//! - [`project`] / [`ticket`] - project tracking
//! - [`comment`] / [`attachment`] - threads on projects and tickets
//! - [`event`] - company calendar
//! - [`announcement`] - broadcast announcements
//! - [`appraisal`] / [`review`] - performance
//! - [`notification`] - in-app notifications
//!
//! Every router registers full `/api/v1/...` paths. [`build_app`] adds the
//! authentication middleware and the tower-http stack.

pub mod announcement;
pub mod appraisal;
pub mod attachment;
pub mod attendance;
pub mod comment;
pub mod employee;
pub mod event;
pub mod health;
pub mod notification;
pub mod oauth;
pub mod project;
pub mod request;
pub mod review;
pub mod ticket;
pub mod user;

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

pub use crate::utils::{AppError, AppResult};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// In-flight request cap
const MAX_CONCURRENT_REQUESTS: usize = 256;

/// Request ids from the snowflake generator
#[derive(Clone, Default)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = shared::util::snowflake_id().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Access log line per request
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    tracing::info!(target: "http_access", "{} {} {}", method, uri, response.status());
    response
}

/// Every route, no middleware, no state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(user::router())
        .merge(oauth::router())
        .merge(employee::router())
        .merge(attendance::router())
        .merge(request::router())
        .merge(project::router())
        .merge(ticket::router())
        .merge(comment::router())
        .merge(attachment::router())
        .merge(event::router())
        .merge(announcement::router())
        .merge(appraisal::router())
        .merge(review::router())
        .merge(notification::router())
}

/// Fully configured application, used by the server and by tests
pub fn build_app(state: ServerState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    build_router()
        // Inserts CurrentUser; skips public routes itself
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(SetRequestIdLayer::new(request_id, XRequestId))
}
