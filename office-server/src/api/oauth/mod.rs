//! Google sign-in
//!
//! Only accounts that already exist may sign in; the Google identity is
//! matched by email.

use axum::{Json, Router, extract::State, response::Response, routing::post};
use shared::models::GoogleLoginRequest;

use crate::api::user::issue_session;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::integrations::google;
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/v1/oauth/google", post(google_login))
}

async fn google_login(
    State(state): State<ServerState>,
    Json(req): Json<GoogleLoginRequest>,
) -> AppResult<Response> {
    if req.id_token.trim().is_empty() {
        return Err(AppError::validation("idToken is required"));
    }

    let identity = google::verify_id_token(
        &state.http,
        state.config.google.client_id.as_deref(),
        &req.id_token,
    )
    .await?;

    let Some(account) = user::find_by_email(&state.pool, &identity.email).await? else {
        security_log!("WARN", "oauth_unlinked", email = identity.email.as_str());
        return Err(AppError::new(ErrorCode::AccountNotLinked));
    };

    security_log!("INFO", "oauth_login", user_id = account.id, provider = "google");
    issue_session(&state, &account)
}
