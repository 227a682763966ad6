//! Shared fixtures for the integration tests

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use office_server::db::repository::user::{self, NewUser};
use office_server::{Config, CurrentUser, DbService, ServerState, api};
use serde_json::Value;
use shared::models::Role;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse";

/// Fresh in-memory database with the default config
pub async fn test_state() -> ServerState {
    let db = DbService::in_memory().await.expect("in-memory database");
    ServerState::with_pool(Config::default(), db.pool)
}

pub fn app(state: &ServerState) -> Router {
    api::build_app(state.clone())
}

/// Verified account with [`PASSWORD`]; returns the caller and a bearer token
pub async fn seed_user(state: &ServerState, email: &str, role: Role) -> (CurrentUser, String) {
    let hash = office_server::auth::password::hash_password(PASSWORD).expect("hash");
    let created = user::create(
        &state.pool,
        NewUser {
            email,
            password_hash: &hash,
            role,
            verified: true,
        },
    )
    .await
    .expect("seed user");
    let token = state
        .jwt_service
        .generate_token(created.id, email, role)
        .expect("token");
    (
        CurrentUser {
            id: created.id,
            email: email.to_string(),
            role,
        },
        token,
    )
}

/// One request through the full router; empty bodies come back as `Null`
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn count_notifications(state: &ServerState, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(&state.pool)
        .await
        .expect("count")
}

/// Account plus employee record
pub async fn seed_employee(state: &ServerState, email: &str, role: Role) -> (CurrentUser, String) {
    let (current, token) = seed_user(state, email, role).await;
    let data = shared::models::EmployeeCreate {
        email: email.to_string(),
        password: None,
        role: Some(role),
        name: email.split('@').next().unwrap_or(email).to_string(),
        position: "Engineer".into(),
        department: "R&D".into(),
        team: None,
        manager: None,
        description: None,
        github_username: None,
        salary: 4000.0,
        start_date: chrono::NaiveDate::from_ymd_opt(2023, 1, 2).expect("date"),
        end_date: None,
        work_from: "09:00".into(),
        work_to: "17:00".into(),
        status: "active".into(),
        documents: Vec::new(),
    };
    let mut tx = state.pool.begin().await.expect("begin");
    office_server::db::repository::employee::insert(&mut tx, current.id, &data)
        .await
        .expect("seed employee");
    tx.commit().await.expect("commit");
    (current, token)
}
