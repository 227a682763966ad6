mod common;

use common::{PASSWORD, app, seed_user, send, test_state};
use http::StatusCode;
use serde_json::json;
use office_server::ErrorCode;
use office_server::db::repository::{self, user};
use shared::models::Role;

#[tokio::test]
async fn register_then_login_issues_token_for_that_user() {
    let state = test_state().await;
    let app = app(&state);

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/user/register",
        None,
        Some(json!({ "email": "ada@corp.test", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = body["userId"].as_i64().expect("userId");
    assert_eq!(body["role"], "employee");

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/user/login",
        None,
        Some(json!({ "email": "ada@corp.test", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"].as_i64(), Some(user_id));

    let token = body["token"].as_str().expect("token");
    let claims = state.jwt_service.validate_token(token).expect("valid token");
    assert_eq!(claims.sub, user_id.to_string());

    let (status, body) = send(&app, "GET", "/api/v1/user/info", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@corp.test");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let state = test_state().await;
    let app = app(&state);
    let body = json!({ "email": "dup@corp.test", "password": PASSWORD });

    let (status, _) = send(&app, "POST", "/api/v1/user/register", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(&app, "POST", "/api/v1/user/register", None, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let state = test_state().await;
    let app = app(&state);
    seed_user(&state, "grace@corp.test", Role::Employee).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/user/login",
        None,
        Some(json!({ "email": "grace@corp.test", "password": "not-it" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_route_needs_a_token() {
    let state = test_state().await;
    let app = app(&state);

    let (status, _) = send(&app, "GET", "/api/v1/employee", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/v1/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn role_gate_rejects_employee_onboarding() {
    let state = test_state().await;
    let app = app(&state);
    let (_, token) = seed_user(&state, "staff@corp.test", Role::Employee).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/employee",
        Some(&token),
        Some(json!({
            "email": "new@corp.test",
            "name": "New Hire",
            "position": "Engineer",
            "department": "R&D",
            "salary": 4000.0,
            "startDate": "2024-01-02",
            "from": "09:00",
            "to": "17:00",
            "status": "active"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn hr_onboards_employee_with_leave_balance() {
    let state = test_state().await;
    let app = app(&state);
    let (_, token) = seed_user(&state, "hr@corp.test", Role::Hr).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/employee",
        Some(&token),
        Some(json!({
            "email": "new@corp.test",
            "password": PASSWORD,
            "name": "New Hire",
            "position": "Engineer",
            "department": "R&D",
            "salary": 4000.0,
            "startDate": "2024-01-02",
            "from": "09:00",
            "to": "17:00",
            "status": "active"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = body["userId"].as_i64().expect("userId");

    let (status, info) = send(
        &app,
        "GET",
        &format!("/api/v1/user/information/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["leaveDetail"]["availableLeaves"], 12);
    assert_eq!(info["leaveDetail"]["leavesTaken"], 0);
}

async fn plant_pin(state: &office_server::ServerState, user_id: i64, pin: &str) {
    let hash = office_server::auth::password::hash_password(pin).expect("hash");
    let mut tx = repository::begin(&state.pool).await.expect("begin");
    user::set_pin(&mut tx, user_id, &hash, shared::util::now_millis() + 15 * 60_000)
        .await
        .expect("set pin");
    repository::commit(tx).await.expect("commit");
}

fn reset_body(pin: &str) -> serde_json::Value {
    json!({ "email": "locked@corp.test", "pin": pin, "password": "brand-new-secret" })
}

#[tokio::test]
async fn reset_pin_locks_after_three_wrong_guesses() {
    let state = test_state().await;
    let app = app(&state);
    let (account, _) = seed_user(&state, "locked@corp.test", Role::Employee).await;
    plant_pin(&state, account.id, "654321").await;

    for guess in ["000000", "111111", "222222"] {
        let (status, body) =
            send(&app, "POST", "/api/v1/user/password/reset", None, Some(reset_body(guess))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], ErrorCode::VerificationCodeInvalid.code());
    }

    // The right PIN no longer helps once the guesses are spent
    let (status, body) =
        send(&app, "POST", "/api/v1/user/password/reset", None, Some(reset_body("654321"))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], ErrorCode::TooManyAttempts.code());

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/user/login",
        None,
        Some(json!({ "email": "locked@corp.test", "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A fresh PIN starts a fresh count
    plant_pin(&state, account.id, "987654").await;
    let (status, _) =
        send(&app, "POST", "/api/v1/user/password/reset", None, Some(reset_body("987654"))).await;
    assert_eq!(status, StatusCode::OK);

    let stored = user::find_by_id(&state.pool, account.id).await.unwrap().unwrap();
    assert_eq!(stored.verification_pin_attempts, 0);
    assert!(stored.verification_pin_hash.is_none());
}
