//! User account handlers

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use shared::models::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, RegisterRequest,
    ResetPasswordRequest, ResignationRequest, Role, User, UserInfo, UserInformation,
    VerifyRequest,
};

use crate::auth::{CurrentUser, cookie, password};
use crate::core::ServerState;
use crate::db::repository::user::NewUser;
use crate::db::repository::{self, employee, leave, user};
use crate::email::templates;
use crate::notify;
use crate::security_log;
use crate::utils::validation::{MAX_NOTE_LEN, validate_email, validate_password, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// Issue a token for `user` and answer with it in the body and the auth cookie
pub fn issue_session(state: &ServerState, user: &User) -> AppResult<Response> {
    let token = state
        .jwt_service
        .generate_token(user.id, &user.email, user.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    let signed = cookie::sign(&state.config.cookie_secret, &token);
    let set_cookie = cookie::build(
        &signed,
        state.jwt_service.lifetime_seconds(),
        state.config.is_production(),
    );

    let body = LoginResponse {
        user_id: user.id,
        role: user.role,
        token,
    };
    Ok(([(header::SET_COOKIE, set_cookie)], Json(body)).into_response())
}

/// Hash a fresh PIN and store it with its expiry; returns the clear PIN
async fn store_pin(state: &ServerState, tx: &mut repository::Tx<'_>, user_id: i64) -> AppResult<String> {
    let pin = password::generate_code();
    let pin_hash = password::hash_password(&pin)?;
    let expires_at = shared::util::now_millis() + state.config.pin_ttl_minutes * 60_000;
    user::set_pin(tx, user_id, &pin_hash, expires_at).await?;
    Ok(pin)
}

/// Wrong guesses allowed against one PIN
const MAX_PIN_ATTEMPTS: i64 = 3;

/// Stored PIN hash, as long as it is unexpired and has guesses left
fn live_pin_hash(account: &User, now_millis: i64) -> AppResult<&str> {
    let (Some(hash), Some(expires_at)) =
        (&account.verification_pin_hash, account.verification_pin_expires_at)
    else {
        return Err(AppError::new(ErrorCode::VerificationCodeInvalid));
    };
    if now_millis > expires_at {
        return Err(AppError::new(ErrorCode::VerificationCodeExpired));
    }
    if account.verification_pin_attempts >= MAX_PIN_ATTEMPTS {
        return Err(AppError::new(ErrorCode::TooManyAttempts));
    }
    Ok(hash)
}

/// Check a submitted PIN; the guess is counted before it is compared
async fn check_pin(state: &ServerState, account: &User, pin: &str) -> AppResult<()> {
    let hash = live_pin_hash(account, shared::util::now_millis())?;
    if !user::claim_pin_attempt(&state.pool, account.id, MAX_PIN_ATTEMPTS).await? {
        security_log!("WARN", "pin_attempts_exhausted", user_id = account.id);
        return Err(AppError::new(ErrorCode::TooManyAttempts));
    }
    if !password::verify_password(pin, hash) {
        return Err(AppError::new(ErrorCode::VerificationCodeInvalid));
    }
    Ok(())
}

/// Self-service registration; mails a verification PIN
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserInfo>)> {
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    let role = req.role.unwrap_or(Role::Employee);
    if role != Role::Employee {
        return Err(AppError::forbidden("Only employee accounts can self-register"));
    }

    if user::find_by_email(&state.pool, &req.email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailExists));
    }

    let password_hash = password::hash_password(&req.password)?;
    let mut tx = repository::begin(&state.pool).await?;
    let id = user::insert(
        &mut tx,
        NewUser {
            email: &req.email,
            password_hash: &password_hash,
            role,
            verified: false,
        },
    )
    .await?;
    let pin = store_pin(&state, &mut tx, id).await?;
    let mail = templates::verification_pin(&req.email, &pin, state.config.pin_ttl_minutes);
    notify::enqueue_email(&mut tx, &mail).await?;
    repository::commit(tx).await?;
    state.wake_outbox();

    security_log!("INFO", "user_registered", user_id = id);
    Ok((
        StatusCode::CREATED,
        Json(UserInfo {
            user_id: id,
            email: req.email,
            role,
        }),
    ))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Response> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::validation("Please provide email and password"));
    }

    let account = user::find_by_email(&state.pool, &req.email).await?;
    let account = match account {
        Some(u) if password::verify_password(&req.password, &u.password_hash) => u,
        _ => {
            security_log!("WARN", "login_failed", email = req.email.as_str());
            return Err(AppError::invalid_credentials());
        }
    };

    security_log!("INFO", "login_success", user_id = account.id);
    tracing::info!(user_id = account.id, role = %account.role, "User logged in");
    issue_session(&state, &account)
}

pub async fn logout(current: CurrentUser) -> impl IntoResponse {
    security_log!("INFO", "logout", user_id = current.id);
    (
        [(header::SET_COOKIE, cookie::clear())],
        ApiResponse::message("Logout successful"),
    )
}

pub async fn info(current: CurrentUser) -> Json<UserInfo> {
    Json(UserInfo {
        user_id: current.id,
        email: current.email,
        role: current.role,
    })
}

/// Mails a reset PIN; answers the same whether or not the account exists
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    validate_email(&req.email)?;

    if let Some(account) = user::find_by_email(&state.pool, &req.email).await? {
        let mut tx = repository::begin(&state.pool).await?;
        let pin = store_pin(&state, &mut tx, account.id).await?;
        let mail = templates::password_reset(&account.email, &pin, state.config.pin_ttl_minutes);
        notify::enqueue_email(&mut tx, &mail).await?;
        repository::commit(tx).await?;
        state.wake_outbox();
        security_log!("INFO", "password_reset_requested", user_id = account.id);
    }

    Ok(ApiResponse::message(
        "If the account exists a reset code has been sent",
    ))
}

pub async fn reset_password(
    State(state): State<ServerState>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    validate_password(&req.password)?;
    let account = user::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VerificationCodeInvalid))?;
    check_pin(&state, &account, &req.pin).await?;

    let password_hash = password::hash_password(&req.password)?;
    user::consume_pin(&state.pool, account.id, Some(&password_hash)).await?;
    security_log!("INFO", "password_reset", user_id = account.id);
    Ok(ApiResponse::message("Password has been reset"))
}

pub async fn verify(
    State(state): State<ServerState>,
    Json(req): Json<VerifyRequest>,
) -> AppResult<ApiResponse<()>> {
    let account = user::find_by_email(&state.pool, &req.email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::VerificationCodeInvalid))?;
    check_pin(&state, &account, &req.pin).await?;

    user::consume_pin(&state.pool, account.id, None).await?;
    security_log!("INFO", "account_verified", user_id = account.id);
    Ok(ApiResponse::message("Account verified"))
}

pub async fn change_password(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    let account = user::find_by_id(&state.pool, current.id)
        .await?
        .ok_or_else(AppError::unauthorized)?;
    if !password::verify_password(&req.current_password, &account.password_hash) {
        security_log!("WARN", "password_change_rejected", user_id = current.id);
        return Err(AppError::invalid_credentials());
    }
    validate_password(&req.new_password)?;

    let password_hash = password::hash_password(&req.new_password)?;
    user::update_password(&state.pool, current.id, &password_hash).await?;
    security_log!("INFO", "password_changed", user_id = current.id);
    Ok(ApiResponse::message("Password updated"))
}

/// Employee profile plus the most recent leave year
pub async fn information(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserInformation>> {
    let profile = employee::find_profile_by_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;
    let leave_detail = leave::find_latest(&state.pool, user_id).await?;
    Ok(Json(UserInformation {
        employee: profile,
        leave_detail,
    }))
}

/// Resignation letter, mailed to HR and admins
pub async fn resignation(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(req): Json<ResignationRequest>,
) -> AppResult<ApiResponse<()>> {
    validate_required_text(&req.reason, "reason", MAX_NOTE_LEN)?;
    let name = employee::find_profile_by_user(&state.pool, current.id)
        .await?
        .map(|p| p.employee.name)
        .unwrap_or_else(|| current.email.clone());

    let mut tx = repository::begin(&state.pool).await?;
    for to in user::find_emails_by_roles(&mut tx, &[Role::Admin, Role::Hr]).await? {
        notify::enqueue_email(&mut tx, &templates::resignation(&to, &name, &req.reason)).await?;
    }
    let notice = notify::to_back_office(
        format!("{name} submitted a resignation"),
        &format!("/employee/me/{}", current.id),
        "resignation",
    );
    notify::enqueue_notification(&mut tx, &notice).await?;
    repository::commit(tx).await?;
    state.wake_outbox();

    tracing::info!(user_id = current.id, "Resignation submitted");
    Ok(ApiResponse::message("Resignation sent"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account_with_pin(pin: &str, expires_at: i64) -> User {
        User {
            id: 1,
            email: "a@b.co".into(),
            password_hash: String::new(),
            role: Role::Employee,
            verified: false,
            verification_pin_hash: Some(password::hash_password(pin).unwrap()),
            verification_pin_expires_at: Some(expires_at),
            verification_pin_attempts: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn pin_must_be_fresh() {
        let account = account_with_pin("123456", 1_000);
        assert!(live_pin_hash(&account, 999).is_ok());

        let late = live_pin_hash(&account, 1_001).unwrap_err();
        assert_eq!(late.code, ErrorCode::VerificationCodeExpired);
    }

    #[test]
    fn missing_pin_is_invalid() {
        let mut account = account_with_pin("123456", 1_000);
        account.verification_pin_hash = None;
        let err = live_pin_hash(&account, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::VerificationCodeInvalid);
    }

    #[test]
    fn exhausted_pin_is_locked() {
        let mut account = account_with_pin("123456", 1_000);
        account.verification_pin_attempts = MAX_PIN_ATTEMPTS;
        let err = live_pin_hash(&account, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::TooManyAttempts);
    }
}
