//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Datelike;
use shared::models::{EmployeeCreate, EmployeeProfile, EmployeeUpdate, Role};

use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::user::NewUser;
use crate::db::repository::{self, employee, leave, user};
use crate::email::templates;
use crate::notify;
use crate::security_log;
use crate::utils::time::local_today;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

fn not_found() -> AppError {
    AppError::new(ErrorCode::EmployeeNotFound)
}

fn validate_create(payload: &EmployeeCreate) -> AppResult<()> {
    validate_email(&payload.email)?;
    if let Some(pw) = &payload.password {
        validate_password(pw)?;
    }
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.position, "position", MAX_NAME_LEN)?;
    validate_required_text(&payload.department, "department", MAX_NAME_LEN)?;
    validate_optional_text(&payload.team, "team", MAX_NAME_LEN)?;
    validate_optional_text(&payload.manager, "manager", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if !payload.salary.is_finite() || payload.salary < 0.0 {
        return Err(AppError::validation("salary must not be negative"));
    }
    if let Some(end) = payload.end_date
        && end < payload.start_date
    {
        return Err(AppError::validation("endDate must not be before startDate"));
    }
    Ok(())
}

/// Onboard: account, employee record and this year's leave balance together
///
/// Without a password the account starts unverified and a PIN is mailed;
/// the PIN is redeemed through the password reset flow.
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<(StatusCode, Json<EmployeeProfile>)> {
    validate_create(&payload)?;
    let role = payload.role.unwrap_or(Role::Employee);
    if role == Role::Admin && !current.is_admin() {
        return Err(AppError::with_message(
            ErrorCode::AdminRequired,
            "Only an admin can create an admin account",
        ));
    }
    if user::find_by_email(&state.pool, &payload.email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailExists));
    }

    let (password_hash, verified) = match &payload.password {
        Some(pw) => (password::hash_password(pw)?, true),
        // Unusable until a PIN sets a real password
        None => (password::hash_password(&password::generate_code())?, false),
    };
    let year = local_today(state.config.timezone).year();

    let mut tx = repository::begin(&state.pool).await?;
    let user_id = user::insert(
        &mut tx,
        NewUser {
            email: &payload.email,
            password_hash: &password_hash,
            role,
            verified,
        },
    )
    .await?;
    let id = employee::insert(&mut tx, user_id, &payload).await?;
    leave::insert_if_missing(&mut tx, user_id, year, state.config.default_available_leaves).await?;
    if !verified {
        let pin = password::generate_code();
        let expires_at = shared::util::now_millis() + state.config.pin_ttl_minutes * 60_000;
        user::set_pin(&mut tx, user_id, &password::hash_password(&pin)?, expires_at).await?;
        let mail = templates::verification_pin(&payload.email, &pin, state.config.pin_ttl_minutes);
        notify::enqueue_email(&mut tx, &mail).await?;
    }
    repository::commit(tx).await?;
    state.wake_outbox();

    security_log!("INFO", "employee_onboarded", user_id = user_id, created_by = current.id);
    let profile = employee::find_profile(&state.pool, id).await?.ok_or_else(not_found)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<EmployeeProfile>>> {
    Ok(Json(employee::find_all(&state.pool).await?))
}

/// Accounts with the employee role
pub async fn list_staff(State(state): State<ServerState>) -> AppResult<Json<Vec<EmployeeProfile>>> {
    Ok(Json(employee::find_by_role(&state.pool, Role::Employee).await?))
}

pub async fn me(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<EmployeeProfile>> {
    let profile = employee::find_profile_by_user(&state.pool, current.id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(profile))
}

pub async fn by_user(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<EmployeeProfile>> {
    let profile = employee::find_profile_by_user(&state.pool, user_id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(profile))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<EmployeeProfile>> {
    let profile = employee::find_profile(&state.pool, id).await?.ok_or_else(not_found)?;
    Ok(Json(profile))
}

/// Employees edit their own contact fields; HR/admin edit anything
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<EmployeeProfile>> {
    let existing = employee::find_profile(&state.pool, id).await?.ok_or_else(not_found)?;

    let is_self = existing.employee.user_id == current.id;
    if !current.is_hr_or_admin() && !(is_self && payload.is_self_service()) {
        security_log!("WARN", "employee_update_denied", user_id = current.id, employee_id = id);
        return Err(AppError::forbidden("You can only edit your own contact details"));
    }
    if payload.role == Some(Role::Admin) && !current.is_admin() {
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.position, "position", MAX_NAME_LEN)?;
    validate_optional_text(&payload.department, "department", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(salary) = payload.salary
        && (!salary.is_finite() || salary < 0.0)
    {
        return Err(AppError::validation("salary must not be negative"));
    }

    let profile = employee::update(&state.pool, id, &payload).await?;
    tracing::info!(employee_id = id, updated_by = current.id, "Employee updated");
    Ok(Json(profile))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    let user_id = employee::delete_with_account(&state.pool, id).await?;
    security_log!("INFO", "employee_deleted", user_id = user_id, deleted_by = current.id);
    Ok(ApiResponse::message("Employee deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn payload() -> EmployeeCreate {
        EmployeeCreate {
            email: "dana@office.io".into(),
            password: Some("s3cret-pw".into()),
            role: None,
            name: "Dana".into(),
            position: "Engineer".into(),
            department: "R&D".into(),
            team: None,
            manager: None,
            description: None,
            github_username: None,
            salary: 4200.0,
            start_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end_date: None,
            work_from: "09:00".into(),
            work_to: "17:00".into(),
            status: "active".into(),
            documents: Vec::new(),
        }
    }

    #[test]
    fn onboarding_payload_checks() {
        assert!(validate_create(&payload()).is_ok());

        let mut blank_name = payload();
        blank_name.name = " ".into();
        assert!(validate_create(&blank_name).is_err());

        let mut backwards = payload();
        backwards.end_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert!(validate_create(&backwards).is_err());

        let mut short_pw = payload();
        short_pw.password = Some("abc".into());
        assert_eq!(
            validate_create(&short_pw).unwrap_err().code,
            ErrorCode::PasswordTooShort
        );
    }
}
