//! Attendance operations
//!
//! Every entry point takes `now` so the wall-clock rules can be exercised
//! at any hour.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use shared::ErrorCode;
use shared::models::{
    Attendance, AttendanceStatus, AttendanceUpdate, BreakInput, CheckInInput, CheckOutInput,
    ManualAttendanceInput,
};

use super::rules::{self, MAX_BREAKS};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::attendance::{self, AttendanceRecord, CheckIn};
use crate::db::repository::{self, user};
use crate::notify;
use crate::utils::time::local_date;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

fn not_found() -> AppError {
    AppError::with_message(ErrorCode::AttendanceNotFound, "No attendance record for today")
}

/// Client-supplied clock time, accepted only on the server's local today
fn same_day_time(
    supplied: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    tz: Tz,
    field: &str,
) -> AppResult<DateTime<Utc>> {
    match supplied {
        Some(at) if local_date(at, tz) != local_date(now, tz) => Err(AppError::validation(format!(
            "{field} must fall on today's date"
        ))),
        Some(at) => Ok(at),
        None => Ok(now),
    }
}

async fn load(state: &ServerState, id: i64) -> AppResult<Attendance> {
    attendance::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AttendanceNotFound))
}

pub async fn check_in(
    state: &ServerState,
    caller: &CurrentUser,
    input: CheckInInput,
    now: DateTime<Utc>,
) -> AppResult<Attendance> {
    validate_optional_text(&input.location, "location", MAX_NAME_LEN)?;
    let tz = state.config.timezone;
    let date = local_date(now, tz);
    let at = same_day_time(input.check_in_time, now, tz, "checkInTime")?;

    if let Some(existing) = attendance::find_for_day(&state.pool, caller.id, date).await?
        && existing.check_out.is_some()
    {
        return Err(AppError::with_message(
            ErrorCode::AlreadyCheckedOut,
            "You can't check in after checking out",
        ));
    }

    let hour = rules::local_hour(at, tz);
    rules::ensure_check_in_open(hour)?;

    let data = CheckIn {
        check_in: at.timestamp_millis(),
        check_in_status: rules::check_in_status(hour),
        attendance_type: input.attendance_type,
        location: input.location,
        lat: input.lat,
        lng: input.lng,
    };
    let record = attendance::upsert_check_in(&state.pool, caller.id, date, &data).await?;
    tracing::info!(user_id = caller.id, %date, status = ?data.check_in_status, "Checked in");
    Ok(record)
}

pub async fn check_out(
    state: &ServerState,
    caller: &CurrentUser,
    input: CheckOutInput,
    now: DateTime<Utc>,
) -> AppResult<Attendance> {
    let tz = state.config.timezone;
    let date = local_date(now, tz);
    let at = same_day_time(input.check_out_time, now, tz, "checkOutTime")?;

    let record = attendance::find_for_day(&state.pool, caller.id, date)
        .await?
        .ok_or_else(not_found)?;
    if record.check_in.is_none() {
        return Err(AppError::with_message(
            ErrorCode::NotCheckedIn,
            "You have not checked in today",
        ));
    }
    if record.check_out.is_some() {
        return Err(AppError::with_message(
            ErrorCode::AlreadyCheckedOut,
            "You have already checked out today",
        ));
    }

    let (status, overtime) = rules::check_out_outcome(rules::local_hour(at, tz));
    if !attendance::set_check_out(&state.pool, record.id, at.timestamp_millis(), status, overtime).await? {
        return Err(AppError::with_message(
            ErrorCode::AlreadyCheckedOut,
            "You have already checked out today",
        ));
    }
    tracing::info!(user_id = caller.id, %date, ?status, overtime, "Checked out");
    load(state, record.id).await
}

/// Record a break on today's open attendance
pub async fn add_break(
    state: &ServerState,
    caller: &CurrentUser,
    input: BreakInput,
    now: DateTime<Utc>,
) -> AppResult<Attendance> {
    let (Some(break_in), Some(break_out)) = (input.break_in, input.break_out) else {
        return Err(AppError::validation("breakIn and breakOut are required"));
    };
    rules::break_minutes(&break_in, &break_out)?;

    let date = local_date(now, state.config.timezone);
    let record = attendance::find_for_day(&state.pool, caller.id, date)
        .await?
        .filter(|a| a.check_in.is_some())
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::NotCheckedIn, "Check in before taking a break")
        })?;
    if record.check_out.is_some() {
        return Err(AppError::with_message(
            ErrorCode::AlreadyCheckedOut,
            "You can't take a break after checking out",
        ));
    }

    let inserted =
        attendance::insert_break(&state.pool, record.id, &break_in, &break_out, MAX_BREAKS).await?;
    if inserted.is_none() {
        return Err(AppError::with_message(
            ErrorCode::BreakLimitReached,
            format!("You have already taken {MAX_BREAKS} breaks"),
        ));
    }
    load(state, record.id).await
}

/// HR/admin entry for a day the employee did not clock
pub async fn manual(
    state: &ServerState,
    input: ManualAttendanceInput,
) -> AppResult<Attendance> {
    let (Some(user_id), Some(status), Some(date), Some(reason)) =
        (input.employee_id, input.status, input.date, input.reason)
    else {
        return Err(AppError::validation(
            "employeeId, status, date and reason are required",
        ));
    };
    validate_required_text(&reason, "reason", MAX_NOTE_LEN)?;

    if user::find_by_id(&state.pool, user_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::EmployeeNotFound));
    }
    if attendance::find_for_day(&state.pool, user_id, date).await?.is_some() {
        return Err(AppError::with_message(
            ErrorCode::AttendanceExists,
            format!("Attendance for {date} already exists"),
        ));
    }

    let record = build_record(
        state,
        status,
        Some(reason),
        input.check_in,
        input.check_out,
        input.attendance_type,
        input.location,
    )?;

    let mut tx = repository::begin(&state.pool).await?;
    let id = attendance::insert(&mut tx, user_id, date, &record).await?;
    let notice = notify::to_user(
        user_id,
        format!("HR recorded your attendance for {date} as {}", status_label(status)),
        "/attendance",
        "attendance",
    );
    notify::enqueue_notification(&mut tx, &notice).await?;
    repository::commit(tx).await?;
    state.wake_outbox();

    tracing::info!(attendance_id = id, user_id, %date, "Manual attendance recorded");
    load(state, id).await
}

/// HR/admin correction; missing fields keep their stored value
pub async fn update(state: &ServerState, id: i64, input: AttendanceUpdate) -> AppResult<Attendance> {
    let existing = load(state, id).await?;
    let stored = |millis: Option<i64>| millis.and_then(DateTime::<Utc>::from_timestamp_millis);

    let record = build_record(
        state,
        input.status.unwrap_or(existing.status),
        input.reason.or(existing.reason),
        input.check_in.or_else(|| stored(existing.check_in)),
        input.check_out.or_else(|| stored(existing.check_out)),
        input.attendance_type.or(existing.attendance_type),
        input.location.or(existing.location),
    )?;

    let updated = attendance::update(&state.pool, id, &record).await?;
    tracing::info!(attendance_id = id, "Attendance corrected");
    Ok(updated)
}

fn build_record(
    state: &ServerState,
    status: AttendanceStatus,
    reason: Option<String>,
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
    attendance_type: Option<shared::models::AttendanceType>,
    location: Option<String>,
) -> AppResult<AttendanceRecord> {
    validate_optional_text(&location, "location", MAX_NAME_LEN)?;
    let record = match status {
        AttendanceStatus::Present => {
            let derived = rules::derive(check_in, check_out, state.config.timezone)?;
            AttendanceRecord {
                status,
                reason,
                check_in: check_in.map(|t| t.timestamp_millis()),
                check_out: check_out.map(|t| t.timestamp_millis()),
                check_in_status: derived.check_in_status,
                check_out_status: derived.check_out_status,
                overtime: derived.overtime,
                attendance_type,
                location,
            }
        }
        AttendanceStatus::Absent => AttendanceRecord {
            status,
            reason,
            check_in: None,
            check_out: None,
            check_in_status: None,
            check_out_status: None,
            overtime: false,
            attendance_type: None,
            location: None,
        },
    };
    Ok(record)
}

fn status_label(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Present => "present",
        AttendanceStatus::Absent => "absent",
    }
}
