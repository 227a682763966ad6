//! Attendance API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use shared::models::{
    Attendance, AttendanceEntry, AttendanceListing, AttendanceUpdate, BreakInput, CheckInInput,
    CheckOutInput, EmployeeProfile, ManualAttendanceInput, TodayAttendance,
};

use crate::attendance::{rules, service};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::attendance::{self, AttendanceFilter};
use crate::db::repository::employee;
use crate::utils::time::{DateFilter, local_today, parse_date};
use crate::utils::{AppError, AppResult, ErrorCode};

/// `/all` query
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllTimeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub late: Option<bool>,
    pub overtime: Option<bool>,
    pub search_employee: Option<String>,
}

/// `/employee` query
#[derive(Debug, Default, Deserialize)]
pub struct EmployeeQuery {
    /// `today`, `yesterday`, `thisWeek`, `thisMonth` or a day
    pub date: Option<String>,
    pub late: Option<bool>,
    pub overtime: Option<bool>,
}

pub async fn check_in(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(input): Json<CheckInInput>,
) -> AppResult<Json<Attendance>> {
    Ok(Json(service::check_in(&state, &current, input, Utc::now()).await?))
}

pub async fn check_out(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(input): Json<CheckOutInput>,
) -> AppResult<Json<Attendance>> {
    Ok(Json(service::check_out(&state, &current, input, Utc::now()).await?))
}

pub async fn add_break(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(input): Json<BreakInput>,
) -> AppResult<Json<Attendance>> {
    Ok(Json(service::add_break(&state, &current, input, Utc::now()).await?))
}

pub async fn manual(
    State(state): State<ServerState>,
    Json(input): Json<ManualAttendanceInput>,
) -> AppResult<(StatusCode, Json<Attendance>)> {
    let record = service::manual(&state, input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(input): Json<AttendanceUpdate>,
) -> AppResult<Json<Attendance>> {
    Ok(Json(service::update(&state, id, input).await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Attendance>> {
    let record = attendance::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AttendanceNotFound))?;
    Ok(Json(record))
}

/// Every record with aggregate totals
pub async fn all_time(
    State(state): State<ServerState>,
    Query(query): Query<AllTimeQuery>,
) -> AppResult<Json<AttendanceListing>> {
    let filter = AttendanceFilter {
        user_id: None,
        from: query.start_date.as_deref().map(parse_date).transpose()?,
        to: query.end_date.as_deref().map(parse_date).transpose()?,
        late: query.late,
        overtime: query.overtime,
        search: query.search_employee.filter(|s| !s.trim().is_empty()),
    };
    let entries = attendance::list_with_employee(&state.pool, &filter).await?;
    let totals = rules::totals(&entries);
    Ok(Json(AttendanceListing {
        all_time_attendance: entries,
        totals,
    }))
}

/// Caller's record for today, `null` when there is none
pub async fn my_today(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Option<Attendance>>> {
    let today = local_today(state.config.timezone);
    Ok(Json(attendance::find_for_day(&state.pool, current.id, today).await?))
}

pub async fn for_me(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<Vec<AttendanceEntry>>> {
    list_for(&state, current.id, query).await
}

pub async fn for_user(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<Vec<AttendanceEntry>>> {
    list_for(&state, user_id, query).await
}

async fn list_for(
    state: &ServerState,
    user_id: i64,
    query: EmployeeQuery,
) -> AppResult<Json<Vec<AttendanceEntry>>> {
    let (from, to) = match query.date.as_deref() {
        Some(date) => {
            let (start, end) = DateFilter::parse(date)?.date_range(local_today(state.config.timezone));
            (Some(start), Some(end - Duration::days(1)))
        }
        None => (None, None),
    };
    let filter = AttendanceFilter {
        user_id: Some(user_id),
        from,
        to,
        late: query.late,
        overtime: query.overtime,
        search: None,
    };
    Ok(Json(attendance::list_with_employee(&state.pool, &filter).await?))
}

pub async fn today_total(State(state): State<ServerState>) -> AppResult<Json<TodayAttendance>> {
    let today = local_today(state.config.timezone);
    let (present, absent, late) = attendance::count_for_day(&state.pool, today).await?;
    let total_employees = employee::count_staff(&state.pool).await?;
    Ok(Json(TodayAttendance {
        total_attendance: present,
        total_absent: absent,
        total_late: late,
        total_employees,
    }))
}

/// Staff without any record today
pub async fn today_unchecked(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<EmployeeProfile>>> {
    let today = local_today(state.config.timezone);
    Ok(Json(employee::find_unchecked(&state.pool, today).await?))
}
