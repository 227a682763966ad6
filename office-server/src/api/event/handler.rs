//! Calendar Event API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use serde::Deserialize;
use shared::models::{Audience, CalendarEvent, EventCreate, EventQuery, EventUpdate, Notice};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{self, event};
use crate::notify;
use crate::utils::time::{DateFilter, day_start_millis, local_today};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult};

const DEFAULT_UPCOMING: i64 = 10;
const MAX_UPCOMING: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct UpcomingQuery {
    pub limit: Option<i64>,
}

fn validate_window(start: i64, end: i64) -> AppResult<()> {
    if end < start {
        return Err(AppError::validation("end must not be before start"));
    }
    Ok(())
}

/// `[start, end)` millis of the current week, month or year
fn named_range(range: &str, today: NaiveDate, tz: Tz) -> AppResult<(i64, i64)> {
    match range {
        "week" => Ok(DateFilter::ThisWeek.millis_range(today, tz)),
        "month" => Ok(DateFilter::ThisMonth.millis_range(today, tz)),
        "year" => {
            let first = NaiveDate::from_ymd_opt(today.year(), 1, 1);
            let next = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1);
            match (first, next) {
                (Some(first), Some(next)) => {
                    Ok((day_start_millis(first, tz), day_start_millis(next, tz)))
                }
                _ => Err(AppError::validation("Year out of range")),
            }
        }
        other => Err(AppError::validation(format!(
            "Unknown range: {other} (expected week, month or year)"
        ))),
    }
}

async fn load(state: &ServerState, id: i64) -> AppResult<CalendarEvent> {
    event::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Event {id}")))
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<EventCreate>,
) -> AppResult<(StatusCode, Json<CalendarEvent>)> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&payload.event_type, "type", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_window(payload.start, payload.end)?;

    let mut tx = repository::begin(&state.pool).await?;
    let created = event::insert(&mut tx, current.id, &payload).await?;
    let notice = Notice::new(
        format!("New event: {}", created.title),
        format!("/event/{}", created.id),
        "event",
        Audience::All,
    );
    notify::enqueue_notification(&mut tx, &notice).await?;
    repository::commit(tx).await?;
    state.wake_outbox();

    tracing::info!(event_id = created.id, created_by = current.id, "Event created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<CalendarEvent>>> {
    Ok(Json(event::find_all(&state.pool).await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CalendarEvent>> {
    Ok(Json(load(&state, id).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<EventUpdate>,
) -> AppResult<Json<CalendarEvent>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let existing = load(&state, id).await?;
    validate_window(
        payload.start.unwrap_or(existing.start_at),
        payload.end.unwrap_or(existing.end_at),
    )?;
    Ok(Json(event::update(&state.pool, id, &payload).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    event::delete(&state.pool, id).await?;
    Ok(ApiResponse::message("Event deleted"))
}

/// Events overlapping an explicit window or a named range
pub async fn in_range(
    State(state): State<ServerState>,
    Query(query): Query<EventQuery>,
) -> AppResult<Json<Vec<CalendarEvent>>> {
    let (start, end) = match (query.start, query.end, query.range.as_deref()) {
        (Some(start), Some(end), _) => {
            validate_window(start, end)?;
            (start, end)
        }
        (_, _, Some(range)) => {
            let tz = state.config.timezone;
            named_range(range, local_today(tz), tz)?
        }
        _ => return Ok(Json(event::find_all(&state.pool).await?)),
    };
    Ok(Json(event::find_in_range(&state.pool, start, end).await?))
}

pub async fn upcoming(
    State(state): State<ServerState>,
    Query(query): Query<UpcomingQuery>,
) -> AppResult<Json<Vec<CalendarEvent>>> {
    let limit = query.limit.unwrap_or(DEFAULT_UPCOMING).clamp(1, MAX_UPCOMING);
    Ok(Json(
        event::find_upcoming(&state.pool, shared::util::now_millis(), limit).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_covers_the_calendar_year() {
        let tz: Tz = "UTC".parse().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let (start, end) = named_range("year", today, tz).unwrap();
        // 2024-01-01T00:00Z and 2025-01-01T00:00Z
        assert_eq!(start, 1_704_067_200_000);
        assert_eq!(end, 1_735_689_600_000);
    }

    #[test]
    fn unknown_range_is_rejected() {
        let tz: Tz = "UTC".parse().unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert!(named_range("decade", today, tz).is_err());
    }
}
