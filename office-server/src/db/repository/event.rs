//! Calendar Event Repository

use super::{RepoError, RepoResult, Tx};
use shared::models::{CalendarEvent, EventCreate, EventUpdate};
use sqlx::SqlitePool;

const EVENT_SELECT: &str = "SELECT id, title, description, start_at, end_at, event_type, created_by, created_at, updated_at FROM calendar_events";

pub async fn insert(tx: &mut Tx<'_>, created_by: i64, data: &EventCreate) -> RepoResult<CalendarEvent> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO calendar_events (id, title, description, start_at, end_at, event_type, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.start)
    .bind(data.end)
    .bind(&data.event_type)
    .bind(created_by)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(CalendarEvent {
        id,
        title: data.title.clone(),
        description: data.description.clone(),
        start_at: data.start,
        end_at: data.end,
        event_type: data.event_type.clone(),
        created_by,
        created_at: now,
        updated_at: now,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<CalendarEvent>> {
    let event = sqlx::query_as::<_, CalendarEvent>(&format!("{EVENT_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(event)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<CalendarEvent>> {
    let events = sqlx::query_as::<_, CalendarEvent>(&format!("{EVENT_SELECT} ORDER BY start_at"))
        .fetch_all(pool)
        .await?;
    Ok(events)
}

/// Events overlapping `[start, end)` (millis)
pub async fn find_in_range(pool: &SqlitePool, start: i64, end: i64) -> RepoResult<Vec<CalendarEvent>> {
    let events = sqlx::query_as::<_, CalendarEvent>(&format!(
        "{EVENT_SELECT} WHERE start_at < ?1 AND end_at >= ?2 ORDER BY start_at"
    ))
    .bind(end)
    .bind(start)
    .fetch_all(pool)
    .await?;
    Ok(events)
}

/// Events starting at or after `from`
pub async fn find_upcoming(pool: &SqlitePool, from: i64, limit: i64) -> RepoResult<Vec<CalendarEvent>> {
    let events = sqlx::query_as::<_, CalendarEvent>(&format!(
        "{EVENT_SELECT} WHERE start_at >= ? ORDER BY start_at LIMIT ?"
    ))
    .bind(from)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(events)
}

pub async fn update(pool: &SqlitePool, id: i64, data: &EventUpdate) -> RepoResult<CalendarEvent> {
    let rows = sqlx::query(
        "UPDATE calendar_events SET title = COALESCE(?1, title), description = COALESCE(?2, description), start_at = COALESCE(?3, start_at), end_at = COALESCE(?4, end_at), event_type = COALESCE(?5, event_type), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.start)
    .bind(data.end)
    .bind(&data.event_type)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Event {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Event {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM calendar_events WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Event {id} not found")));
    }
    Ok(())
}
