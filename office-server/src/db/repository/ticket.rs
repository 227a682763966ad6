//! Ticket Repository

use super::{RepoError, RepoResult, Tx};
use chrono::NaiveDate;
use shared::models::{Ticket, TicketCreate, TicketUpdate};
use sqlx::SqlitePool;

const TICKET_SELECT: &str = "SELECT id, title, status, ticket_type, description, assignee_id, priority, start_date, due_date, estimated_time, reporter_id, progress, spent_time, linked_project, grading, created_at, updated_at FROM tickets";

const UNSETTLED_CLAUSE: &str = "status NOT IN ('completed', 'cancelled', 'overdue')";

pub async fn insert(pool: &SqlitePool, reporter_id: i64, data: &TicketCreate) -> RepoResult<Ticket> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO tickets (id, title, status, ticket_type, description, assignee_id, priority, start_date, due_date, estimated_time, reporter_id, linked_project, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
    )
    .bind(id)
    .bind(&data.title)
    .bind(data.status.unwrap_or_default())
    .bind(&data.ticket_type)
    .bind(&data.description)
    .bind(data.assignee_id)
    .bind(&data.priority)
    .bind(data.start_date)
    .bind(data.due_date)
    .bind(&data.estimated_time)
    .bind(reporter_id)
    .bind(data.linked_project)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create ticket".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Ticket>> {
    let ticket = sqlx::query_as::<_, Ticket>(&format!("{TICKET_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(ticket)
}

/// All tickets, or those `member` reports or is assigned
pub async fn list(pool: &SqlitePool, member: Option<i64>) -> RepoResult<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "{TICKET_SELECT} WHERE (?1 IS NULL OR assignee_id = ?1 OR reporter_id = ?1) ORDER BY created_at DESC"
    ))
    .bind(member)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

pub async fn list_for_project(pool: &SqlitePool, project_id: i64) -> RepoResult<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "{TICKET_SELECT} WHERE linked_project = ? ORDER BY created_at DESC"
    ))
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

pub async fn update(pool: &SqlitePool, id: i64, data: &TicketUpdate) -> RepoResult<Ticket> {
    let rows = sqlx::query(
        "UPDATE tickets SET title = COALESCE(?1, title), status = COALESCE(?2, status), ticket_type = COALESCE(?3, ticket_type), description = COALESCE(?4, description), assignee_id = COALESCE(?5, assignee_id), priority = COALESCE(?6, priority), start_date = COALESCE(?7, start_date), due_date = COALESCE(?8, due_date), estimated_time = COALESCE(?9, estimated_time), progress = COALESCE(?10, progress), spent_time = COALESCE(?11, spent_time), linked_project = COALESCE(?12, linked_project), grading = COALESCE(?13, grading), updated_at = ?14 WHERE id = ?15",
    )
    .bind(&data.title)
    .bind(data.status)
    .bind(&data.ticket_type)
    .bind(&data.description)
    .bind(data.assignee_id)
    .bind(&data.priority)
    .bind(data.start_date)
    .bind(data.due_date)
    .bind(&data.estimated_time)
    .bind(data.progress)
    .bind(&data.spent_time)
    .bind(data.linked_project)
    .bind(data.grading)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Ticket {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Ticket {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM tickets WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Ticket {id} not found")));
    }
    Ok(())
}

/// Unsettled tickets whose due date is before `today`
pub async fn find_past_due(pool: &SqlitePool, today: NaiveDate) -> RepoResult<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "{TICKET_SELECT} WHERE due_date IS NOT NULL AND due_date < ? AND {UNSETTLED_CLAUSE} ORDER BY due_date"
    ))
    .bind(today)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

/// Unsettled tickets due in `[from, to]`
pub async fn find_due_between(
    pool: &SqlitePool,
    from: NaiveDate,
    to: NaiveDate,
) -> RepoResult<Vec<Ticket>> {
    let tickets = sqlx::query_as::<_, Ticket>(&format!(
        "{TICKET_SELECT} WHERE due_date >= ? AND due_date <= ? AND {UNSETTLED_CLAUSE} ORDER BY due_date"
    ))
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(tickets)
}

/// Flip to overdue; `false` if the ticket was settled in the meantime
pub async fn mark_overdue(tx: &mut Tx<'_>, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(&format!(
        "UPDATE tickets SET status = 'overdue', updated_at = ?1 WHERE id = ?2 AND {UNSETTLED_CLAUSE}"
    ))
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// (assigned, completed, average grading of completed) for a user
pub async fn stats_for_assignee(
    pool: &SqlitePool,
    user_id: i64,
) -> RepoResult<(i64, i64, Option<f64>)> {
    let stats = sqlx::query_as::<_, (i64, i64, Option<f64>)>(
        "SELECT COUNT(*), COALESCE(SUM(status = 'completed'), 0), AVG(CASE WHEN status = 'completed' THEN grading END) FROM tickets WHERE assignee_id = ?",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(stats)
}
