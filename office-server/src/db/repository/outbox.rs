//! Outbox Repository
//!
//! Pending side effects written in the same transaction as the change that
//! caused them. The worker in `crate::notify` drains them in id order.

use super::{RepoResult, Tx};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum OutboxKind {
    Notify,
    Email,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutboxEvent {
    pub id: i64,
    pub kind: OutboxKind,
    pub payload: String,
    pub attempts: i64,
    pub created_at: i64,
    pub processed_at: Option<i64>,
    pub last_error: Option<String>,
}

pub async fn insert(tx: &mut Tx<'_>, kind: OutboxKind, payload: &str) -> RepoResult<i64> {
    let result = sqlx::query("INSERT INTO outbox (kind, payload, created_at) VALUES (?, ?, ?)")
        .bind(kind)
        .bind(payload)
        .bind(shared::util::now_millis())
        .execute(&mut **tx)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Unprocessed events after `after_id` below the retry ceiling, oldest first
pub async fn fetch_pending(
    pool: &SqlitePool,
    after_id: i64,
    max_attempts: i64,
    limit: i64,
) -> RepoResult<Vec<OutboxEvent>> {
    let events = sqlx::query_as::<_, OutboxEvent>(
        "SELECT id, kind, payload, attempts, created_at, processed_at, last_error FROM outbox WHERE id > ? AND processed_at IS NULL AND attempts < ? ORDER BY id LIMIT ?",
    )
    .bind(after_id)
    .bind(max_attempts)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(events)
}

/// Mark processed; `false` if another drain got there first
pub async fn mark_processed(tx: &mut Tx<'_>, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE outbox SET processed_at = ?1, attempts = attempts + 1, last_error = NULL WHERE id = ?2 AND processed_at IS NULL",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Record a failed attempt; returns the new attempt count
pub async fn record_failure(pool: &SqlitePool, id: i64, error: &str) -> RepoResult<i64> {
    let attempts = sqlx::query_scalar::<_, i64>(
        "UPDATE outbox SET attempts = attempts + 1, last_error = ?1 WHERE id = ?2 RETURNING attempts",
    )
    .bind(error)
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(attempts)
}

pub async fn count_pending(pool: &SqlitePool) -> RepoResult<i64> {
    let count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM outbox WHERE processed_at IS NULL")
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Delete events processed before `before`; parked events are kept
pub async fn delete_processed_before(pool: &SqlitePool, before: i64) -> RepoResult<u64> {
    let result = sqlx::query("DELETE FROM outbox WHERE processed_at IS NOT NULL AND processed_at < ?")
        .bind(before)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
