//! Notification Repository

use super::{RepoError, RepoResult, Tx};
use shared::models::Notification;
use sqlx::SqlitePool;

/// Default page size for the notification feed
pub const DEFAULT_LIMIT: i64 = 50;

/// Write one unseen notification per recipient
pub async fn insert_many(
    tx: &mut Tx<'_>,
    user_ids: &[i64],
    message: &str,
    link: Option<&str>,
    kind: &str,
) -> RepoResult<usize> {
    let now = shared::util::now_millis();
    for user_id in user_ids {
        sqlx::query(
            "INSERT INTO notifications (id, user_id, message, link, kind, is_seen, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6)",
        )
        .bind(shared::util::snowflake_id())
        .bind(user_id)
        .bind(message)
        .bind(link)
        .bind(kind)
        .bind(now)
        .execute(&mut **tx)
        .await?;
    }
    Ok(user_ids.len())
}

/// Newest first
pub async fn list_for_user(pool: &SqlitePool, user_id: i64, limit: i64) -> RepoResult<Vec<Notification>> {
    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT id, user_id, message, link, kind, is_seen, created_at, updated_at FROM notifications WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(notifications)
}

pub async fn count_unseen(pool: &SqlitePool, user_id: i64) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = ? AND is_seen = 0",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn mark_all_seen(pool: &SqlitePool, user_id: i64) -> RepoResult<u64> {
    let result = sqlx::query(
        "UPDATE notifications SET is_seen = 1, updated_at = ?1 WHERE user_id = ?2 AND is_seen = 0",
    )
    .bind(shared::util::now_millis())
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Mark one of the caller's own notifications seen
pub async fn mark_seen(pool: &SqlitePool, id: i64, user_id: i64) -> RepoResult<()> {
    let result = sqlx::query(
        "UPDATE notifications SET is_seen = 1, updated_at = ?1 WHERE id = ?2 AND user_id = ?3",
    )
    .bind(shared::util::now_millis())
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Notification {id} not found")));
    }
    Ok(())
}
