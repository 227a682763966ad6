//! Outbox cleanup
//!
//! Delivered events only matter for a short audit window. Unprocessed and
//! parked events are never touched.

use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, outbox};

pub const OUTBOX_RETENTION_DAYS: i64 = 7;

/// Drop events delivered more than [`OUTBOX_RETENTION_DAYS`] before `now_millis`
pub async fn prune(pool: &SqlitePool, now_millis: i64) -> RepoResult<u64> {
    let cutoff = now_millis - OUTBOX_RETENTION_DAYS * 24 * 60 * 60 * 1000;
    let removed = outbox::delete_processed_before(pool, cutoff).await?;
    tracing::info!(removed, retention_days = OUTBOX_RETENTION_DAYS, "Outbox cleanup finished");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{self, outbox::OutboxKind};

    const DAY: i64 = 24 * 60 * 60 * 1000;

    async fn event(pool: &SqlitePool, processed_at: Option<i64>) -> i64 {
        let mut tx = repository::begin(pool).await.unwrap();
        let id = outbox::insert(&mut tx, OutboxKind::Email, "{}").await.unwrap();
        repository::commit(tx).await.unwrap();
        sqlx::query("UPDATE outbox SET processed_at = ? WHERE id = ?")
            .bind(processed_at)
            .bind(id)
            .execute(pool)
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn only_old_delivered_events_are_removed() {
        let db = DbService::in_memory().await.unwrap();
        let now = 100 * DAY;
        event(&db.pool, Some(now - 30 * DAY)).await;
        let recent = event(&db.pool, Some(now - DAY)).await;
        let pending = event(&db.pool, None).await;

        assert_eq!(prune(&db.pool, now).await.unwrap(), 1);
        assert_eq!(prune(&db.pool, now).await.unwrap(), 0);

        let left: Vec<i64> = sqlx::query_scalar("SELECT id FROM outbox ORDER BY id")
            .fetch_all(&db.pool)
            .await
            .unwrap();
        assert_eq!(left, vec![recent, pending]);
    }
}
