//! Outbox worker
//!
//! Drains pending outbox events in id order. A notify event fans out and is
//! marked processed in one transaction, so it lands completely or not at
//! all. Failures bump `attempts`; events that reach the ceiling are parked
//! and logged.

use std::sync::Arc;
use std::time::Duration;

use shared::models::Notice;
use sqlx::SqlitePool;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::db::repository::outbox::{self, OutboxEvent, OutboxKind};
use crate::db::repository::notification;
use crate::email::{EmailMessage, Mailer};

const BATCH_SIZE: i64 = 100;

/// Why a single event could not be delivered
#[derive(Debug, thiserror::Error)]
enum DeliveryError {
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error(transparent)]
    Repo(#[from] crate::db::repository::RepoError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Email(#[from] crate::email::EmailError),
}

pub struct OutboxWorker {
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
    wake: Arc<Notify>,
    poll_interval: Duration,
    max_attempts: i64,
    shutdown: CancellationToken,
}

impl OutboxWorker {
    pub fn new(
        pool: SqlitePool,
        mailer: Arc<dyn Mailer>,
        wake: Arc<Notify>,
        poll_interval: Duration,
        max_attempts: i64,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pool,
            mailer,
            wake,
            poll_interval,
            max_attempts,
            shutdown,
        }
    }

    pub async fn run(self) {
        tracing::info!(
            poll_secs = self.poll_interval.as_secs(),
            max_attempts = self.max_attempts,
            "Outbox worker started"
        );

        let mut interval = tokio::time::interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = self.wake.notified() => {}
                _ = interval.tick() => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Outbox worker received shutdown signal");
                    return;
                }
            }

            let processed = drain_once(&self.pool, self.mailer.as_ref(), self.max_attempts).await;
            if processed > 0 {
                tracing::debug!(processed, "Outbox drained");
            }
        }
    }
}

/// Process every event pending at call time; returns how many succeeded
///
/// Each event is attempted at most once per call.
pub async fn drain_once(pool: &SqlitePool, mailer: &dyn Mailer, max_attempts: i64) -> usize {
    let mut processed = 0;
    let mut cursor = 0;

    loop {
        let events = match outbox::fetch_pending(pool, cursor, max_attempts, BATCH_SIZE).await {
            Ok(events) => events,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load pending outbox events");
                return processed;
            }
        };
        let Some(last) = events.last() else {
            return processed;
        };
        cursor = last.id;

        for event in &events {
            match deliver(pool, mailer, event).await {
                Ok(true) => processed += 1,
                Ok(false) => {}
                Err(e) => record_failure(pool, event, &e.to_string(), max_attempts).await,
            }
        }
    }
}

/// `Ok(false)` when another drain already handled the event
async fn deliver(
    pool: &SqlitePool,
    mailer: &dyn Mailer,
    event: &OutboxEvent,
) -> Result<bool, DeliveryError> {
    match event.kind {
        OutboxKind::Notify => {
            let notice: Notice = serde_json::from_str(&event.payload)?;
            let mut tx = pool.begin().await?;
            let recipients = super::resolve_recipients(&mut tx, &notice.audience).await?;
            notification::insert_many(
                &mut tx,
                &recipients,
                &notice.message,
                notice.link.as_deref(),
                &notice.kind,
            )
            .await?;
            if !outbox::mark_processed(&mut tx, event.id).await? {
                return Ok(false);
            }
            tx.commit().await?;
            tracing::debug!(
                event_id = event.id,
                recipients = recipients.len(),
                kind = %notice.kind,
                "Notification fanned out"
            );
            Ok(true)
        }
        OutboxKind::Email => {
            let message: EmailMessage = serde_json::from_str(&event.payload)?;
            mailer.send(&message).await?;
            let mut tx = pool.begin().await?;
            let marked = outbox::mark_processed(&mut tx, event.id).await?;
            tx.commit().await?;
            Ok(marked)
        }
    }
}

async fn record_failure(pool: &SqlitePool, event: &OutboxEvent, error: &str, max_attempts: i64) {
    match outbox::record_failure(pool, event.id, error).await {
        Ok(attempts) if attempts >= max_attempts => {
            tracing::error!(
                event_id = event.id,
                kind = ?event.kind,
                attempts,
                error = %error,
                "Outbox event parked after too many attempts"
            );
        }
        Ok(attempts) => {
            tracing::warn!(
                event_id = event.id,
                kind = ?event.kind,
                attempts,
                error = %error,
                "Outbox event failed, will retry"
            );
        }
        Err(e) => {
            tracing::error!(event_id = event.id, error = %e, "Failed to record outbox failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::user::{self, NewUser};
    use crate::email::{EmailError, LogMailer};
    use async_trait::async_trait;
    use shared::models::{Audience, Role};

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _message: &EmailMessage) -> Result<(), EmailError> {
            Err(EmailError::Rejected {
                status: 503,
                body: "unavailable".into(),
            })
        }
    }

    async fn seed_users(pool: &SqlitePool, roles: &[Role]) {
        for (i, role) in roles.iter().enumerate() {
            let email = format!("user{i}@corp.test");
            user::create(
                pool,
                NewUser {
                    email: &email,
                    password_hash: "x",
                    role: *role,
                    verified: true,
                },
            )
            .await
            .unwrap();
        }
    }

    async fn enqueue(pool: &SqlitePool, notice: &Notice) {
        let mut tx = pool.begin().await.unwrap();
        super::super::enqueue_notification(&mut tx, notice).await.unwrap();
        tx.commit().await.unwrap();
    }

    async fn notification_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn role_audience_reaches_only_that_role() {
        let db = DbService::in_memory().await.unwrap();
        seed_users(&db.pool, &[Role::Hr, Role::Hr, Role::Employee, Role::Admin]).await;

        enqueue(
            &db.pool,
            &Notice::new("Payroll closes Friday", "/payroll", "info", Audience::Role(Role::Hr)),
        )
        .await;

        assert_eq!(drain_once(&db.pool, &LogMailer, 5).await, 1);
        assert_eq!(notification_count(&db.pool).await, 2);
    }

    #[tokio::test]
    async fn second_drain_is_a_no_op() {
        let db = DbService::in_memory().await.unwrap();
        seed_users(&db.pool, &[Role::Employee, Role::Employee, Role::Hr]).await;

        enqueue(&db.pool, &Notice::new("Office closed", "/", "announcement", Audience::All)).await;

        assert_eq!(drain_once(&db.pool, &LogMailer, 5).await, 1);
        assert_eq!(notification_count(&db.pool).await, 3);
        assert_eq!(drain_once(&db.pool, &LogMailer, 5).await, 0);
        assert_eq!(notification_count(&db.pool).await, 3);
    }

    #[tokio::test]
    async fn failed_email_is_retried_then_parked() {
        let db = DbService::in_memory().await.unwrap();
        let mut tx = db.pool.begin().await.unwrap();
        super::super::enqueue_email(
            &mut tx,
            &crate::email::templates::verification_pin("a@b.c", "111111", 15),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(drain_once(&db.pool, &FailingMailer, 2).await, 0);
        assert_eq!(outbox::count_pending(&db.pool).await.unwrap(), 1);
        assert_eq!(drain_once(&db.pool, &FailingMailer, 2).await, 0);
        // Parked: no longer fetched even with a working mailer
        assert_eq!(drain_once(&db.pool, &LogMailer, 2).await, 0);
    }
}
