use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio::sync::Notify;

use crate::auth::JwtService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result};
use crate::db::DbService;
use crate::email::{self, LogMailer, Mailer};
use crate::jobs::scheduler::{JobScheduler, Schedule};
use crate::notify::OutboxWorker;

/// Timeout for outbound HTTP calls (mail, Google, GitHub)
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared server state
///
/// Cheap to clone; every field is shared.
///
/// | Field | Description |
/// |-------|-------------|
/// | config | immutable configuration |
/// | pool | SQLite connection pool |
/// | jwt_service | token issue/validation |
/// | mailer | outbound mail, used by the outbox worker |
/// | http | outbound HTTP client |
/// | outbox_notify | wakes the outbox worker after an enqueue |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub mailer: Arc<dyn Mailer>,
    pub http: reqwest::Client,
    pub outbox_notify: Arc<Notify>,
}

impl ServerState {
    /// Open the database, apply migrations and build the shared services
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_url).await?;
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        let mailer = email::from_config(&config.mail, http.clone());

        Ok(Self {
            config: config.clone(),
            pool: db.pool,
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            mailer,
            http,
            outbox_notify: Arc::new(Notify::new()),
        })
    }

    /// State over an existing pool with a logging mailer (tests, tools)
    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        Self {
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            config,
            pool,
            mailer: Arc::new(LogMailer),
            http: reqwest::Client::new(),
            outbox_notify: Arc::new(Notify::new()),
        }
    }

    /// Wake the outbox worker after committing enqueued events
    pub fn wake_outbox(&self) {
        self.outbox_notify.notify_one();
    }

    /// Register the outbox worker and the scheduled jobs
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let worker = OutboxWorker::new(
            self.pool.clone(),
            self.mailer.clone(),
            self.outbox_notify.clone(),
            Duration::from_secs(self.config.outbox_poll_secs.max(1)),
            self.config.outbox_max_attempts,
            tasks.shutdown_token(),
        );
        tasks.spawn("outbox_worker", TaskKind::Worker, worker.run());

        let scheduler = JobScheduler::new(self.clone(), tasks.shutdown_token());
        tasks.spawn(
            "absentee_sweep",
            TaskKind::Periodic,
            scheduler.clone().run(Schedule::ABSENTEE_SWEEP),
        );
        tasks.spawn(
            "overdue_sweep",
            TaskKind::Periodic,
            scheduler.clone().run(Schedule::OVERDUE_SWEEP),
        );
        tasks.spawn(
            "leave_rollover",
            TaskKind::Periodic,
            scheduler.clone().run(Schedule::LEAVE_ROLLOVER),
        );
        tasks.spawn(
            "outbox_cleanup",
            TaskKind::Periodic,
            scheduler.run(Schedule::OUTBOX_CLEANUP),
        );

        tasks.log_summary();
        tasks
    }
}
