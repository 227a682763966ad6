//! NextOfficeFlow server - office and HR backend
//!
//! # Overview
//!
//! REST API over SQLite for accounts, employee records, attendance,
//! leave/allowance/overtime requests, projects and tickets, announcements,
//! calendar events, appraisals and reviews. Notifications and emails go
//! through a transactional outbox drained by a background worker.
//!
//! # Module layout
//!
//! ```text
//! office-server/src/
//! ├── core/          # config, shared state, server, background tasks
//! ├── auth/          # JWT, signed cookie, role gates, password hashing
//! ├── api/           # HTTP routes and handlers
//! ├── db/            # connection pool, migrations, repositories
//! ├── attendance/    # check-in/out and break rules
//! ├── workflow/      # request approval and leave accounting
//! ├── notify/        # outbox enqueue and worker
//! ├── email/         # mailers and templates
//! ├── integrations/  # Google sign-in, GitHub
//! ├── jobs/          # scheduled sweeps
//! └── utils/         # errors, logging, time, validation
//! ```

pub mod api;
pub mod attendance;
pub mod auth;
pub mod core;
pub mod db;
pub mod email;
pub mod integrations;
pub mod jobs;
pub mod notify;
pub mod utils;
pub mod workflow;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use db::DbService;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
