//! Data models
//!
//! Shared between office-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY). Wire names are camelCase.

pub mod announcement;
pub mod appraisal;
pub mod attendance;
pub mod comment;
pub mod employee;
pub mod event;
pub mod leave;
pub mod notification;
pub mod project;
pub mod request;
pub mod ticket;
pub mod user;

// Re-exports
pub use announcement::*;
pub use appraisal::*;
pub use attendance::*;
pub use comment::*;
pub use employee::*;
pub use event::*;
pub use leave::*;
pub use notification::*;
pub use project::*;
pub use request::*;
pub use ticket::*;
pub use user::*;
