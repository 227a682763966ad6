//! Notification fan-out through the outbox
//!
//! Callers enqueue a [`Notice`] (or an email) inside the transaction that
//! makes the change, then wake the worker with
//! [`crate::core::ServerState::wake_outbox`]. The [`OutboxWorker`] resolves
//! the audience and writes one notification per recipient.

mod worker;

pub use worker::{OutboxWorker, drain_once};

use shared::models::{Audience, Notice, Role};

use crate::db::repository::outbox::{self, OutboxKind};
use crate::db::repository::{RepoError, RepoResult, Tx, user};
use crate::email::EmailMessage;

/// Queue a notification in the caller's transaction
pub async fn enqueue_notification(tx: &mut Tx<'_>, notice: &Notice) -> RepoResult<i64> {
    let payload = serde_json::to_string(notice)
        .map_err(|e| RepoError::Database(format!("Failed to encode notice: {e}")))?;
    outbox::insert(tx, OutboxKind::Notify, &payload).await
}

/// Queue an email in the caller's transaction
pub async fn enqueue_email(tx: &mut Tx<'_>, message: &EmailMessage) -> RepoResult<i64> {
    let payload = serde_json::to_string(message)
        .map_err(|e| RepoError::Database(format!("Failed to encode email: {e}")))?;
    outbox::insert(tx, OutboxKind::Email, &payload).await
}

/// Shorthand for a notice to a single user
pub fn to_user(user_id: i64, message: impl Into<String>, link: &str, kind: &str) -> Notice {
    Notice::new(message, link, kind, Audience::User(user_id))
}

/// Shorthand for a notice to HR and admins
pub fn to_back_office(message: impl Into<String>, link: &str, kind: &str) -> Notice {
    Notice::new(message, link, kind, Audience::Roles(vec![Role::Admin, Role::Hr]))
}

/// Resolve an audience to user ids
///
/// A single-user audience whose account no longer exists resolves to nobody.
pub async fn resolve_recipients(tx: &mut Tx<'_>, audience: &Audience) -> RepoResult<Vec<i64>> {
    match audience {
        Audience::User(id) => {
            if user::exists(tx, *id).await? {
                Ok(vec![*id])
            } else {
                Ok(Vec::new())
            }
        }
        Audience::Role(role) => user::find_ids_by_roles(tx, std::slice::from_ref(role)).await,
        Audience::Roles(roles) => user::find_ids_by_roles(tx, roles).await,
        Audience::All => user::find_all_ids(tx).await,
    }
}
