//! Overdue sweep
//!
//! Past-due projects and tickets are flipped to `overdue` once; the
//! notifications ride on that transition, so a re-run is silent. Items due
//! within [`REMINDER_WINDOW_DAYS`] get a reminder every run without any
//! state change.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use shared::models::{Audience, Notice, Project, Role, Ticket};
use sqlx::SqlitePool;

use crate::db::repository::{self, RepoResult, Tx, project, ticket};
use crate::notify;

pub const REMINDER_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverdueReport {
    pub projects_flagged: usize,
    pub tickets_flagged: usize,
    pub reminders: usize,
}

pub async fn sweep(pool: &SqlitePool, today: NaiveDate) -> RepoResult<OverdueReport> {
    let mut report = OverdueReport::default();

    for item in project::find_past_due(pool, today).await? {
        let mut tx = repository::begin(pool).await?;
        if project::mark_overdue(&mut tx, item.id).await? {
            let message = format!("Project \"{}\" is overdue (ended {})", item.title, item.end_date);
            notify_overdue(&mut tx, &message, &format!("/project/{}", item.id), project_members(&item)).await?;
            report.projects_flagged += 1;
        }
        repository::commit(tx).await?;
    }

    for item in ticket::find_past_due(pool, today).await? {
        let mut tx = repository::begin(pool).await?;
        if ticket::mark_overdue(&mut tx, item.id).await? {
            let due = item.due_date.map(|d| d.to_string()).unwrap_or_default();
            let message = format!("Ticket \"{}\" is overdue (due {due})", item.title);
            notify_overdue(&mut tx, &message, &format!("/ticket/{}", item.id), ticket_members(&item)).await?;
            report.tickets_flagged += 1;
        }
        repository::commit(tx).await?;
    }

    let horizon = today + Duration::days(REMINDER_WINDOW_DAYS);
    let projects_due = project::find_due_between(pool, today, horizon).await?;
    let tickets_due = ticket::find_due_between(pool, today, horizon).await?;
    if !projects_due.is_empty() || !tickets_due.is_empty() {
        let mut tx = repository::begin(pool).await?;
        for item in &projects_due {
            let message = format!("Project \"{}\" is due on {}", item.title, item.end_date);
            report.reminders += remind(&mut tx, &message, &format!("/project/{}", item.id), project_members(item)).await?;
        }
        for item in &tickets_due {
            let due = item.due_date.map(|d| d.to_string()).unwrap_or_default();
            let message = format!("Ticket \"{}\" is due on {due}", item.title);
            report.reminders += remind(&mut tx, &message, &format!("/ticket/{}", item.id), ticket_members(item)).await?;
        }
        repository::commit(tx).await?;
    }

    tracing::info!(
        %today,
        projects = report.projects_flagged,
        tickets = report.tickets_flagged,
        reminders = report.reminders,
        "Overdue sweep finished"
    );
    Ok(report)
}

fn project_members(item: &Project) -> BTreeSet<i64> {
    let mut members: BTreeSet<i64> = item.assignees.iter().copied().collect();
    members.insert(item.user_id);
    members
}

fn ticket_members(item: &Ticket) -> BTreeSet<i64> {
    let mut members = BTreeSet::from([item.reporter_id]);
    members.extend(item.assignee_id);
    members
}

/// Admins plus every member
async fn notify_overdue(
    tx: &mut Tx<'_>,
    message: &str,
    link: &str,
    members: BTreeSet<i64>,
) -> RepoResult<()> {
    let admins = Notice::new(message, link, "overdue", Audience::Role(Role::Admin));
    notify::enqueue_notification(tx, &admins).await?;
    for user_id in members {
        notify::enqueue_notification(tx, &notify::to_user(user_id, message, link, "overdue")).await?;
    }
    Ok(())
}

async fn remind(
    tx: &mut Tx<'_>,
    message: &str,
    link: &str,
    members: BTreeSet<i64>,
) -> RepoResult<usize> {
    let count = members.len();
    for user_id in members {
        notify::enqueue_notification(tx, &notify::to_user(user_id, message, link, "reminder")).await?;
    }
    Ok(count)
}
