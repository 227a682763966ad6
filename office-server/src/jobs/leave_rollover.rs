//! Yearly leave balance rollover

use shared::models::{Audience, Notice};
use sqlx::SqlitePool;

use crate::db::repository::{self, RepoResult, leave};
use crate::notify;

/// Create `year` balances for every employee missing one, then tell everyone
///
/// Returns the number of balances created.
pub async fn roll_over(pool: &SqlitePool, year: i32, available_leaves: i32) -> RepoResult<u64> {
    let created = leave::create_missing_for_year(pool, year, available_leaves).await?;

    let mut tx = repository::begin(pool).await?;
    let notice = Notice::new(
        format!("Leave balances for {year} are available: {available_leaves} paid days"),
        "/leave",
        "leave",
        Audience::All,
    );
    notify::enqueue_notification(&mut tx, &notice).await?;
    repository::commit(tx).await?;

    tracing::info!(year, created, "Leave balances rolled over");
    Ok(created)
}
