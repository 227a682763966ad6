//! Absentee sweep

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::db::repository::{self, RepoResult, attendance, employee};
use crate::notify;
use crate::utils::time::is_weekend;

const ABSENT_REASON: &str = "No check-in recorded";

/// Mark every employee-role user without a record for `date` absent
///
/// Returns how many rows were written. Weekends are skipped. A check-in
/// racing the sweep wins: the insert does nothing on conflict and no
/// notification goes out.
pub async fn mark_absentees(pool: &SqlitePool, date: NaiveDate) -> RepoResult<usize> {
    if is_weekend(date) {
        tracing::debug!(%date, "Weekend, absentee sweep skipped");
        return Ok(0);
    }

    let missing = employee::find_unchecked(pool, date).await?;
    let mut marked = 0;
    for profile in missing {
        let user_id = profile.employee.user_id;
        let mut tx = repository::begin(pool).await?;
        if attendance::insert_absent(&mut tx, user_id, date, ABSENT_REASON).await? {
            let notice = notify::to_user(
                user_id,
                format!("You were marked absent for {date}"),
                "/attendance",
                "attendance",
            );
            notify::enqueue_notification(&mut tx, &notice).await?;
            marked += 1;
        }
        repository::commit(tx).await?;
    }

    tracing::info!(%date, marked, "Absentee sweep finished");
    Ok(marked)
}
