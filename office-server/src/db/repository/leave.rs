//! Leave Balance Repository

use super::{RepoError, RepoResult, Tx};
use shared::models::LeaveDetail;
use sqlx::SqlitePool;

const LEAVE_SELECT: &str = "SELECT id, user_id, year, available_leaves, leaves_taken, total_paid_leave_taken, total_unpaid_leave_taken FROM leave_details";

pub async fn find(pool: &SqlitePool, user_id: i64, year: i32) -> RepoResult<Option<LeaveDetail>> {
    let detail = sqlx::query_as::<_, LeaveDetail>(&format!(
        "{LEAVE_SELECT} WHERE user_id = ? AND year = ?"
    ))
    .bind(user_id)
    .bind(year)
    .fetch_optional(pool)
    .await?;
    Ok(detail)
}

/// Most recent balance for a user
pub async fn find_latest(pool: &SqlitePool, user_id: i64) -> RepoResult<Option<LeaveDetail>> {
    let detail = sqlx::query_as::<_, LeaveDetail>(&format!(
        "{LEAVE_SELECT} WHERE user_id = ? ORDER BY year DESC LIMIT 1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(detail)
}

/// Insert a balance row if the (user, year) pair has none
pub async fn insert_if_missing(
    tx: &mut Tx<'_>,
    user_id: i64,
    year: i32,
    available_leaves: i32,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "INSERT INTO leave_details (id, user_id, year, available_leaves) VALUES (?1, ?2, ?3, ?4) ON CONFLICT (user_id, year) DO NOTHING",
    )
    .bind(shared::util::snowflake_id())
    .bind(user_id)
    .bind(year)
    .bind(available_leaves)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Balance for `year`, created with `available_leaves` when missing
pub async fn ensure_for_year(
    tx: &mut Tx<'_>,
    user_id: i64,
    year: i32,
    available_leaves: i32,
) -> RepoResult<LeaveDetail> {
    insert_if_missing(tx, user_id, year, available_leaves).await?;
    let detail = sqlx::query_as::<_, LeaveDetail>(&format!(
        "{LEAVE_SELECT} WHERE user_id = ? AND year = ?"
    ))
    .bind(user_id)
    .bind(year)
    .fetch_one(&mut **tx)
    .await?;
    Ok(detail)
}

/// Persist the counters of an allocated balance
pub async fn save_counters(tx: &mut Tx<'_>, detail: &LeaveDetail) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE leave_details SET leaves_taken = ?1, total_paid_leave_taken = ?2, total_unpaid_leave_taken = ?3 WHERE id = ?4",
    )
    .bind(detail.leaves_taken)
    .bind(detail.total_paid_leave_taken)
    .bind(detail.total_unpaid_leave_taken)
    .bind(detail.id)
    .execute(&mut **tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Leave detail {} not found",
            detail.id
        )));
    }
    Ok(())
}

/// Create balances for every employee lacking one for `year`
///
/// Returns the number of rows created.
pub async fn create_missing_for_year(
    pool: &SqlitePool,
    year: i32,
    available_leaves: i32,
) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;
    let user_ids = sqlx::query_scalar::<_, i64>(
        "SELECT e.user_id FROM employees e WHERE NOT EXISTS (SELECT 1 FROM leave_details l WHERE l.user_id = e.user_id AND l.year = ?) ORDER BY e.user_id",
    )
    .bind(year)
    .fetch_all(&mut *tx)
    .await?;

    let mut created = 0;
    for user_id in user_ids {
        if insert_if_missing(&mut tx, user_id, year, available_leaves).await? {
            created += 1;
        }
    }
    tx.commit().await?;
    Ok(created)
}
