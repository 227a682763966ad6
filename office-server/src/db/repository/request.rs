//! Request Repository
//!
//! A request is the `requests` envelope plus one row in the subtype table
//! matching its `request_type`. State transitions are conditional updates
//! on `status = 'pending'`, so a lost race shows up as zero affected rows.

use super::{RepoError, RepoResult, Tx};
use shared::models::{
    AllowancePayload, ApprovalStatus, AttendancePayload, LeavePayload, OvertimePayload, Request,
    RequestDetail, RequestPayload, RequestSummary, RequestType,
};
use sqlx::SqlitePool;

const REQUEST_SELECT: &str = "SELECT id, user_id, request_type, status, pm_status, requested_to, created_at, updated_at FROM requests";

const SUMMARY_SELECT: &str = "SELECT r.id, r.user_id, r.request_type, r.status, r.pm_status, r.requested_to, r.created_at, r.updated_at, e.name AS employee_name, e.position AS employee_position FROM requests r LEFT JOIN employees e ON e.user_id = r.user_id";

/// Listing filters; `None` means "any"
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub user_id: Option<i64>,
    pub requested_to: Option<i64>,
    pub status: Option<ApprovalStatus>,
    pub request_type: Option<RequestType>,
    /// Inclusive lower bound on `created_at` (millis)
    pub created_from: Option<i64>,
    /// Exclusive upper bound on `created_at` (millis)
    pub created_to: Option<i64>,
}

/// Insert the envelope and its subtype row
pub async fn insert(
    tx: &mut Tx<'_>,
    user_id: i64,
    payload: &RequestPayload,
    pm_status: ApprovalStatus,
    requested_to: Option<i64>,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO requests (id, user_id, request_type, status, pm_status, requested_to, created_at, updated_at) VALUES (?1, ?2, ?3, 'pending', ?4, ?5, ?6, ?6)",
    )
    .bind(id)
    .bind(user_id)
    .bind(payload.request_type())
    .bind(pm_status)
    .bind(requested_to)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    match payload {
        RequestPayload::Leave(leave) => {
            sqlx::query(
                "INSERT INTO leave_requests (request_id, leave_type, start_date, end_date, reason) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(&leave.leave_type)
            .bind(leave.start_date)
            .bind(leave.end_date)
            .bind(&leave.reason)
            .execute(&mut **tx)
            .await?;
        }
        RequestPayload::Allowance(allowance) => {
            sqlx::query(
                "INSERT INTO allowance_requests (request_id, amount, reason, date) VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(allowance.amount)
            .bind(&allowance.reason)
            .bind(allowance.date)
            .execute(&mut **tx)
            .await?;
        }
        RequestPayload::Overtime(overtime) => {
            sqlx::query(
                "INSERT INTO overtime_requests (request_id, date, start_time, end_time, reason) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(overtime.date)
            .bind(&overtime.start_time)
            .bind(&overtime.end_time)
            .bind(&overtime.reason)
            .execute(&mut **tx)
            .await?;
        }
        RequestPayload::Attendance(attendance) => {
            sqlx::query("INSERT INTO attendance_requests (request_id, date, reason) VALUES (?, ?, ?)")
                .bind(id)
                .bind(attendance.date)
                .bind(&attendance.reason)
                .execute(&mut **tx)
                .await?;
        }
    }

    Ok(id)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Request>> {
    let request = sqlx::query_as::<_, Request>(&format!("{REQUEST_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(request)
}

/// Envelope re-read inside a transaction
pub async fn find_in_tx(tx: &mut Tx<'_>, id: i64) -> RepoResult<Request> {
    sqlx::query_as::<_, Request>(&format!("{REQUEST_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Request {id} not found")))
}

/// Subtype row for a request
pub async fn find_payload(
    tx: &mut Tx<'_>,
    id: i64,
    request_type: RequestType,
) -> RepoResult<Option<RequestPayload>> {
    let payload = match request_type {
        RequestType::Leave => sqlx::query_as::<_, LeavePayload>(
            "SELECT leave_type, start_date, end_date, reason FROM leave_requests WHERE request_id = ?",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .map(RequestPayload::Leave),
        RequestType::Allowance => sqlx::query_as::<_, AllowancePayload>(
            "SELECT amount, reason, date FROM allowance_requests WHERE request_id = ?",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .map(RequestPayload::Allowance),
        RequestType::Overtime => sqlx::query_as::<_, OvertimePayload>(
            "SELECT date, start_time, end_time, reason FROM overtime_requests WHERE request_id = ?",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .map(RequestPayload::Overtime),
        RequestType::Attendance => sqlx::query_as::<_, AttendancePayload>(
            "SELECT date, reason FROM attendance_requests WHERE request_id = ?",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .map(RequestPayload::Attendance),
    };
    Ok(payload)
}

/// Envelope, employee and subtype data
pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<RequestDetail>> {
    let mut tx = pool.begin().await?;
    let summary = sqlx::query_as::<_, RequestSummary>(&format!("{SUMMARY_SELECT} WHERE r.id = ?"))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(summary) = summary else {
        return Ok(None);
    };
    let details = find_payload(&mut tx, id, summary.request.request_type).await?;
    tx.commit().await?;
    Ok(Some(RequestDetail { summary, details }))
}

/// Envelopes joined with the employee, newest first
pub async fn list_with_employee(
    pool: &SqlitePool,
    filter: &RequestFilter,
) -> RepoResult<Vec<RequestSummary>> {
    let sql = format!(
        "{SUMMARY_SELECT} \
         WHERE (?1 IS NULL OR r.user_id = ?1) \
         AND (?2 IS NULL OR r.requested_to = ?2) \
         AND (?3 IS NULL OR r.status = ?3) \
         AND (?4 IS NULL OR r.request_type = ?4) \
         AND (?5 IS NULL OR r.created_at >= ?5) \
         AND (?6 IS NULL OR r.created_at < ?6) \
         ORDER BY r.created_at DESC, r.id DESC"
    );
    let requests = sqlx::query_as::<_, RequestSummary>(&sql)
        .bind(filter.user_id)
        .bind(filter.requested_to)
        .bind(filter.status)
        .bind(filter.request_type)
        .bind(filter.created_from)
        .bind(filter.created_to)
        .fetch_all(pool)
        .await?;
    Ok(requests)
}

/// Stage-1 decision; `false` when the request is no longer pending
///
/// A rejection closes the request at the same time.
pub async fn set_pm_status(
    tx: &mut Tx<'_>,
    id: i64,
    pm_status: ApprovalStatus,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE requests SET pm_status = ?1, status = CASE WHEN ?1 = 'rejected' THEN 'rejected' ELSE status END, updated_at = ?2 WHERE id = ?3 AND status = 'pending' AND pm_status = 'pending'",
    )
    .bind(pm_status)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Stage-2 decision; `false` when the request is no longer pending
pub async fn set_status(tx: &mut Tx<'_>, id: i64, status: ApprovalStatus) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE requests SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = 'pending' AND (requested_to IS NULL OR pm_status = 'approved')",
    )
    .bind(status)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a request still awaiting every stage; `false` otherwise
pub async fn delete_pending(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query(
        "DELETE FROM requests WHERE id = ? AND status = 'pending' AND (requested_to IS NULL OR pm_status = 'pending')",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
