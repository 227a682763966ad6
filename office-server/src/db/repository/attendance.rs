//! Attendance Repository
//!
//! One row per (user, day) enforced by a unique index. Breaks are child rows
//! and are loaded alongside the parent record.

use super::{RepoError, RepoResult, Tx};
use chrono::NaiveDate;
use shared::models::{
    Attendance, AttendanceBreak, AttendanceEntry, AttendanceStatus, AttendanceType,
    CheckInStatus, CheckOutStatus,
};
use sqlx::SqlitePool;

const ATTENDANCE_COLUMNS: &str = "a.id, a.user_id, a.date, a.check_in, a.check_out, a.attendance_type, a.location, a.lat, a.lng, a.check_in_status, a.check_out_status, a.overtime, a.status, a.reason, a.created_at, a.updated_at";

/// Check-in fields written by the upsert
#[derive(Debug, Clone)]
pub struct CheckIn {
    pub check_in: i64,
    pub check_in_status: CheckInStatus,
    pub attendance_type: Option<AttendanceType>,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Full record written by manual entry and corrections
#[derive(Debug, Clone)]
pub struct AttendanceRecord {
    pub status: AttendanceStatus,
    pub reason: Option<String>,
    pub check_in: Option<i64>,
    pub check_out: Option<i64>,
    pub check_in_status: Option<CheckInStatus>,
    pub check_out_status: Option<CheckOutStatus>,
    pub overtime: bool,
    pub attendance_type: Option<AttendanceType>,
    pub location: Option<String>,
}

/// Listing filters; `None` means "any"
#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub user_id: Option<i64>,
    /// Inclusive
    pub from: Option<NaiveDate>,
    /// Inclusive
    pub to: Option<NaiveDate>,
    pub late: Option<bool>,
    pub overtime: Option<bool>,
    /// Substring of the employee name
    pub search: Option<String>,
}

async fn load_breaks(pool: &SqlitePool, attendance: &mut Attendance) -> RepoResult<()> {
    attendance.breaks = sqlx::query_as::<_, AttendanceBreak>(
        "SELECT id, attendance_id, break_in, break_out FROM attendance_breaks WHERE attendance_id = ? ORDER BY id",
    )
    .bind(attendance.id)
    .fetch_all(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Attendance>> {
    let record = sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance a WHERE a.id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    match record {
        Some(mut attendance) => {
            load_breaks(pool, &mut attendance).await?;
            Ok(Some(attendance))
        }
        None => Ok(None),
    }
}

pub async fn find_for_day(
    pool: &SqlitePool,
    user_id: i64,
    date: NaiveDate,
) -> RepoResult<Option<Attendance>> {
    let record = sqlx::query_as::<_, Attendance>(&format!(
        "SELECT {ATTENDANCE_COLUMNS} FROM attendance a WHERE a.user_id = ? AND a.date = ?"
    ))
    .bind(user_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;
    match record {
        Some(mut attendance) => {
            load_breaks(pool, &mut attendance).await?;
            Ok(Some(attendance))
        }
        None => Ok(None),
    }
}

/// Insert or refresh the day's check-in
///
/// An absent row written by the sweep is turned into a present one. A row
/// that already has a check-out is left untouched.
pub async fn upsert_check_in(
    pool: &SqlitePool,
    user_id: i64,
    date: NaiveDate,
    data: &CheckIn,
) -> RepoResult<Attendance> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO attendance (id, user_id, date, check_in, check_in_status, attendance_type, location, lat, lng, status, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'present', ?10, ?10) \
         ON CONFLICT (user_id, date) DO UPDATE SET check_in = excluded.check_in, check_in_status = excluded.check_in_status, attendance_type = excluded.attendance_type, location = excluded.location, lat = excluded.lat, lng = excluded.lng, status = 'present', updated_at = excluded.updated_at WHERE attendance.check_out IS NULL",
    )
    .bind(shared::util::snowflake_id())
    .bind(user_id)
    .bind(date)
    .bind(data.check_in)
    .bind(data.check_in_status)
    .bind(data.attendance_type)
    .bind(&data.location)
    .bind(data.lat)
    .bind(data.lng)
    .bind(now)
    .execute(pool)
    .await?;

    find_for_day(pool, user_id, date)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to record check-in".into()))
}

/// Record the check-out; `false` when the row was already checked out
pub async fn set_check_out(
    pool: &SqlitePool,
    id: i64,
    check_out: i64,
    status: CheckOutStatus,
    overtime: bool,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE attendance SET check_out = ?1, check_out_status = ?2, overtime = ?3, updated_at = ?4 WHERE id = ?5 AND check_in IS NOT NULL AND check_out IS NULL",
    )
    .bind(check_out)
    .bind(status)
    .bind(overtime)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Append a break unless the record already holds `max_breaks`
///
/// Returns `None` when the limit is reached.
pub async fn insert_break(
    pool: &SqlitePool,
    attendance_id: i64,
    break_in: &str,
    break_out: &str,
    max_breaks: i64,
) -> RepoResult<Option<AttendanceBreak>> {
    let mut tx = pool.begin().await?;
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance_breaks WHERE attendance_id = ?",
    )
    .bind(attendance_id)
    .fetch_one(&mut *tx)
    .await?;
    if count >= max_breaks {
        return Ok(None);
    }

    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO attendance_breaks (id, attendance_id, break_in, break_out) VALUES (?, ?, ?, ?)",
    )
    .bind(id)
    .bind(attendance_id)
    .bind(break_in)
    .bind(break_out)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(Some(AttendanceBreak {
        id,
        attendance_id,
        break_in: break_in.to_string(),
        break_out: break_out.to_string(),
    }))
}

/// Insert a full record; duplicate (user, day) is an error
pub async fn insert(
    tx: &mut Tx<'_>,
    user_id: i64,
    date: NaiveDate,
    data: &AttendanceRecord,
) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO attendance (id, user_id, date, check_in, check_out, attendance_type, location, check_in_status, check_out_status, overtime, status, reason, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
    )
    .bind(id)
    .bind(user_id)
    .bind(date)
    .bind(data.check_in)
    .bind(data.check_out)
    .bind(data.attendance_type)
    .bind(&data.location)
    .bind(data.check_in_status)
    .bind(data.check_out_status)
    .bind(data.overtime)
    .bind(data.status)
    .bind(&data.reason)
    .bind(now)
    .execute(&mut **tx)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Attendance for {date} already exists"))
        }
        other => other,
    })?;
    Ok(id)
}

/// Overwrite the mutable fields of a record
pub async fn update(pool: &SqlitePool, id: i64, data: &AttendanceRecord) -> RepoResult<Attendance> {
    let rows = sqlx::query(
        "UPDATE attendance SET status = ?1, reason = ?2, check_in = ?3, check_out = ?4, check_in_status = ?5, check_out_status = ?6, overtime = ?7, attendance_type = ?8, location = ?9, updated_at = ?10 WHERE id = ?11",
    )
    .bind(data.status)
    .bind(&data.reason)
    .bind(data.check_in)
    .bind(data.check_out)
    .bind(data.check_in_status)
    .bind(data.check_out_status)
    .bind(data.overtime)
    .bind(data.attendance_type)
    .bind(&data.location)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Attendance {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Attendance {id} not found")))
}

/// Mark a user absent unless a record already exists; `true` when inserted
pub async fn insert_absent(
    tx: &mut Tx<'_>,
    user_id: i64,
    date: NaiveDate,
    reason: &str,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let result = sqlx::query(
        "INSERT INTO attendance (id, user_id, date, status, reason, created_at, updated_at) VALUES (?1, ?2, ?3, 'absent', ?4, ?5, ?5) ON CONFLICT (user_id, date) DO NOTHING",
    )
    .bind(shared::util::snowflake_id())
    .bind(user_id)
    .bind(date)
    .bind(reason)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Records joined with the employee, newest first
pub async fn list_with_employee(
    pool: &SqlitePool,
    filter: &AttendanceFilter,
) -> RepoResult<Vec<AttendanceEntry>> {
    let sql = format!(
        "SELECT {ATTENDANCE_COLUMNS}, e.name AS employee_name, e.position AS employee_position, u.email AS employee_email \
         FROM attendance a LEFT JOIN employees e ON e.user_id = a.user_id LEFT JOIN users u ON u.id = a.user_id \
         WHERE (?1 IS NULL OR a.user_id = ?1) \
         AND (?2 IS NULL OR a.date >= ?2) \
         AND (?3 IS NULL OR a.date <= ?3) \
         AND (?4 IS NULL OR COALESCE(a.check_in_status = 'late', 0) = ?4) \
         AND (?5 IS NULL OR a.overtime = ?5) \
         AND (?6 IS NULL OR e.name LIKE '%' || ?6 || '%') \
         ORDER BY a.date DESC, a.id DESC"
    );
    let mut entries = sqlx::query_as::<_, AttendanceEntry>(&sql)
        .bind(filter.user_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.late)
        .bind(filter.overtime)
        .bind(filter.search.as_deref())
        .fetch_all(pool)
        .await?;

    for entry in &mut entries {
        load_breaks(pool, &mut entry.attendance).await?;
    }
    Ok(entries)
}

/// (present, absent, late) counts for one day
pub async fn count_for_day(pool: &SqlitePool, date: NaiveDate) -> RepoResult<(i64, i64, i64)> {
    let counts = sqlx::query_as::<_, (i64, i64, i64)>(
        "SELECT COALESCE(SUM(status = 'present'), 0), COALESCE(SUM(status = 'absent'), 0), COALESCE(SUM(check_in_status = 'late'), 0) FROM attendance WHERE date = ?",
    )
    .bind(date)
    .fetch_one(pool)
    .await?;
    Ok(counts)
}

/// Per-user day counts used by appraisal measures: (present, absent, remote, onsite)
pub async fn count_for_user(pool: &SqlitePool, user_id: i64) -> RepoResult<(i64, i64, i64, i64)> {
    let counts = sqlx::query_as::<_, (i64, i64, i64, i64)>(
        "SELECT COALESCE(SUM(status = 'present'), 0), COALESCE(SUM(status = 'absent'), 0), COALESCE(SUM(attendance_type = 'remote'), 0), COALESCE(SUM(attendance_type = 'onsite'), 0) FROM attendance WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(counts)
}
