//! Employee Repository

use super::{RepoError, RepoResult, Tx};
use chrono::NaiveDate;
use shared::models::{EmployeeCreate, EmployeeProfile, EmployeeUpdate, Role};
use sqlx::SqlitePool;
use sqlx::types::Json;

const PROFILE_SELECT: &str = "SELECT e.id, e.user_id, e.name, e.position, e.department, e.team, e.manager, e.description, e.github_username, e.salary, e.start_date, e.end_date, e.work_from, e.work_to, e.status, e.documents, e.created_at, e.updated_at, u.email, u.role FROM employees e JOIN users u ON u.id = e.user_id";

pub async fn insert(tx: &mut Tx<'_>, user_id: i64, data: &EmployeeCreate) -> RepoResult<i64> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO employees (id, user_id, name, position, department, team, manager, description, github_username, salary, start_date, end_date, work_from, work_to, status, documents, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)",
    )
    .bind(id)
    .bind(user_id)
    .bind(&data.name)
    .bind(&data.position)
    .bind(&data.department)
    .bind(&data.team)
    .bind(&data.manager)
    .bind(&data.description)
    .bind(&data.github_username)
    .bind(data.salary)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(&data.work_from)
    .bind(&data.work_to)
    .bind(&data.status)
    .bind(Json(&data.documents))
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(id)
}

pub async fn find_profile(pool: &SqlitePool, id: i64) -> RepoResult<Option<EmployeeProfile>> {
    let profile = sqlx::query_as::<_, EmployeeProfile>(&format!("{PROFILE_SELECT} WHERE e.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(profile)
}

pub async fn find_profile_by_user(
    pool: &SqlitePool,
    user_id: i64,
) -> RepoResult<Option<EmployeeProfile>> {
    let profile =
        sqlx::query_as::<_, EmployeeProfile>(&format!("{PROFILE_SELECT} WHERE e.user_id = ?"))
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(profile)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<EmployeeProfile>> {
    let profiles = sqlx::query_as::<_, EmployeeProfile>(&format!("{PROFILE_SELECT} ORDER BY e.name"))
        .fetch_all(pool)
        .await?;
    Ok(profiles)
}

pub async fn find_by_role(pool: &SqlitePool, role: Role) -> RepoResult<Vec<EmployeeProfile>> {
    let profiles = sqlx::query_as::<_, EmployeeProfile>(&format!(
        "{PROFILE_SELECT} WHERE u.role = ? ORDER BY e.name"
    ))
    .bind(role)
    .fetch_all(pool)
    .await?;
    Ok(profiles)
}

/// Employee-role staff with no attendance row for `date`
pub async fn find_unchecked(pool: &SqlitePool, date: NaiveDate) -> RepoResult<Vec<EmployeeProfile>> {
    let profiles = sqlx::query_as::<_, EmployeeProfile>(&format!(
        "{PROFILE_SELECT} WHERE u.role = 'employee' AND NOT EXISTS (SELECT 1 FROM attendance a WHERE a.user_id = e.user_id AND a.date = ?) ORDER BY e.name"
    ))
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(profiles)
}

pub async fn count_staff(pool: &SqlitePool) -> RepoResult<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM employees e JOIN users u ON u.id = e.user_id WHERE u.role IN ('employee', 'project manager')",
    )
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Partial update; `role` goes to the owning user in the same transaction
pub async fn update(pool: &SqlitePool, id: i64, data: &EmployeeUpdate) -> RepoResult<EmployeeProfile> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE employees SET name = COALESCE(?1, name), position = COALESCE(?2, position), department = COALESCE(?3, department), team = COALESCE(?4, team), manager = COALESCE(?5, manager), description = COALESCE(?6, description), github_username = COALESCE(?7, github_username), salary = COALESCE(?8, salary), start_date = COALESCE(?9, start_date), end_date = COALESCE(?10, end_date), work_from = COALESCE(?11, work_from), work_to = COALESCE(?12, work_to), status = COALESCE(?13, status), documents = COALESCE(?14, documents), updated_at = ?15 WHERE id = ?16",
    )
    .bind(&data.name)
    .bind(&data.position)
    .bind(&data.department)
    .bind(&data.team)
    .bind(&data.manager)
    .bind(&data.description)
    .bind(&data.github_username)
    .bind(data.salary)
    .bind(data.start_date)
    .bind(data.end_date)
    .bind(&data.work_from)
    .bind(&data.work_to)
    .bind(&data.status)
    .bind(data.documents.as_ref().map(Json))
    .bind(now)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }

    if let Some(role) = data.role {
        let user_id = user_id_of(&mut tx, id).await?;
        super::user::update_role(&mut tx, user_id, role).await?;
    }

    tx.commit().await?;

    find_profile(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

/// Salary/position change from an appraisal
pub async fn apply_appraisal(
    tx: &mut Tx<'_>,
    user_id: i64,
    position: Option<&str>,
    salary: Option<f64>,
) -> RepoResult<()> {
    sqlx::query(
        "UPDATE employees SET position = COALESCE(?1, position), salary = COALESCE(?2, salary), updated_at = ?3 WHERE user_id = ?4",
    )
    .bind(position)
    .bind(salary)
    .bind(shared::util::now_millis())
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn user_id_of(tx: &mut Tx<'_>, id: i64) -> RepoResult<i64> {
    sqlx::query_scalar::<_, i64>("SELECT user_id FROM employees WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

/// Delete an employee with its account, leave balances and notifications
///
/// Requests, comments, attachments, appraisals and reviews are kept.
pub async fn delete_with_account(pool: &SqlitePool, id: i64) -> RepoResult<i64> {
    let mut tx = pool.begin().await?;
    let user_id = user_id_of(&mut tx, id).await?;

    sqlx::query("DELETE FROM notifications WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM leave_details WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(user_id)
}
