//! Appraisal Repository

use super::{RepoResult, Tx};
use chrono::NaiveDate;
use shared::models::{Appraisal, AppraisalEntry, AppraisalType};
use sqlx::SqlitePool;

const ENTRY_SELECT: &str = "SELECT a.id, a.date, a.user_id, a.appraisal_type, a.feedback, a.new_position, a.new_salary, a.past_position, a.past_salary, e.name AS employee_name FROM appraisals a LEFT JOIN employees e ON e.user_id = a.user_id";

#[derive(Debug, Clone)]
pub struct NewAppraisal {
    pub user_id: i64,
    pub date: NaiveDate,
    pub appraisal_type: AppraisalType,
    pub feedback: String,
    pub new_position: Option<String>,
    pub new_salary: Option<f64>,
    pub past_position: Option<String>,
    pub past_salary: Option<f64>,
}

pub async fn insert(tx: &mut Tx<'_>, data: NewAppraisal) -> RepoResult<Appraisal> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO appraisals (id, date, user_id, appraisal_type, feedback, new_position, new_salary, past_position, past_salary) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.date)
    .bind(data.user_id)
    .bind(data.appraisal_type)
    .bind(&data.feedback)
    .bind(&data.new_position)
    .bind(data.new_salary)
    .bind(&data.past_position)
    .bind(data.past_salary)
    .execute(&mut **tx)
    .await?;

    Ok(Appraisal {
        id,
        date: data.date,
        user_id: data.user_id,
        appraisal_type: data.appraisal_type,
        feedback: data.feedback,
        new_position: data.new_position,
        new_salary: data.new_salary,
        past_position: data.past_position,
        past_salary: data.past_salary,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AppraisalEntry>> {
    let entry = sqlx::query_as::<_, AppraisalEntry>(&format!("{ENTRY_SELECT} WHERE a.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(entry)
}

/// Every appraisal, or one user's, newest first
pub async fn list(pool: &SqlitePool, user_id: Option<i64>) -> RepoResult<Vec<AppraisalEntry>> {
    let entries = sqlx::query_as::<_, AppraisalEntry>(&format!(
        "{ENTRY_SELECT} WHERE (?1 IS NULL OR a.user_id = ?1) ORDER BY a.date DESC, a.id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(entries)
}
