//! Review Repository

use super::{RepoError, RepoResult};
use shared::models::{ManagerReviewInput, Review, ReviewCreate};
use sqlx::SqlitePool;

const REVIEW_SELECT: &str = "SELECT id, user_id, year, job_knowledge_rating, work_quality_rating, problem_solving_rating, job_knowledge_employee_review, work_quality_employee_review, problem_solving_employee_review, job_knowledge_manager_review, work_quality_manager_review, problem_solving_manager_review, manager_id, created_at, updated_at FROM reviews";

pub async fn insert(pool: &SqlitePool, user_id: i64, year: i32, data: &ReviewCreate) -> RepoResult<Review> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO reviews (id, user_id, year, job_knowledge_rating, work_quality_rating, problem_solving_rating, job_knowledge_employee_review, work_quality_employee_review, problem_solving_employee_review, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(id)
    .bind(user_id)
    .bind(year)
    .bind(data.job_knowledge_rating)
    .bind(data.work_quality_rating)
    .bind(data.problem_solving_rating)
    .bind(&data.job_knowledge_employee_review)
    .bind(&data.work_quality_employee_review)
    .bind(&data.problem_solving_employee_review)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create review".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(&format!("{REVIEW_SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(review)
}

/// Every review, or one user's, newest year first
pub async fn list(pool: &SqlitePool, user_id: Option<i64>) -> RepoResult<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(&format!(
        "{REVIEW_SELECT} WHERE (?1 IS NULL OR user_id = ?1) ORDER BY year DESC, created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(reviews)
}

pub async fn set_manager_review(
    pool: &SqlitePool,
    id: i64,
    manager_id: i64,
    data: &ManagerReviewInput,
) -> RepoResult<Review> {
    let rows = sqlx::query(
        "UPDATE reviews SET job_knowledge_manager_review = COALESCE(?1, job_knowledge_manager_review), work_quality_manager_review = COALESCE(?2, work_quality_manager_review), problem_solving_manager_review = COALESCE(?3, problem_solving_manager_review), manager_id = ?4, updated_at = ?5 WHERE id = ?6",
    )
    .bind(&data.job_knowledge_manager_review)
    .bind(&data.work_quality_manager_review)
    .bind(&data.problem_solving_manager_review)
    .bind(manager_id)
    .bind(shared::util::now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Review {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Review {id} not found")))
}
