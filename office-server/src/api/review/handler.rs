//! Review API Handlers
//!
//! The employee submits ratings and a self-review; a manager adds their
//! part afterwards.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Datelike;
use shared::models::{ManagerReviewInput, Review, ReviewCreate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{self, review};
use crate::notify;
use crate::utils::time::local_today;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

fn validate_create(payload: &ReviewCreate) -> AppResult<()> {
    let ratings = [
        ("jobKnowledgeRating", payload.job_knowledge_rating),
        ("workQualityRating", payload.work_quality_rating),
        ("problemSolvingRating", payload.problem_solving_rating),
    ];
    for (field, rating) in ratings {
        if let Some(r) = rating
            && !(MIN_RATING..=MAX_RATING).contains(&r)
        {
            return Err(AppError::validation(format!(
                "{field} must be between {MIN_RATING} and {MAX_RATING}"
            )));
        }
    }
    validate_optional_text(&payload.job_knowledge_employee_review, "jobKnowledgeEmployeeReview", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.work_quality_employee_review, "workQualityEmployeeReview", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.problem_solving_employee_review, "problemSolvingEmployeeReview", MAX_NOTE_LEN)?;
    Ok(())
}

fn can_see_all(current: &CurrentUser) -> bool {
    current.is_hr_or_admin() || current.is_project_manager()
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<(StatusCode, Json<Review>)> {
    validate_create(&payload)?;
    let year = payload
        .year
        .unwrap_or_else(|| local_today(state.config.timezone).year());
    let created = review::insert(&state.pool, current.id, year, &payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Own reviews, or every review for HR, admins and managers
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Review>>> {
    let user_id = if can_see_all(&current) {
        None
    } else {
        Some(current.id)
    };
    Ok(Json(review::list(&state.pool, user_id).await?))
}

pub async fn for_user(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<Review>>> {
    if user_id != current.id && !can_see_all(&current) {
        return Err(AppError::forbidden("Not allowed to view these reviews"));
    }
    Ok(Json(review::list(&state.pool, Some(user_id)).await?))
}

pub async fn manager_review(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<ManagerReviewInput>,
) -> AppResult<Json<Review>> {
    validate_optional_text(&input.job_knowledge_manager_review, "jobKnowledgeManagerReview", MAX_NOTE_LEN)?;
    validate_optional_text(&input.work_quality_manager_review, "workQualityManagerReview", MAX_NOTE_LEN)?;
    validate_optional_text(&input.problem_solving_manager_review, "problemSolvingManagerReview", MAX_NOTE_LEN)?;

    let updated = review::set_manager_review(&state.pool, id, current.id, &input).await?;

    let notice = notify::to_user(
        updated.user_id,
        format!("Your {} review has manager feedback", updated.year),
        "/review",
        "review",
    );
    let mut tx = repository::begin(&state.pool).await?;
    notify::enqueue_notification(&mut tx, &notice).await?;
    repository::commit(tx).await?;
    state.wake_outbox();

    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(rating: Option<i32>) -> ReviewCreate {
        ReviewCreate {
            year: None,
            job_knowledge_rating: rating,
            work_quality_rating: Some(3),
            problem_solving_rating: None,
            job_knowledge_employee_review: Some("Learned the payroll stack".into()),
            work_quality_employee_review: None,
            problem_solving_employee_review: None,
        }
    }

    #[test]
    fn ratings_stay_on_the_scale() {
        assert!(validate_create(&create(Some(5))).is_ok());
        assert!(validate_create(&create(None)).is_ok());
        assert!(validate_create(&create(Some(0))).is_err());
        assert!(validate_create(&create(Some(6))).is_err());
    }
}
