//! Appraisal API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{
    Appraisal, AppraisalEntry, AppraisalMeasures, AppraisalType, EmployeeProfile, FeedbackInput,
    PromotionInput, SalaryIncreaseInput,
};
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::appraisal::{self, NewAppraisal};
use crate::db::repository::{self, attendance, employee, leave, project, ticket};
use crate::notify;
use crate::utils::time::local_today;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Requested change carried by one appraisal
struct Change {
    kind: AppraisalType,
    feedback: String,
    new_position: Option<String>,
    new_salary: Option<f64>,
}

fn validate_salary(salary: Option<f64>) -> AppResult<()> {
    match salary {
        Some(s) if !s.is_finite() || s <= 0.0 => {
            Err(AppError::validation("salary must be a positive number"))
        }
        _ => Ok(()),
    }
}

fn validate_change(change: &Change) -> AppResult<()> {
    validate_required_text(&change.feedback, "feedback", MAX_NOTE_LEN)?;
    if let Some(position) = &change.new_position {
        validate_required_text(position, "newPosition", MAX_NAME_LEN)?;
    }
    validate_salary(change.new_salary)
}

/// Record the appraisal, apply it to the employee and tell them, in one transaction
async fn record(state: &ServerState, user_id: i64, change: Change) -> AppResult<Appraisal> {
    validate_change(&change)?;
    let profile = employee::find_profile_by_user(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound))?;

    let message = match change.kind {
        AppraisalType::Promotion => "You received a promotion",
        AppraisalType::Salary => "Your salary was increased",
        AppraisalType::Feedback => "You received appraisal feedback",
    };

    let mut tx = repository::begin(&state.pool).await?;
    employee::apply_appraisal(
        &mut tx,
        user_id,
        change.new_position.as_deref(),
        change.new_salary,
    )
    .await?;
    let created = appraisal::insert(
        &mut tx,
        NewAppraisal {
            user_id,
            date: local_today(state.config.timezone),
            appraisal_type: change.kind,
            feedback: change.feedback,
            new_position: change.new_position,
            new_salary: change.new_salary,
            past_position: Some(profile.employee.position),
            past_salary: Some(profile.employee.salary),
        },
    )
    .await?;
    let notice = notify::to_user(
        user_id,
        message,
        &format!("/appraisal/{}", created.id),
        "appraisal",
    );
    notify::enqueue_notification(&mut tx, &notice).await?;
    repository::commit(tx).await?;
    state.wake_outbox();

    tracing::info!(appraisal_id = created.id, user_id, kind = ?created.appraisal_type, "Appraisal recorded");
    Ok(created)
}

pub async fn promote(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(input): Json<PromotionInput>,
) -> AppResult<(StatusCode, Json<Appraisal>)> {
    let change = Change {
        kind: AppraisalType::Promotion,
        feedback: input.feedback,
        new_position: Some(input.new_position),
        new_salary: input.new_salary,
    };
    Ok((StatusCode::CREATED, Json(record(&state, user_id, change).await?)))
}

pub async fn increase_salary(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(input): Json<SalaryIncreaseInput>,
) -> AppResult<(StatusCode, Json<Appraisal>)> {
    let change = Change {
        kind: AppraisalType::Salary,
        feedback: input.feedback,
        new_position: None,
        new_salary: Some(input.new_salary),
    };
    Ok((StatusCode::CREATED, Json(record(&state, user_id, change).await?)))
}

pub async fn feedback(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
    Json(input): Json<FeedbackInput>,
) -> AppResult<(StatusCode, Json<Appraisal>)> {
    let change = Change {
        kind: AppraisalType::Feedback,
        feedback: input.feedback,
        new_position: None,
        new_salary: None,
    };
    Ok((StatusCode::CREATED, Json(record(&state, user_id, change).await?)))
}

async fn measures_for(pool: &SqlitePool, profile: EmployeeProfile) -> AppResult<AppraisalMeasures> {
    let user_id = profile.employee.user_id;
    let (projects_total, projects_completed) = project::count_for_member(pool, user_id).await?;
    let (tickets_total, tickets_completed, average_grading) =
        ticket::stats_for_assignee(pool, user_id).await?;
    let (present_days, absent_days, remote_days, onsite_days) =
        attendance::count_for_user(pool, user_id).await?;
    let leaves_taken = leave::find_latest(pool, user_id)
        .await?
        .map(|detail| i64::from(detail.leaves_taken))
        .unwrap_or(0);

    Ok(AppraisalMeasures {
        user_id,
        name: profile.employee.name,
        position: profile.employee.position,
        salary: profile.employee.salary,
        projects_total,
        projects_completed,
        tickets_total,
        tickets_completed,
        average_grading,
        leaves_taken,
        present_days,
        absent_days,
        remote_days,
        onsite_days,
    })
}

/// Performance figures per employee
pub async fn measures(State(state): State<ServerState>) -> AppResult<Json<Vec<AppraisalMeasures>>> {
    let profiles = employee::find_all(&state.pool).await?;
    let mut out = Vec::with_capacity(profiles.len());
    for profile in profiles {
        out.push(measures_for(&state.pool, profile).await?);
    }
    Ok(Json(out))
}

pub async fn all_history(State(state): State<ServerState>) -> AppResult<Json<Vec<AppraisalEntry>>> {
    Ok(Json(appraisal::list(&state.pool, None).await?))
}

pub async fn my_history(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<AppraisalEntry>>> {
    Ok(Json(appraisal::list(&state.pool, Some(current.id)).await?))
}

/// Own appraisals, or any for HR and admins
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppraisalEntry>> {
    let entry = appraisal::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Appraisal {id}")))?;
    if entry.appraisal.user_id != current.id && !current.is_hr_or_admin() {
        return Err(AppError::forbidden("Not allowed to view this appraisal"));
    }
    Ok(Json(entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(feedback: &str, salary: Option<f64>) -> Change {
        Change {
            kind: AppraisalType::Salary,
            feedback: feedback.into(),
            new_position: None,
            new_salary: salary,
        }
    }

    #[test]
    fn salary_must_be_positive() {
        assert!(validate_change(&change("Great year", Some(5200.0))).is_ok());
        assert!(validate_change(&change("Great year", Some(0.0))).is_err());
        assert!(validate_change(&change("Great year", Some(f64::NAN))).is_err());
    }

    #[test]
    fn feedback_is_required() {
        assert!(validate_change(&change("  ", None)).is_err());
    }
}
