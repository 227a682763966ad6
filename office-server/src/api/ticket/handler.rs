//! Ticket API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Attachment, Comment, MAX_GRADING, Ticket, TicketCreate, TicketUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::comment::{self, Parent};
use crate::db::repository::{self, project, ticket, user};
use crate::notify;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

fn not_found() -> AppError {
    AppError::new(ErrorCode::TicketNotFound)
}

fn validate_create(payload: &TicketCreate) -> AppResult<()> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.priority, "priority", MAX_NAME_LEN)?;
    validate_optional_text(&payload.ticket_type, "type", MAX_NAME_LEN)?;
    if let (Some(start), Some(due)) = (payload.start_date, payload.due_date)
        && due < start
    {
        return Err(AppError::validation("dueDate must not be before startDate"));
    }
    Ok(())
}

fn validate_update(payload: &TicketUpdate, can_grade: bool) -> AppResult<()> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if let Some(progress) = payload.progress
        && !(0..=100).contains(&progress)
    {
        return Err(AppError::validation("progress must be between 0 and 100"));
    }
    if let Some(grading) = payload.grading {
        if !can_grade {
            return Err(AppError::forbidden("Only a project manager can grade tickets"));
        }
        if !(0..=MAX_GRADING).contains(&grading) {
            return Err(AppError::validation(format!(
                "grading must be between 0 and {MAX_GRADING}"
            )));
        }
    }
    Ok(())
}

async fn load(state: &ServerState, id: i64) -> AppResult<Ticket> {
    ticket::find_by_id(&state.pool, id).await?.ok_or_else(not_found)
}

/// Check the linked project and assignee exist
async fn check_references(
    state: &ServerState,
    linked_project: Option<i64>,
    assignee_id: Option<i64>,
) -> AppResult<()> {
    let mut tx = repository::begin(&state.pool).await?;
    if let Some(project_id) = linked_project
        && !project::exists(&mut tx, project_id).await?
    {
        return Err(AppError::new(ErrorCode::ProjectNotFound));
    }
    if let Some(user_id) = assignee_id
        && !user::exists(&mut tx, user_id).await?
    {
        return Err(AppError::with_message(
            ErrorCode::EmployeeNotFound,
            format!("Assignee {user_id} not found"),
        ));
    }
    repository::commit(tx).await?;
    Ok(())
}

async fn notify_assignee(state: &ServerState, item: &Ticket) -> AppResult<()> {
    let Some(assignee) = item.assignee_id else {
        return Ok(());
    };
    let notice = notify::to_user(
        assignee,
        format!("Ticket \"{}\" was assigned to you", item.title),
        &format!("/ticket/{}", item.id),
        "ticket",
    );
    let mut tx = repository::begin(&state.pool).await?;
    notify::enqueue_notification(&mut tx, &notice).await?;
    repository::commit(tx).await?;
    state.wake_outbox();
    Ok(())
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<TicketCreate>,
) -> AppResult<(StatusCode, Json<Ticket>)> {
    validate_create(&payload)?;
    check_references(&state, payload.linked_project, payload.assignee_id).await?;

    let created = ticket::insert(&state.pool, current.id, &payload).await?;
    notify_assignee(&state, &created).await?;
    tracing::info!(ticket_id = created.id, reporter = current.id, "Ticket created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// HR and admins see every ticket, everyone else the ones they report or work on
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Ticket>>> {
    let member = if current.is_hr_or_admin() {
        None
    } else {
        Some(current.id)
    };
    Ok(Json(ticket::list(&state.pool, member).await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ticket>> {
    Ok(Json(load(&state, id).await?))
}

/// Assignee and reporter may update progress; grading is for managers
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<TicketUpdate>,
) -> AppResult<Json<Ticket>> {
    let can_grade = current.is_admin() || current.is_project_manager();
    validate_update(&payload, can_grade)?;

    let existing = load(&state, id).await?;
    let involved = existing.assignee_id == Some(current.id) || existing.reporter_id == current.id;
    if !(can_grade || current.is_hr_or_admin() || involved) {
        return Err(AppError::forbidden("Not allowed to update this ticket"));
    }
    let start = payload.start_date.or(existing.start_date);
    let due = payload.due_date.or(existing.due_date);
    if let (Some(start), Some(due)) = (start, due)
        && due < start
    {
        return Err(AppError::validation("dueDate must not be before startDate"));
    }
    check_references(&state, payload.linked_project, payload.assignee_id).await?;

    let updated = ticket::update(&state.pool, id, &payload).await?;
    if updated.assignee_id.is_some() && updated.assignee_id != existing.assignee_id {
        notify_assignee(&state, &updated).await?;
    }
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    load(&state, id).await?;
    ticket::delete(&state.pool, id).await?;
    tracing::info!(ticket_id = id, deleted_by = current.id, "Ticket deleted");
    Ok(ApiResponse::message("Ticket deleted"))
}

pub async fn comments(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(comment::list_comments(&state.pool, Parent::Ticket(id)).await?))
}

pub async fn attachments(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Attachment>>> {
    Ok(Json(
        comment::list_attachments(&state.pool, Parent::Ticket(id)).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grading_is_reserved_and_bounded() {
        let graded = TicketUpdate {
            grading: Some(7),
            ..Default::default()
        };
        assert_eq!(
            validate_update(&graded, false).unwrap_err().code,
            ErrorCode::PermissionDenied
        );
        assert!(validate_update(&graded, true).is_ok());

        let too_high = TicketUpdate {
            grading: Some(MAX_GRADING + 1),
            ..Default::default()
        };
        assert_eq!(
            validate_update(&too_high, true).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }

    #[test]
    fn progress_outside_percent_is_rejected() {
        let update = TicketUpdate {
            progress: Some(-1),
            ..Default::default()
        };
        assert!(validate_update(&update, false).is_err());
    }
}
