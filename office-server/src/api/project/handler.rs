//! Project API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{
    AssigneeInput, Attachment, Comment, GithubLink, GithubRepoCreate, Project, ProjectCounts,
    ProjectCreate, ProjectUpdate, Ticket,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::comment::{self, Parent};
use crate::db::repository::{self, project, ticket, user};
use crate::integrations::github;
use crate::notify;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

fn not_found() -> AppError {
    AppError::new(ErrorCode::ProjectNotFound)
}

fn validate_progress(progress: Option<i32>) -> AppResult<()> {
    match progress {
        Some(p) if !(0..=100).contains(&p) => {
            Err(AppError::validation("progress must be between 0 and 100"))
        }
        _ => Ok(()),
    }
}

fn validate_create(payload: &ProjectCreate) -> AppResult<()> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.estimated_time, "estimatedTime", MAX_NAME_LEN)?;
    validate_progress(payload.progress)?;
    if payload.end_date < payload.start_date {
        return Err(AppError::validation("endDate must not be before startDate"));
    }
    Ok(())
}

/// HR and admins see every project, everyone else their own
fn member_scope(current: &CurrentUser) -> Option<i64> {
    if current.is_hr_or_admin() {
        None
    } else {
        Some(current.id)
    }
}

async fn load(state: &ServerState, id: i64) -> AppResult<Project> {
    project::find_by_id(&state.pool, id).await?.ok_or_else(not_found)
}

/// Queue an "added to project" notice for each new member
async fn notify_assigned(state: &ServerState, item: &Project, user_ids: &[i64]) -> AppResult<()> {
    if user_ids.is_empty() {
        return Ok(());
    }
    let link = format!("/project/{}", item.id);
    let mut tx = repository::begin(&state.pool).await?;
    for user_id in user_ids {
        let notice = notify::to_user(
            *user_id,
            format!("You were added to project \"{}\"", item.title),
            &link,
            "project",
        );
        notify::enqueue_notification(&mut tx, &notice).await?;
    }
    repository::commit(tx).await?;
    state.wake_outbox();
    Ok(())
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<ProjectCreate>,
) -> AppResult<(StatusCode, Json<Project>)> {
    validate_create(&payload)?;
    for user_id in &payload.assignees {
        if user::find_by_id(&state.pool, *user_id).await?.is_none() {
            return Err(AppError::with_message(
                ErrorCode::EmployeeNotFound,
                format!("Assignee {user_id} not found"),
            ));
        }
    }

    let created = project::insert(&state.pool, current.id, &payload).await?;
    notify_assigned(&state, &created, &created.assignees).await?;
    tracing::info!(project_id = created.id, owner = current.id, "Project created");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(project::list(&state.pool, member_scope(&current)).await?))
}

pub async fn counts(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<ProjectCounts>> {
    Ok(Json(
        project::count_by_status(&state.pool, member_scope(&current)).await?,
    ))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Project>> {
    Ok(Json(load(&state, id).await?))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProjectUpdate>,
) -> AppResult<Json<Project>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_progress(payload.progress)?;

    let existing = load(&state, id).await?;
    let start = payload.start_date.unwrap_or(existing.start_date);
    let end = payload.end_date.unwrap_or(existing.end_date);
    if end < start {
        return Err(AppError::validation("endDate must not be before startDate"));
    }

    Ok(Json(project::update(&state.pool, id, &payload).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    load(&state, id).await?;
    project::delete(&state.pool, id).await?;
    tracing::info!(project_id = id, deleted_by = current.id, "Project deleted");
    Ok(ApiResponse::message("Project deleted"))
}

pub async fn add_assignees(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(input): Json<AssigneeInput>,
) -> AppResult<Json<Project>> {
    if input.assignees.is_empty() {
        return Err(AppError::validation("assignees must not be empty"));
    }

    let mut tx = repository::begin(&state.pool).await?;
    if !project::exists(&mut tx, id).await? {
        return Err(not_found());
    }
    for user_id in &input.assignees {
        if !user::exists(&mut tx, *user_id).await? {
            return Err(AppError::with_message(
                ErrorCode::EmployeeNotFound,
                format!("Assignee {user_id} not found"),
            ));
        }
    }
    let added = project::add_assignees(&mut tx, id, &input.assignees).await?;
    repository::commit(tx).await?;

    let item = load(&state, id).await?;
    notify_assigned(&state, &item, &added).await?;
    Ok(Json(item))
}

/// Link a repository that already exists
pub async fn link_repository(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(input): Json<GithubLink>,
) -> AppResult<Json<Project>> {
    validate_required_text(&input.github_repo, "githubRepo", MAX_URL_LEN)?;
    if !input.github_repo.starts_with("https://") {
        return Err(AppError::validation("githubRepo must be an https URL"));
    }
    load(&state, id).await?;
    Ok(Json(
        project::set_github_repo(&state.pool, id, &input.github_repo).await?,
    ))
}

/// Create a repository on GitHub, then link it
pub async fn create_repository(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(input): Json<GithubRepoCreate>,
) -> AppResult<Json<Project>> {
    validate_required_text(&input.name, "name", MAX_NAME_LEN)?;
    let existing = load(&state, id).await?;
    if existing.github_repo.is_some() {
        return Err(AppError::new(ErrorCode::RepositoryAlreadyLinked));
    }

    let url =
        github::create_repository(&state.http, state.config.github_token.as_deref(), &input).await?;
    Ok(Json(project::set_github_repo(&state.pool, id, &url).await?))
}

pub async fn tickets(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Ticket>>> {
    Ok(Json(ticket::list_for_project(&state.pool, id).await?))
}

pub async fn comments(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(comment::list_comments(&state.pool, Parent::Project(id)).await?))
}

pub async fn attachments(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Attachment>>> {
    Ok(Json(
        comment::list_attachments(&state.pool, Parent::Project(id)).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn payload() -> ProjectCreate {
        ProjectCreate {
            title: "Payroll".into(),
            description: "Monthly payroll export".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            assignees: vec![],
            progress: None,
            status: None,
            estimated_time: None,
        }
    }

    #[test]
    fn project_dates_and_progress_are_checked() {
        assert!(validate_create(&payload()).is_ok());

        let mut backwards = payload();
        backwards.end_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert!(validate_create(&backwards).is_err());

        let mut over = payload();
        over.progress = Some(101);
        assert!(validate_create(&over).is_err());
    }
}
