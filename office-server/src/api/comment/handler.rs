//! Comment API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Comment, CommentCreate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{self, comment, project, ticket};
use crate::utils::validation::{MAX_NOTE_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};

/// A comment or attachment hangs off exactly one project or ticket
pub(crate) async fn check_parent(
    state: &ServerState,
    project_id: Option<i64>,
    ticket_id: Option<i64>,
) -> AppResult<()> {
    match (project_id, ticket_id) {
        (Some(id), None) => {
            let mut tx = repository::begin(&state.pool).await?;
            let found = project::exists(&mut tx, id).await?;
            repository::commit(tx).await?;
            if !found {
                return Err(AppError::new(ErrorCode::ProjectNotFound));
            }
        }
        (None, Some(id)) => {
            if ticket::find_by_id(&state.pool, id).await?.is_none() {
                return Err(AppError::new(ErrorCode::TicketNotFound));
            }
        }
        _ => {
            return Err(AppError::validation(
                "Exactly one of projectId or ticketId is required",
            ));
        }
    }
    Ok(())
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<CommentCreate>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    validate_required_text(&payload.comment, "comment", MAX_NOTE_LEN)?;
    check_parent(&state, payload.project_id, payload.ticket_id).await?;

    let created = comment::insert_comment(&state.pool, current.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    comment::delete_comment(&state.pool, id).await?;
    tracing::info!(comment_id = id, deleted_by = current.id, "Comment deleted");
    Ok(ApiResponse::message("Comment deleted"))
}
