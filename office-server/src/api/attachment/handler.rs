//! Attachment API Handlers
//!
//! Attachments are stored as a URL string; uploading the file itself is the
//! client's business.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Attachment, AttachmentCreate};

use crate::api::comment::check_parent;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::comment;
use crate::utils::validation::{MAX_URL_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppResult};

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<AttachmentCreate>,
) -> AppResult<(StatusCode, Json<Attachment>)> {
    validate_required_text(&payload.attachment, "attachment", MAX_URL_LEN)?;
    check_parent(&state, payload.project_id, payload.ticket_id).await?;

    let created = comment::insert_attachment(&state.pool, current.id, &payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    comment::delete_attachment(&state.pool, id).await?;
    tracing::info!(attachment_id = id, deleted_by = current.id, "Attachment deleted");
    Ok(ApiResponse::message("Attachment deleted"))
}
