//! Announcement API Handlers
//!
//! Publishing notifies every user and mails every address, both through
//! the outbox.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::models::{Announcement, AnnouncementCreate, AnnouncementUpdate, Audience, Notice};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{self, announcement, user};
use crate::email::templates;
use crate::notify;
use crate::utils::validation::{MAX_BODY_LEN, MAX_NAME_LEN, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult};

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(payload): Json<AnnouncementCreate>,
) -> AppResult<(StatusCode, Json<Announcement>)> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&payload.body, "body", MAX_BODY_LEN)?;

    let mut tx = repository::begin(&state.pool).await?;
    let created = announcement::insert(&mut tx, current.id, &payload).await?;
    let notice = Notice::new(
        format!("Announcement: {}", created.title),
        format!("/announcement/{}", created.id),
        "announcement",
        Audience::All,
    );
    notify::enqueue_notification(&mut tx, &notice).await?;
    let recipients = user::find_all_emails(&mut tx).await?;
    for to in &recipients {
        let mail = templates::announcement(to, &created.title, &created.body);
        notify::enqueue_email(&mut tx, &mail).await?;
    }
    repository::commit(tx).await?;
    state.wake_outbox();

    tracing::info!(
        announcement_id = created.id,
        recipients = recipients.len(),
        "Announcement published"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Announcement>>> {
    Ok(Json(announcement::find_all(&state.pool).await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Announcement>> {
    let item = announcement::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Announcement {id}")))?;
    Ok(Json(item))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AnnouncementUpdate>,
) -> AppResult<Json<Announcement>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    if let Some(body) = &payload.body {
        validate_required_text(body, "body", MAX_BODY_LEN)?;
    }
    Ok(Json(announcement::update(&state.pool, id, &payload).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    announcement::delete(&state.pool, id).await?;
    Ok(ApiResponse::message("Announcement deleted"))
}
