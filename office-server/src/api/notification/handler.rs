//! Notification API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{Notification, NotificationQuery, UnseenCount};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::notification;
use crate::utils::{ApiResponse, AppResult};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 200;

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Newest first
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<Vec<Notification>>> {
    let limit = clamp_limit(query.limit);
    Ok(Json(
        notification::list_for_user(&state.pool, current.id, limit).await?,
    ))
}

pub async fn count_unseen(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<Json<UnseenCount>> {
    let count = notification::count_unseen(&state.pool, current.id).await?;
    Ok(Json(UnseenCount { count }))
}

pub async fn mark_all_seen(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<()>> {
    let updated = notification::mark_all_seen(&state.pool, current.id).await?;
    Ok(ApiResponse::message(format!("{updated} notifications marked as seen")))
}

/// Someone else's notification reads as not found
pub async fn mark_seen(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    notification::mark_seen(&state.pool, id, current.id).await?;
    Ok(ApiResponse::message("Notification marked as seen"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(5)), 5);
    }
}
