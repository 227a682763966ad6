//! Request API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use shared::models::{
    ApprovalStatus, RequestCounts, RequestCreate, RequestDecision, RequestDetail, RequestList,
    RequestType, StatusCounts,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::request::{self, RequestFilter};
use crate::utils::time::{DateFilter, local_today};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use crate::workflow::service;

/// Listing query shared by every request listing
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// `today`, `yesterday`, `thisWeek`, `thisMonth` or a day
    pub date: Option<String>,
    pub status: Option<ApprovalStatus>,
    #[serde(rename = "type")]
    pub request_type: Option<RequestType>,
}

/// Per-type and per-status counts
#[derive(Debug, Serialize)]
pub struct RequestCountSummary {
    #[serde(flatten)]
    pub by_type: RequestCounts,
    #[serde(flatten)]
    pub by_status: StatusCounts,
}

fn build_filter(state: &ServerState, query: ListQuery) -> AppResult<RequestFilter> {
    let (created_from, created_to) = match query.date.as_deref() {
        Some(date) => {
            let today = local_today(state.config.timezone);
            let (from, to) = DateFilter::parse(date)?.millis_range(today, state.config.timezone);
            (Some(from), Some(to))
        }
        None => (None, None),
    };
    Ok(RequestFilter {
        status: query.status,
        request_type: query.request_type,
        created_from,
        created_to,
        ..Default::default()
    })
}

async fn listing(state: &ServerState, filter: &RequestFilter) -> AppResult<Json<RequestList>> {
    let requests = request::list_with_employee(&state.pool, filter).await?;
    let counts = RequestCounts::tally(&requests);
    Ok(Json(RequestList { requests, counts }))
}

/// Decode the tagged body; a missing or unknown `requestType` gets its own code
fn parse_create(body: serde_json::Value) -> AppResult<RequestCreate> {
    let tag = body.get("requestType").and_then(|t| t.as_str());
    match tag {
        Some(t) if t.parse::<RequestType>().is_ok() => {}
        _ => return Err(AppError::new(ErrorCode::RequestTypeInvalid)),
    }
    serde_json::from_value(body)
        .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    Json(body): Json<serde_json::Value>,
) -> AppResult<(StatusCode, Json<RequestDetail>)> {
    let input = parse_create(body)?;
    let detail = service::create(&state, &current, input).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Caller's own requests
pub async fn list_mine(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<RequestList>> {
    let filter = RequestFilter {
        user_id: Some(current.id),
        ..build_filter(&state, query)?
    };
    listing(&state, &filter).await
}

/// Requests waiting on the calling project manager
pub async fn list_for_pm(
    State(state): State<ServerState>,
    current: CurrentUser,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<RequestList>> {
    let filter = RequestFilter {
        requested_to: Some(current.id),
        ..build_filter(&state, query)?
    };
    listing(&state, &filter).await
}

pub async fn list_all(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<RequestList>> {
    let filter = build_filter(&state, query)?;
    listing(&state, &filter).await
}

async fn count(
    state: &ServerState,
    user_id: Option<i64>,
    query: ListQuery,
) -> AppResult<Json<RequestCountSummary>> {
    let filter = RequestFilter {
        user_id,
        ..build_filter(state, query)?
    };
    let requests = request::list_with_employee(&state.pool, &filter).await?;
    Ok(Json(RequestCountSummary {
        by_type: RequestCounts::tally(&requests),
        by_status: StatusCounts::tally(&requests),
    }))
}

pub async fn count_all(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<RequestCountSummary>> {
    count(&state, None, query).await
}

/// `user` counts the caller's requests, `all` every request
pub async fn count_by_type(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(count_type): Path<String>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<RequestCountSummary>> {
    let user_id = match count_type.as_str() {
        "user" => Some(current.id),
        "all" => None,
        other => return Err(AppError::validation(format!("Unknown count type: {other}"))),
    };
    count(&state, user_id, query).await
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RequestDetail>> {
    Ok(Json(service::load_detail(&state, id).await?))
}

pub async fn decide(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(decision): Json<RequestDecision>,
) -> AppResult<Json<RequestDetail>> {
    Ok(Json(service::decide(&state, &current, id, decision).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    service::delete(&state, &current, id).await?;
    Ok(ApiResponse::message("Request deleted"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_or_unknown_type_is_rejected() {
        let err = parse_create(json!({"reason": "x"})).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestTypeInvalid);

        let err = parse_create(json!({"requestType": "holiday"})).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestTypeInvalid);
    }

    #[test]
    fn known_type_with_bad_fields_is_a_validation_error() {
        let err = parse_create(json!({"requestType": "leave", "reason": "x"})).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn leave_body_decodes() {
        let input = parse_create(json!({
            "requestType": "leave",
            "type": "annual",
            "startDate": "2024-01-01",
            "endDate": "2024-01-03",
            "reason": "family",
            "requestedTo": 42
        }))
        .unwrap();
        assert_eq!(input.requested_to, Some(42));
        assert_eq!(input.payload.request_type(), RequestType::Leave);
    }
}
