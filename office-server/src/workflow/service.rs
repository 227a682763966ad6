//! Request create/decide/delete
//!
//! Each mutation runs in one transaction together with the outbox events it
//! triggers; the worker is woken after commit.

use chrono::Datelike;
use shared::ErrorCode;
use shared::models::{
    ApprovalStatus, Audience, Notice, RequestCreate, RequestDecision, RequestDetail,
    RequestPayload, Role,
};

use super::approval::{Stage, plan_decision};
use super::leave::allocate;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{self, employee, leave, request, user};
use crate::notify;
use crate::utils::time::parse_hhmm;
use crate::utils::validation::{MAX_NOTE_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

/// Check subtype fields
pub fn validate_payload(payload: &RequestPayload) -> AppResult<()> {
    match payload {
        RequestPayload::Leave(leave) => {
            validate_required_text(&leave.leave_type, "type", MAX_NOTE_LEN)?;
            validate_required_text(&leave.reason, "reason", MAX_NOTE_LEN)?;
            if leave.end_date < leave.start_date {
                return Err(AppError::validation("endDate must not be before startDate"));
            }
        }
        RequestPayload::Allowance(allowance) => {
            if !allowance.amount.is_finite() || allowance.amount <= 0.0 {
                return Err(AppError::validation("amount must be greater than zero"));
            }
        }
        RequestPayload::Overtime(overtime) => {
            validate_required_text(&overtime.reason, "reason", MAX_NOTE_LEN)?;
            let start = parse_hhmm(&overtime.start_time)?;
            let end = parse_hhmm(&overtime.end_time)?;
            if end <= start {
                return Err(AppError::validation("endTime must be after startTime"));
            }
        }
        RequestPayload::Attendance(attendance) => {
            validate_required_text(&attendance.reason, "reason", MAX_NOTE_LEN)?;
        }
    }
    Ok(())
}

/// File a request
///
/// A project manager's own request skips stage 1.
pub async fn create(
    state: &ServerState,
    caller: &CurrentUser,
    input: RequestCreate,
) -> AppResult<RequestDetail> {
    validate_payload(&input.payload)?;

    let (pm_status, requested_to) = if caller.is_project_manager() {
        (ApprovalStatus::Approved, None)
    } else {
        if let Some(pm_id) = input.requested_to {
            let approver = user::find_by_id(&state.pool, pm_id).await?;
            if approver.map(|u| u.role) != Some(Role::ProjectManager) {
                return Err(AppError::validation("requestedTo must be a project manager"));
            }
        }
        (ApprovalStatus::Pending, input.requested_to)
    };

    let requester = display_name(state, caller).await?;
    let request_type = input.payload.request_type();

    let mut tx = repository::begin(&state.pool).await?;
    let id = request::insert(&mut tx, caller.id, &input.payload, pm_status, requested_to).await?;
    let message = format!("{requester} submitted a {request_type} request");
    let link = format!("/request/{id}");
    let notice = match requested_to {
        Some(pm_id) => notify::to_user(pm_id, message, &link, "request"),
        None => notify::to_back_office(message, &link, "request"),
    };
    notify::enqueue_notification(&mut tx, &notice).await?;
    repository::commit(tx).await?;
    state.wake_outbox();

    tracing::info!(request_id = id, user_id = caller.id, %request_type, "Request created");
    load_detail(state, id).await
}

/// Apply a stage decision
pub async fn decide(
    state: &ServerState,
    caller: &CurrentUser,
    id: i64,
    decision: RequestDecision,
) -> AppResult<RequestDetail> {
    let mut tx = repository::begin(&state.pool).await?;
    let current = request::find_in_tx(&mut tx, id).await?;
    let stage = plan_decision(&current, caller, &decision)?;
    let request_type = current.request_type;
    let link = format!("/request/{id}");

    match stage {
        Stage::Manager(pm_status) => {
            if !request::set_pm_status(&mut tx, id, pm_status).await? {
                return Err(AppError::new(ErrorCode::RequestNotPending));
            }
            if pm_status == ApprovalStatus::Approved {
                let hr = Notice::new(
                    format!("A {request_type} request was approved by the project manager and awaits HR"),
                    link.as_str(),
                    "request",
                    Audience::Role(Role::Hr),
                );
                notify::enqueue_notification(&mut tx, &hr).await?;
            }
            let requester = notify::to_user(
                current.user_id,
                format!(
                    "Your {request_type} request was {} by your project manager",
                    pm_status.as_str()
                ),
                &link,
                "request",
            );
            notify::enqueue_notification(&mut tx, &requester).await?;
        }
        Stage::Final(status) => {
            if !request::set_status(&mut tx, id, status).await? {
                return Err(AppError::new(ErrorCode::RequestNotPending));
            }
            let payload = if status == ApprovalStatus::Approved {
                request::find_payload(&mut tx, id, request_type).await?
            } else {
                None
            };
            if let Some(RequestPayload::Leave(leave_request)) = payload {
                let mut detail = leave::ensure_for_year(
                    &mut tx,
                    current.user_id,
                    leave_request.start_date.year(),
                    state.config.default_available_leaves,
                )
                .await?;
                let allocation = allocate(&mut detail, leave_request.day_count());
                leave::save_counters(&mut tx, &detail).await?;
                tracing::info!(
                    request_id = id,
                    user_id = current.user_id,
                    paid = allocation.paid,
                    unpaid = allocation.unpaid,
                    "Leave charged"
                );
            }
            let requester = notify::to_user(
                current.user_id,
                format!("Your {request_type} request was {}", status.as_str()),
                &link,
                "request",
            );
            notify::enqueue_notification(&mut tx, &requester).await?;
        }
    }

    repository::commit(tx).await?;
    state.wake_outbox();

    tracing::info!(request_id = id, decided_by = caller.id, ?stage, "Request decided");
    load_detail(state, id).await
}

/// Withdraw a request that no stage has decided yet
///
/// Allowed for the owner, the named project manager and HR/admin.
pub async fn delete(state: &ServerState, caller: &CurrentUser, id: i64) -> AppResult<()> {
    let current = request::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RequestNotFound))?;

    let permitted = current.user_id == caller.id
        || current.requested_to == Some(caller.id)
        || caller.is_hr_or_admin();
    if !permitted {
        return Err(AppError::invalid("You cannot delete this request"));
    }

    if !request::delete_pending(&state.pool, id).await? {
        return Err(AppError::with_message(
            ErrorCode::RequestNotPending,
            "Only pending requests can be deleted",
        ));
    }
    tracing::info!(request_id = id, deleted_by = caller.id, "Request deleted");
    Ok(())
}

pub async fn load_detail(state: &ServerState, id: i64) -> AppResult<RequestDetail> {
    request::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RequestNotFound))
}

async fn display_name(state: &ServerState, caller: &CurrentUser) -> AppResult<String> {
    Ok(employee::find_profile_by_user(&state.pool, caller.id)
        .await?
        .map(|p| p.employee.name)
        .unwrap_or_else(|| caller.email.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::models::{AllowancePayload, LeavePayload, OvertimePayload};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn leave_must_not_end_before_it_starts() {
        let payload = RequestPayload::Leave(LeavePayload {
            leave_type: "annual".into(),
            start_date: day(5),
            end_date: day(3),
            reason: "trip".into(),
        });
        assert!(validate_payload(&payload).is_err());
    }

    #[test]
    fn allowance_needs_positive_amount() {
        let payload = RequestPayload::Allowance(AllowancePayload {
            amount: 0.0,
            reason: None,
            date: day(1),
        });
        assert!(validate_payload(&payload).is_err());
    }

    #[test]
    fn overtime_window_must_be_forward() {
        let mut overtime = OvertimePayload {
            date: day(2),
            start_time: "18:00".into(),
            end_time: "17:00".into(),
            reason: "release".into(),
        };
        assert!(validate_payload(&RequestPayload::Overtime(overtime.clone())).is_err());
        overtime.end_time = "21:30".into();
        assert!(validate_payload(&RequestPayload::Overtime(overtime)).is_ok());
    }
}
