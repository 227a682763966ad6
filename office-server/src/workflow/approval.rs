//! Two-stage approval rules
//!
//! Stage 1 (`pm_status`) belongs to the project manager named in
//! `requested_to`. Stage 2 (`status`) belongs to HR/admin and opens once
//! stage 1 is approved, or immediately when there is no stage 1.

use shared::ErrorCode;
use shared::models::{ApprovalStatus, Request, RequestDecision};

use crate::auth::CurrentUser;
use crate::utils::AppError;

/// The stage a decision writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Manager(ApprovalStatus),
    Final(ApprovalStatus),
}

/// Check a decision against the request's current state and the caller
pub fn plan_decision(
    request: &Request,
    user: &CurrentUser,
    decision: &RequestDecision,
) -> Result<Stage, AppError> {
    match (decision.pm_status, decision.status) {
        (Some(pm_status), None) => {
            reject_pending(pm_status, "pmStatus")?;
            if !user.is_project_manager() || request.requested_to != Some(user.id) {
                return Err(AppError::forbidden(
                    "Only the project manager this request was sent to can set pmStatus",
                ));
            }
            if request.status != ApprovalStatus::Pending
                || request.pm_status != ApprovalStatus::Pending
            {
                return Err(AppError::new(ErrorCode::RequestNotPending));
            }
            Ok(Stage::Manager(pm_status))
        }
        (None, Some(status)) => {
            reject_pending(status, "status")?;
            if !user.is_hr_or_admin() {
                return Err(AppError::forbidden("Only HR or admin can set status"));
            }
            if request.status != ApprovalStatus::Pending {
                return Err(AppError::new(ErrorCode::RequestNotPending));
            }
            if request.has_manager_stage() && request.pm_status != ApprovalStatus::Approved {
                return Err(AppError::with_message(
                    ErrorCode::ApprovalStageBlocked,
                    "The project manager has not approved this request yet",
                ));
            }
            Ok(Stage::Final(status))
        }
        (Some(_), Some(_)) => Err(AppError::validation(
            "Set either status or pmStatus, not both",
        )),
        (None, None) => Err(AppError::validation("status or pmStatus is required")),
    }
}

fn reject_pending(value: ApprovalStatus, field: &str) -> Result<(), AppError> {
    if value == ApprovalStatus::Pending {
        return Err(AppError::validation(format!(
            "{field} must be approved or rejected"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{RequestType, Role};

    const PM: i64 = 20;

    fn request(requested_to: Option<i64>, pm_status: ApprovalStatus, status: ApprovalStatus) -> Request {
        Request {
            id: 1,
            user_id: 10,
            request_type: RequestType::Leave,
            status,
            pm_status,
            requested_to,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn user(id: i64, role: Role) -> CurrentUser {
        CurrentUser {
            id,
            email: format!("{id}@office.io"),
            role,
        }
    }

    fn pm_decision(s: ApprovalStatus) -> RequestDecision {
        RequestDecision {
            pm_status: Some(s),
            status: None,
        }
    }

    fn final_decision(s: ApprovalStatus) -> RequestDecision {
        RequestDecision {
            pm_status: None,
            status: Some(s),
        }
    }

    #[test]
    fn named_manager_decides_stage_one() {
        let req = request(Some(PM), ApprovalStatus::Pending, ApprovalStatus::Pending);
        let stage = plan_decision(
            &req,
            &user(PM, Role::ProjectManager),
            &pm_decision(ApprovalStatus::Approved),
        )
        .unwrap();
        assert_eq!(stage, Stage::Manager(ApprovalStatus::Approved));
    }

    #[test]
    fn other_manager_is_forbidden() {
        let req = request(Some(PM), ApprovalStatus::Pending, ApprovalStatus::Pending);
        let err = plan_decision(
            &req,
            &user(99, Role::ProjectManager),
            &pm_decision(ApprovalStatus::Approved),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn hr_waits_for_manager_stage() {
        let req = request(Some(PM), ApprovalStatus::Pending, ApprovalStatus::Pending);
        let err = plan_decision(
            &req,
            &user(3, Role::Hr),
            &final_decision(ApprovalStatus::Approved),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ApprovalStageBlocked);
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn hr_decides_after_manager_approval() {
        let req = request(Some(PM), ApprovalStatus::Approved, ApprovalStatus::Pending);
        let stage = plan_decision(
            &req,
            &user(3, Role::Hr),
            &final_decision(ApprovalStatus::Rejected),
        )
        .unwrap();
        assert_eq!(stage, Stage::Final(ApprovalStatus::Rejected));
    }

    #[test]
    fn no_manager_stage_goes_straight_to_hr() {
        let req = request(None, ApprovalStatus::Pending, ApprovalStatus::Pending);
        assert!(
            plan_decision(
                &req,
                &user(1, Role::Admin),
                &final_decision(ApprovalStatus::Approved)
            )
            .is_ok()
        );
    }

    #[test]
    fn second_approval_is_rejected() {
        let req = request(None, ApprovalStatus::Pending, ApprovalStatus::Approved);
        let err = plan_decision(
            &req,
            &user(1, Role::Admin),
            &final_decision(ApprovalStatus::Approved),
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestNotPending);
    }

    #[test]
    fn employee_cannot_set_status() {
        let req = request(None, ApprovalStatus::Pending, ApprovalStatus::Pending);
        let err = plan_decision(
            &req,
            &user(10, Role::Employee),
            &final_decision(ApprovalStatus::Approved),
        )
        .unwrap_err();
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);
    }

    #[test]
    fn decision_must_name_exactly_one_stage() {
        let req = request(None, ApprovalStatus::Pending, ApprovalStatus::Pending);
        let admin = user(1, Role::Admin);
        assert!(plan_decision(&req, &admin, &RequestDecision::default()).is_err());
        let both = RequestDecision {
            pm_status: Some(ApprovalStatus::Approved),
            status: Some(ApprovalStatus::Approved),
        };
        assert!(plan_decision(&req, &admin, &both).is_err());
        assert!(plan_decision(&req, &admin, &final_decision(ApprovalStatus::Pending)).is_err());
    }
}
