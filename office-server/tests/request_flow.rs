mod common;

use chrono::NaiveDate;
use common::{app, count_notifications, seed_employee, seed_user, send, test_state};
use http::StatusCode;
use office_server::db::repository::leave;
use office_server::email::LogMailer;
use office_server::notify;
use office_server::workflow::service;
use serde_json::json;
use shared::ErrorCode;
use shared::models::{
    ApprovalStatus, LeavePayload, RequestCreate, RequestDecision, RequestPayload, Role,
};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn leave_request(requested_to: Option<i64>) -> RequestCreate {
    RequestCreate {
        payload: RequestPayload::Leave(LeavePayload {
            leave_type: "annual".into(),
            start_date: day(1),
            end_date: day(3),
            reason: "Family visit".into(),
        }),
        requested_to,
    }
}

fn final_decision(status: ApprovalStatus) -> RequestDecision {
    RequestDecision {
        status: Some(status),
        pm_status: None,
    }
}

#[tokio::test]
async fn approved_leave_is_charged_to_the_balance() {
    let state = test_state().await;
    let (staff, _) = seed_employee(&state, "staff@corp.test", Role::Employee).await;
    let (hr, _) = seed_user(&state, "hr@corp.test", Role::Hr).await;

    let created = service::create(&state, &staff, leave_request(None)).await.unwrap();
    let id = created.summary.request.id;
    assert_eq!(created.summary.request.status, ApprovalStatus::Pending);

    let decided = service::decide(&state, &hr, id, final_decision(ApprovalStatus::Approved))
        .await
        .unwrap();
    assert_eq!(decided.summary.request.status, ApprovalStatus::Approved);

    let balance = leave::find(&state.pool, staff.id, 2024).await.unwrap().unwrap();
    assert_eq!(balance.leaves_taken, 3);
    assert_eq!(balance.total_paid_leave_taken, 3);
    assert_eq!(balance.available_leaves, 12);
}

#[tokio::test]
async fn second_decision_is_rejected() {
    let state = test_state().await;
    let (staff, _) = seed_employee(&state, "staff@corp.test", Role::Employee).await;
    let (hr, _) = seed_user(&state, "hr@corp.test", Role::Hr).await;

    let id = service::create(&state, &staff, leave_request(None))
        .await
        .unwrap()
        .summary
        .request
        .id;
    service::decide(&state, &hr, id, final_decision(ApprovalStatus::Approved))
        .await
        .unwrap();

    let err = service::decide(&state, &hr, id, final_decision(ApprovalStatus::Rejected))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestNotPending);

    // Charged once
    let balance = leave::find(&state.pool, staff.id, 2024).await.unwrap().unwrap();
    assert_eq!(balance.leaves_taken, 3);
}

#[tokio::test]
async fn decided_request_cannot_be_deleted() {
    let state = test_state().await;
    let (staff, _) = seed_employee(&state, "staff@corp.test", Role::Employee).await;
    let (hr, _) = seed_user(&state, "hr@corp.test", Role::Hr).await;

    let id = service::create(&state, &staff, leave_request(None))
        .await
        .unwrap()
        .summary
        .request
        .id;
    service::decide(&state, &hr, id, final_decision(ApprovalStatus::Rejected))
        .await
        .unwrap();

    let err = service::delete(&state, &staff, id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestNotPending);
}

#[tokio::test]
async fn hr_waits_for_the_named_project_manager() {
    let state = test_state().await;
    let (staff, _) = seed_employee(&state, "staff@corp.test", Role::Employee).await;
    let (pm, _) = seed_user(&state, "pm@corp.test", Role::ProjectManager).await;
    let (other_pm, _) = seed_user(&state, "other-pm@corp.test", Role::ProjectManager).await;
    let (hr, _) = seed_user(&state, "hr@corp.test", Role::Hr).await;

    let id = service::create(&state, &staff, leave_request(Some(pm.id)))
        .await
        .unwrap()
        .summary
        .request
        .id;

    let err = service::decide(&state, &hr, id, final_decision(ApprovalStatus::Approved))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ApprovalStageBlocked);

    let pm_decision = RequestDecision {
        status: None,
        pm_status: Some(ApprovalStatus::Approved),
    };
    let err = service::decide(&state, &other_pm, id, pm_decision.clone())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);

    service::decide(&state, &pm, id, pm_decision).await.unwrap();
    let decided = service::decide(&state, &hr, id, final_decision(ApprovalStatus::Approved))
        .await
        .unwrap();
    assert_eq!(decided.summary.request.pm_status, ApprovalStatus::Approved);
    assert_eq!(decided.summary.request.status, ApprovalStatus::Approved);

    // Request alert to the PM, then PM and HR outcomes to the requester
    notify::drain_once(&state.pool, &LogMailer, 5).await;
    assert_eq!(count_notifications(&state, pm.id).await, 1);
    assert_eq!(count_notifications(&state, staff.id).await, 2);
}

#[tokio::test]
async fn unknown_request_type_is_rejected_over_http() {
    let state = test_state().await;
    let app = app(&state);
    let (_, token) = seed_employee(&state, "staff@corp.test", Role::Employee).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/request",
        Some(&token),
        Some(json!({ "requestType": "holiday", "date": "2024-01-02" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], ErrorCode::RequestTypeInvalid.code());

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/request",
        Some(&token),
        Some(json!({
            "requestType": "allowance",
            "amount": 120.5,
            "date": "2024-01-02",
            "reason": "Conference travel"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["requestType"], "allowance");
    assert_eq!(body["pmStatus"], "pending");
}

#[tokio::test]
async fn manager_approved_request_cannot_be_deleted() {
    let state = test_state().await;
    let (staff, _) = seed_employee(&state, "staff@corp.test", Role::Employee).await;
    let (pm, _) = seed_user(&state, "pm@corp.test", Role::ProjectManager).await;
    let (hr, _) = seed_user(&state, "hr@corp.test", Role::Hr).await;

    let id = service::create(&state, &staff, leave_request(Some(pm.id)))
        .await
        .unwrap()
        .summary
        .request
        .id;
    let pm_decision = RequestDecision {
        status: None,
        pm_status: Some(ApprovalStatus::Approved),
    };
    service::decide(&state, &pm, id, pm_decision).await.unwrap();

    for caller in [&staff, &hr] {
        let err = service::delete(&state, caller, id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequestNotPending);
    }

    let kept = service::load_detail(&state, id).await.unwrap();
    assert_eq!(kept.summary.request.status, ApprovalStatus::Pending);
    assert_eq!(kept.summary.request.pm_status, ApprovalStatus::Approved);
}

#[tokio::test]
async fn counts_follow_the_query_filter() {
    let state = test_state().await;
    let app = app(&state);
    let (_, token) = seed_employee(&state, "staff@corp.test", Role::Employee).await;

    for body in [
        json!({
            "requestType": "allowance",
            "amount": 80.0,
            "date": "2024-01-02",
            "reason": "Client dinner"
        }),
        json!({
            "requestType": "leave",
            "type": "annual",
            "startDate": "2024-01-01",
            "endDate": "2024-01-03",
            "reason": "Family visit"
        }),
    ] {
        let (status, _) = send(&app, "POST", "/api/v1/request", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/v1/request/count/user?type=allowance",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowanceRequest"], 1);
    assert_eq!(body["leaveRequest"], 0);
    assert_eq!(body["pending"], 1);
    assert_eq!(body["total"], 1);

    let (_, body) = send(&app, "GET", "/api/v1/request/count/user", Some(&token), None).await;
    assert_eq!(body["pending"], 2);
    assert_eq!(body["total"], 2);
}
