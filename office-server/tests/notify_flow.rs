mod common;

use chrono::{Duration, NaiveDate};
use common::{app, count_notifications, seed_user, send, test_state};
use http::StatusCode;
use office_server::db::repository::{notification, project};
use office_server::email::LogMailer;
use office_server::jobs::overdue;
use office_server::notify;
use serde_json::json;
use shared::models::{Audience, Notice, ProjectCreate, Role, WorkStatus};

async fn pending_outbox(state: &office_server::ServerState) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM outbox WHERE processed_at IS NULL")
        .fetch_one(&state.pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn broadcast_reaches_every_user_once() {
    let state = test_state().await;
    let mut users = Vec::new();
    for (i, role) in [Role::Admin, Role::Hr, Role::Employee, Role::ProjectManager]
        .into_iter()
        .enumerate()
    {
        let (user, _) = seed_user(&state, &format!("u{i}@corp.test"), role).await;
        users.push(user);
    }

    let mut tx = state.pool.begin().await.unwrap();
    let notice = Notice::new("Office closed Friday", "/announcement", "announcement", Audience::All);
    notify::enqueue_notification(&mut tx, &notice).await.unwrap();
    tx.commit().await.unwrap();

    assert_eq!(notify::drain_once(&state.pool, &LogMailer, 5).await, 1);
    assert_eq!(notify::drain_once(&state.pool, &LogMailer, 5).await, 0);

    for user in &users {
        assert_eq!(count_notifications(&state, user.id).await, 1);
    }
}

#[tokio::test]
async fn announcement_queues_notice_and_mail_for_everyone() {
    let state = test_state().await;
    let app = app(&state);
    let (hr, token) = seed_user(&state, "hr@corp.test", Role::Hr).await;
    let (staff, staff_token) = seed_user(&state, "staff@corp.test", Role::Employee).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/v1/announcement",
        Some(&token),
        Some(json!({ "title": "Town hall", "body": "Friday 10:00 in the atrium" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["title"], "Town hall");

    // One notice event plus one email per account
    assert_eq!(pending_outbox(&state).await, 3);
    assert_eq!(notify::drain_once(&state.pool, &LogMailer, 5).await, 3);
    assert_eq!(pending_outbox(&state).await, 0);

    assert_eq!(count_notifications(&state, hr.id).await, 1);
    assert_eq!(count_notifications(&state, staff.id).await, 1);

    let (status, body) = send(&app, "GET", "/api/v1/notifications/count", Some(&staff_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = send(&app, "PATCH", "/api/v1/notifications/all", Some(&staff_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notification::count_unseen(&state.pool, staff.id).await.unwrap(), 0);
    assert_eq!(notification::count_unseen(&state.pool, hr.id).await.unwrap(), 1);
}

#[tokio::test]
async fn employees_cannot_publish_announcements() {
    let state = test_state().await;
    let app = app(&state);
    let (_, token) = seed_user(&state, "staff@corp.test", Role::Employee).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/v1/announcement",
        Some(&token),
        Some(json!({ "title": "Free pizza", "body": "Kitchen, now" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(pending_outbox(&state).await, 0);
}

#[tokio::test]
async fn overdue_project_is_flagged_once() {
    let state = test_state().await;
    let (pm, _) = seed_user(&state, "pm@corp.test", Role::ProjectManager).await;
    let (dev, _) = seed_user(&state, "dev@corp.test", Role::Employee).await;
    let (admin, _) = seed_user(&state, "admin@corp.test", Role::Admin).await;

    let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
    let created = project::insert(
        &state.pool,
        pm.id,
        &ProjectCreate {
            title: "Migration".into(),
            description: "Move payroll to the new ledger".into(),
            start_date: today - Duration::days(30),
            end_date: today - Duration::days(1),
            assignees: vec![dev.id],
            progress: None,
            status: None,
            estimated_time: None,
        },
    )
    .await
    .unwrap();

    let first = overdue::sweep(&state.pool, today).await.unwrap();
    assert_eq!(first.projects_flagged, 1);
    let second = overdue::sweep(&state.pool, today).await.unwrap();
    assert_eq!(second.projects_flagged, 0);

    let stored = project::find_by_id(&state.pool, created.id).await.unwrap().unwrap();
    assert_eq!(stored.status, WorkStatus::Overdue);

    notify::drain_once(&state.pool, &LogMailer, 5).await;
    for user in [&pm, &dev, &admin] {
        assert_eq!(count_notifications(&state, user.id).await, 1);
    }
}
