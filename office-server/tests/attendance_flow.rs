mod common;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use common::{count_notifications, seed_employee, test_state};
use office_server::attendance::service;
use office_server::db::repository::attendance;
use office_server::email::LogMailer;
use office_server::jobs::absentee;
use office_server::notify;
use shared::ErrorCode;
use shared::models::{
    AttendanceStatus, BreakInput, CheckInInput, CheckInStatus, CheckOutInput, Role,
};

/// Monday 2024-01-08 at `hour`:`min` UTC (the default business timezone)
fn monday_at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 8, hour, min, 0).unwrap()
}

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
}

fn pause(from: &str, to: &str) -> BreakInput {
    BreakInput {
        break_in: Some(from.into()),
        break_out: Some(to.into()),
    }
}

#[tokio::test]
async fn check_in_after_five_is_rejected() {
    let state = test_state().await;
    let (me, _) = seed_employee(&state, "late@corp.test", Role::Employee).await;

    let err = service::check_in(&state, &me, CheckInInput::default(), monday_at(17, 5))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CheckInClosed);
    assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn check_in_status_follows_the_clock() {
    let state = test_state().await;
    let (early, _) = seed_employee(&state, "early@corp.test", Role::Employee).await;
    let (late, _) = seed_employee(&state, "late@corp.test", Role::Employee).await;

    let record = service::check_in(&state, &early, CheckInInput::default(), monday_at(8, 45))
        .await
        .unwrap();
    assert_eq!(record.check_in_status, Some(CheckInStatus::OnTime));
    assert_eq!(record.status, AttendanceStatus::Present);

    let record = service::check_in(&state, &late, CheckInInput::default(), monday_at(9, 30))
        .await
        .unwrap();
    assert_eq!(record.check_in_status, Some(CheckInStatus::Late));
}

#[tokio::test]
async fn break_rules() {
    let state = test_state().await;
    let (me, _) = seed_employee(&state, "breaks@corp.test", Role::Employee).await;

    let err = service::add_break(&state, &me, pause("10:00", "10:15"), monday_at(10, 20))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotCheckedIn);

    service::check_in(&state, &me, CheckInInput::default(), monday_at(8, 0))
        .await
        .unwrap();

    let err = service::add_break(&state, &me, pause("10:00", "11:30"), monday_at(11, 35))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BreakDurationInvalid);

    for (from, to) in [("10:00", "10:10"), ("11:00", "11:10"), ("12:00", "12:45"), ("14:00", "14:05")] {
        service::add_break(&state, &me, pause(from, to), monday_at(15, 0))
            .await
            .unwrap();
    }
    let err = service::add_break(&state, &me, pause("15:00", "15:05"), monday_at(15, 10))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::BreakLimitReached);
}

#[tokio::test]
async fn no_check_in_after_check_out() {
    let state = test_state().await;
    let (me, _) = seed_employee(&state, "done@corp.test", Role::Employee).await;

    service::check_in(&state, &me, CheckInInput::default(), monday_at(8, 0))
        .await
        .unwrap();
    let record = service::check_out(&state, &me, Default::default(), monday_at(17, 30))
        .await
        .unwrap();
    assert!(record.overtime);

    let err = service::check_in(&state, &me, CheckInInput::default(), monday_at(17, 40))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyCheckedOut);
}

#[tokio::test]
async fn absentee_sweep_marks_only_missing_weekday_staff() {
    let state = test_state().await;
    let (present, _) = seed_employee(&state, "here@corp.test", Role::Employee).await;
    let (absent, _) = seed_employee(&state, "away@corp.test", Role::Employee).await;

    service::check_in(&state, &present, CheckInInput::default(), monday_at(8, 30))
        .await
        .unwrap();

    let saturday = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();
    assert_eq!(absentee::mark_absentees(&state.pool, saturday).await.unwrap(), 0);

    assert_eq!(absentee::mark_absentees(&state.pool, monday()).await.unwrap(), 1);
    // A second run finds nobody left to mark
    assert_eq!(absentee::mark_absentees(&state.pool, monday()).await.unwrap(), 0);

    notify::drain_once(&state.pool, &LogMailer, 5).await;
    assert_eq!(count_notifications(&state, absent.id).await, 1);
    assert_eq!(count_notifications(&state, present.id).await, 0);
}

#[tokio::test]
async fn clocking_cannot_target_another_day() {
    let state = test_state().await;
    let (me, _) = seed_employee(&state, "backdate@corp.test", Role::Employee).await;
    assert_eq!(absentee::mark_absentees(&state.pool, monday()).await.unwrap(), 1);

    let wednesday = Utc.with_ymd_and_hms(2024, 1, 10, 11, 0, 0).unwrap();
    let backdated = CheckInInput {
        check_in_time: Some(monday_at(8, 0)),
        ..Default::default()
    };
    let err = service::check_in(&state, &me, backdated, wednesday)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);

    let kept = attendance::find_for_day(&state.pool, me.id, monday())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept.status, AttendanceStatus::Absent);
    assert_eq!(kept.check_in, None);

    // A time earlier on the same day is honoured
    let same_day = CheckInInput {
        check_in_time: Some(Utc.with_ymd_and_hms(2024, 1, 10, 8, 50, 0).unwrap()),
        ..Default::default()
    };
    let record = service::check_in(&state, &me, same_day, wednesday).await.unwrap();
    assert_eq!(record.check_in_status, Some(CheckInStatus::OnTime));

    let err = service::check_out(
        &state,
        &me,
        CheckOutInput {
            check_out_time: Some(Utc.with_ymd_and_hms(2024, 1, 11, 17, 0, 0).unwrap()),
        },
        wednesday,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationFailed);
}
