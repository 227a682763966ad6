//! Attendance derivation rules
//!
//! Thresholds are local hours in the business timezone.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use shared::ErrorCode;
use shared::models::{AttendanceEntry, AttendanceStatus, AttendanceTotals, CheckInStatus, CheckOutStatus};

use crate::utils::time::parse_hhmm;
use crate::utils::{AppError, AppResult};

/// Check-ins from this hour on are late
pub const LATE_HOUR: u32 = 9;
/// End of the working day: check-in closes, check-out before it is early
pub const CLOSING_HOUR: u32 = 17;
pub const MAX_BREAKS: i64 = 4;
pub const MAX_BREAK_MINUTES: i64 = 60;

pub fn local_hour(at: DateTime<Utc>, tz: Tz) -> u32 {
    at.with_timezone(&tz).hour()
}

pub fn check_in_status(hour: u32) -> CheckInStatus {
    if hour >= LATE_HOUR {
        CheckInStatus::Late
    } else {
        CheckInStatus::OnTime
    }
}

/// Check-in is closed from [`CLOSING_HOUR`]
pub fn ensure_check_in_open(hour: u32) -> AppResult<()> {
    if hour >= CLOSING_HOUR {
        return Err(AppError::with_message(
            ErrorCode::CheckInClosed,
            "You can't check in after 5 PM",
        ));
    }
    Ok(())
}

/// (check-out status, overtime)
///
/// From the closing hour on a check-out is both on time and overtime.
pub fn check_out_outcome(hour: u32) -> (CheckOutStatus, bool) {
    if hour < CLOSING_HOUR {
        (CheckOutStatus::Early, false)
    } else {
        (CheckOutStatus::OnTime, true)
    }
}

/// Validate a break and return its length in minutes
pub fn break_minutes(break_in: &str, break_out: &str) -> AppResult<i64> {
    let start = parse_hhmm(break_in)?;
    let end = parse_hhmm(break_out)?;
    let minutes = (end - start).num_minutes();
    if !(0..=MAX_BREAK_MINUTES).contains(&minutes) {
        return Err(AppError::with_message(
            ErrorCode::BreakDurationInvalid,
            format!("A break must last between 0 and {MAX_BREAK_MINUTES} minutes"),
        ));
    }
    Ok(minutes)
}

/// Statuses derived from explicit times (manual entry, corrections)
pub struct Derived {
    pub check_in_status: Option<CheckInStatus>,
    pub check_out_status: Option<CheckOutStatus>,
    pub overtime: bool,
}

pub fn derive(
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
    tz: Tz,
) -> AppResult<Derived> {
    if check_out.is_some() && check_in.is_none() {
        return Err(AppError::validation("Check-out requires a check-in"));
    }
    if let (Some(start), Some(end)) = (check_in, check_out)
        && end < start
    {
        return Err(AppError::validation("Check-out must be after check-in"));
    }

    let check_in_status = check_in.map(|at| check_in_status(local_hour(at, tz)));
    let (check_out_status, overtime) = match check_out {
        Some(at) => {
            let (status, overtime) = check_out_outcome(local_hour(at, tz));
            (Some(status), overtime)
        }
        None => (None, false),
    };
    Ok(Derived {
        check_in_status,
        check_out_status,
        overtime,
    })
}

/// Aggregate a listing
pub fn totals(entries: &[AttendanceEntry]) -> AttendanceTotals {
    let mut totals = AttendanceTotals {
        total_working_days: entries.len() as i64,
        ..Default::default()
    };
    for entry in entries {
        let a = &entry.attendance;
        match a.status {
            AttendanceStatus::Present => totals.total_present += 1,
            AttendanceStatus::Absent => totals.total_absent += 1,
        }
        match a.check_in_status {
            Some(CheckInStatus::Late) => totals.total_late += 1,
            Some(CheckInStatus::OnTime) => totals.total_on_time += 1,
            None => {}
        }
        if a.check_out_status == Some(CheckOutStatus::Early) {
            totals.total_early_leave += 1;
        }
        if a.overtime {
            totals.total_overtime += 1;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use shared::models::Attendance;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, hour, minute, 0).unwrap()
    }

    #[test]
    fn nine_oclock_is_late() {
        assert_eq!(check_in_status(8), CheckInStatus::OnTime);
        assert_eq!(check_in_status(9), CheckInStatus::Late);
    }

    #[test]
    fn check_in_closes_at_five() {
        assert!(ensure_check_in_open(16).is_ok());
        let err = ensure_check_in_open(17).unwrap_err();
        assert_eq!(err.http_status(), http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn late_check_out_is_on_time_and_overtime() {
        assert_eq!(check_out_outcome(16), (CheckOutStatus::Early, false));
        assert_eq!(check_out_outcome(17), (CheckOutStatus::OnTime, true));
    }

    #[test]
    fn hours_follow_the_business_timezone() {
        // 07:30 UTC is 08:30 in Paris during winter
        assert_eq!(local_hour(at(7, 30), chrono_tz::Europe::Paris), 8);
        assert_eq!(local_hour(at(7, 30), Tz::UTC), 7);
    }

    #[test]
    fn break_limits() {
        assert_eq!(break_minutes("12:00", "12:45").unwrap(), 45);
        assert_eq!(break_minutes("12:00", "13:00").unwrap(), 60);
        assert!(break_minutes("12:00", "13:01").is_err());
        assert!(break_minutes("13:00", "12:00").is_err());
        assert!(break_minutes("noon", "13:00").is_err());
    }

    #[test]
    fn derive_rejects_check_out_without_check_in() {
        assert!(derive(None, Some(at(18, 0)), Tz::UTC).is_err());
        assert!(derive(Some(at(18, 0)), Some(at(9, 0)), Tz::UTC).is_err());

        let derived = derive(Some(at(8, 0)), Some(at(18, 0)), Tz::UTC).unwrap();
        assert_eq!(derived.check_in_status, Some(CheckInStatus::OnTime));
        assert_eq!(derived.check_out_status, Some(CheckOutStatus::OnTime));
        assert!(derived.overtime);
    }

    #[test]
    fn totals_count_each_flag() {
        let base = Attendance {
            id: 1,
            user_id: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            check_in: None,
            check_out: None,
            attendance_type: None,
            location: None,
            lat: None,
            lng: None,
            check_in_status: Some(CheckInStatus::Late),
            check_out_status: Some(CheckOutStatus::Early),
            overtime: false,
            status: AttendanceStatus::Present,
            reason: None,
            created_at: 0,
            updated_at: 0,
            breaks: Vec::new(),
        };
        let mut absent = base.clone();
        absent.status = AttendanceStatus::Absent;
        absent.check_in_status = None;
        absent.check_out_status = None;

        let entries: Vec<AttendanceEntry> = [base, absent]
            .into_iter()
            .map(|attendance| AttendanceEntry {
                attendance,
                employee_name: None,
                employee_position: None,
                employee_email: None,
            })
            .collect();

        let totals = totals(&entries);
        assert_eq!(totals.total_working_days, 2);
        assert_eq!(totals.total_present, 1);
        assert_eq!(totals.total_absent, 1);
        assert_eq!(totals.total_late, 1);
        assert_eq!(totals.total_early_leave, 1);
        assert_eq!(totals.total_overtime, 0);
    }
}
