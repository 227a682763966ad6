//! Attendance Model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Where the employee worked from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum AttendanceType {
    Onsite,
    Remote,
}

/// Day status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "camelCase"))]
pub enum CheckInStatus {
    OnTime,
    Late,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "camelCase"))]
pub enum CheckOutStatus {
    OnTime,
    Early,
}

/// One record per (user, calendar day)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    /// Unix millis
    pub check_in: Option<i64>,
    /// Unix millis
    pub check_out: Option<i64>,
    #[serde(rename = "type")]
    pub attendance_type: Option<AttendanceType>,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub check_in_status: Option<CheckInStatus>,
    pub check_out_status: Option<CheckOutStatus>,
    pub overtime: bool,
    pub status: AttendanceStatus,
    pub reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub breaks: Vec<AttendanceBreak>,
}

/// Break taken during a working day ("HH:MM" wall-clock)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct AttendanceBreak {
    pub id: i64,
    pub attendance_id: i64,
    pub break_in: String,
    pub break_out: String,
}

/// Attendance joined with the owning employee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    #[cfg_attr(feature = "db", sqlx(flatten))]
    #[serde(flatten)]
    pub attendance: Attendance,
    pub employee_name: Option<String>,
    pub employee_position: Option<String>,
    pub employee_email: Option<String>,
}

/// Check-in payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInInput {
    #[serde(rename = "type")]
    pub attendance_type: Option<AttendanceType>,
    pub location: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub check_in_time: Option<DateTime<Utc>>,
}

/// Check-out payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutInput {
    pub check_out_time: Option<DateTime<Utc>>,
}

/// Break payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakInput {
    pub break_in: Option<String>,
    pub break_out: Option<String>,
}

/// Manual attendance entry by HR/admin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualAttendanceInput {
    /// Target user id
    pub employee_id: Option<i64>,
    pub status: Option<AttendanceStatus>,
    pub date: Option<NaiveDate>,
    pub reason: Option<String>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub attendance_type: Option<AttendanceType>,
    pub location: Option<String>,
}

/// Attendance correction by HR/admin
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceUpdate {
    pub status: Option<AttendanceStatus>,
    pub reason: Option<String>,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub attendance_type: Option<AttendanceType>,
    pub location: Option<String>,
}

/// Aggregates returned with the all-time listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceTotals {
    pub total_working_days: i64,
    pub total_present: i64,
    pub total_absent: i64,
    pub total_late: i64,
    pub total_on_time: i64,
    pub total_early_leave: i64,
    pub total_overtime: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceListing {
    pub all_time_attendance: Vec<AttendanceEntry>,
    #[serde(flatten)]
    pub totals: AttendanceTotals,
}

/// Today's headcount
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayAttendance {
    pub total_attendance: i64,
    pub total_absent: i64,
    pub total_late: i64,
    pub total_employees: i64,
}
