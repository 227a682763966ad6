//! Request Model
//!
//! A request is an envelope row plus exactly one subtype row keyed by the
//! request id. The subtype travels as [`RequestPayload`], tagged by
//! `requestType`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum RequestType {
    Leave,
    Allowance,
    Overtime,
    Attendance,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Leave => "leave",
            RequestType::Allowance => "allowance",
            RequestType::Overtime => "overtime",
            RequestType::Attendance => "attendance",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leave" => Ok(RequestType::Leave),
            "allowance" => Ok(RequestType::Allowance),
            "overtime" => Ok(RequestType::Overtime),
            "attendance" => Ok(RequestType::Attendance),
            other => Err(format!("unknown request type: {other}")),
        }
    }
}

/// Status of either approval stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(format!("unknown status: {other}")),
        }
    }
}

/// Envelope row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: i64,
    pub user_id: i64,
    pub request_type: RequestType,
    /// HR/admin stage
    pub status: ApprovalStatus,
    /// Project manager stage
    pub pm_status: ApprovalStatus,
    /// Project manager asked to approve first
    pub requested_to: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Request {
    pub fn has_manager_stage(&self) -> bool {
        self.requested_to.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct LeavePayload {
    #[serde(rename = "type")]
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

impl LeavePayload {
    /// Inclusive number of calendar days covered
    pub fn day_count(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct AllowancePayload {
    pub amount: f64,
    pub reason: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OvertimePayload {
    pub date: NaiveDate,
    /// "HH:MM"
    pub start_time: String,
    /// "HH:MM"
    pub end_time: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct AttendancePayload {
    pub date: NaiveDate,
    pub reason: String,
}

/// Subtype data, tagged by `requestType`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "requestType", rename_all = "lowercase")]
pub enum RequestPayload {
    Leave(LeavePayload),
    Allowance(AllowancePayload),
    Overtime(OvertimePayload),
    Attendance(AttendancePayload),
}

impl RequestPayload {
    pub fn request_type(&self) -> RequestType {
        match self {
            RequestPayload::Leave(_) => RequestType::Leave,
            RequestPayload::Allowance(_) => RequestType::Allowance,
            RequestPayload::Overtime(_) => RequestType::Overtime,
            RequestPayload::Attendance(_) => RequestType::Attendance,
        }
    }
}

/// Create payload: the tagged subtype plus an optional stage-1 approver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCreate {
    #[serde(flatten)]
    pub payload: RequestPayload,
    pub requested_to: Option<i64>,
}

/// PATCH body: at most one stage is decided per call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDecision {
    pub status: Option<ApprovalStatus>,
    pub pm_status: Option<ApprovalStatus>,
}

/// Envelope joined with the owning employee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct RequestSummary {
    #[cfg_attr(feature = "db", sqlx(flatten))]
    #[serde(flatten)]
    pub request: Request,
    pub employee_name: Option<String>,
    pub employee_position: Option<String>,
}

/// Envelope, employee and subtype data in one view
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
    #[serde(flatten)]
    pub summary: RequestSummary,
    pub details: Option<RequestPayload>,
}

/// Number of requests per subtype in a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCounts {
    pub leave_request: i64,
    pub allowance_request: i64,
    pub overtime_request: i64,
    pub attendance_request: i64,
}

impl RequestCounts {
    pub fn tally<'a>(requests: impl IntoIterator<Item = &'a RequestSummary>) -> Self {
        let mut counts = Self::default();
        for r in requests {
            match r.request.request_type {
                RequestType::Leave => counts.leave_request += 1,
                RequestType::Allowance => counts.allowance_request += 1,
                RequestType::Overtime => counts.overtime_request += 1,
                RequestType::Attendance => counts.attendance_request += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestList {
    pub requests: Vec<RequestSummary>,
    #[serde(flatten)]
    pub counts: RequestCounts,
}

/// Counts by HR/admin stage status
/// Number of requests per stage-2 status in a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub total: i64,
}

impl StatusCounts {
    pub fn tally<'a>(requests: impl IntoIterator<Item = &'a RequestSummary>) -> Self {
        let mut counts = Self::default();
        for r in requests {
            match r.request.status {
                ApprovalStatus::Pending => counts.pending += 1,
                ApprovalStatus::Approved => counts.approved += 1,
                ApprovalStatus::Rejected => counts.rejected += 1,
            }
            counts.total += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leave_payload_counts_inclusive_days() {
        let leave = LeavePayload {
            leave_type: "sick".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            reason: "flu".into(),
        };
        assert_eq!(leave.day_count(), 3);
    }

    #[test]
    fn create_body_is_flat_and_tagged() {
        let body = serde_json::json!({
            "requestType": "allowance",
            "amount": 120.5,
            "date": "2024-03-01",
            "requestedTo": 42
        });
        let create: RequestCreate = serde_json::from_value(body).unwrap();
        assert_eq!(create.requested_to, Some(42));
        assert_eq!(create.payload.request_type(), RequestType::Allowance);
        match create.payload {
            RequestPayload::Allowance(a) => {
                assert_eq!(a.amount, 120.5);
                assert!(a.reason.is_none());
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn unknown_type_does_not_parse() {
        assert!("vacation".parse::<RequestType>().is_err());
        let body = serde_json::json!({ "requestType": "vacation", "date": "2024-03-01" });
        assert!(serde_json::from_value::<RequestCreate>(body).is_err());
    }
}
