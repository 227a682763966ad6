//! Leave Balance Model

use serde::{Deserialize, Serialize};

/// Per-user, per-year leave balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct LeaveDetail {
    pub id: i64,
    pub user_id: i64,
    pub year: i32,
    pub available_leaves: i32,
    pub leaves_taken: i32,
    pub total_paid_leave_taken: i32,
    pub total_unpaid_leave_taken: i32,
}
