//! Employee Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{LeaveDetail, Role};

/// Employee record, 1:1 with a [`super::User`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub position: String,
    pub department: String,
    pub team: Option<String>,
    pub manager: Option<String>,
    pub description: Option<String>,
    pub github_username: Option<String>,
    pub salary: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Working hours start ("09:00")
    #[serde(rename = "from")]
    pub work_from: String,
    /// Working hours end ("17:00")
    #[serde(rename = "to")]
    pub work_to: String,
    pub status: String,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub documents: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Employee joined with its account (email + role)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct EmployeeProfile {
    #[cfg_attr(feature = "db", sqlx(flatten))]
    #[serde(flatten)]
    pub employee: Employee,
    pub email: String,
    pub role: Role,
}

/// Full view returned by the user information endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInformation {
    pub employee: EmployeeProfile,
    pub leave_detail: Option<LeaveDetail>,
}

/// Onboarding payload: creates User + Employee + LeaveDetail together
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCreate {
    pub email: String,
    /// When absent a verification PIN is mailed instead
    pub password: Option<String>,
    pub role: Option<Role>,
    pub name: String,
    pub position: String,
    pub department: String,
    pub team: Option<String>,
    pub manager: Option<String>,
    pub description: Option<String>,
    pub github_username: Option<String>,
    pub salary: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "from")]
    pub work_from: String,
    #[serde(rename = "to")]
    pub work_to: String,
    pub status: String,
    #[serde(default)]
    pub documents: Vec<String>,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub team: Option<String>,
    pub manager: Option<String>,
    pub description: Option<String>,
    pub github_username: Option<String>,
    pub salary: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "from")]
    pub work_from: Option<String>,
    #[serde(rename = "to")]
    pub work_to: Option<String>,
    pub status: Option<String>,
    pub documents: Option<Vec<String>>,
    /// Only HR/admin may change roles
    pub role: Option<Role>,
}

impl EmployeeUpdate {
    /// Fields an employee may edit on their own record
    pub fn is_self_service(&self) -> bool {
        self.salary.is_none()
            && self.position.is_none()
            && self.department.is_none()
            && self.status.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.role.is_none()
    }
}
