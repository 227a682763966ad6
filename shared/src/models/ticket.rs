//! Ticket Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::WorkStatus;

pub const MAX_GRADING: i32 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: i64,
    pub title: String,
    pub status: WorkStatus,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<i64>,
    pub priority: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub estimated_time: Option<String>,
    pub reporter_id: i64,
    pub progress: i32,
    pub spent_time: Option<String>,
    pub linked_project: Option<i64>,
    /// 0..=10
    pub grading: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCreate {
    pub title: String,
    pub status: Option<WorkStatus>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<i64>,
    pub priority: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub estimated_time: Option<String>,
    pub linked_project: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    pub title: Option<String>,
    pub status: Option<WorkStatus>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<i64>,
    pub priority: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub estimated_time: Option<String>,
    pub progress: Option<i32>,
    pub spent_time: Option<String>,
    pub linked_project: Option<i64>,
    pub grading: Option<i32>,
}
