//! Project Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle shared by projects and tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum WorkStatus {
    #[default]
    #[serde(rename = "To-Do")]
    #[cfg_attr(feature = "db", sqlx(rename = "To-Do"))]
    ToDo,
    #[serde(rename = "in-progress")]
    #[cfg_attr(feature = "db", sqlx(rename = "in-progress"))]
    InProgress,
    #[serde(rename = "completed")]
    #[cfg_attr(feature = "db", sqlx(rename = "completed"))]
    Completed,
    #[serde(rename = "cancelled")]
    #[cfg_attr(feature = "db", sqlx(rename = "cancelled"))]
    Cancelled,
    #[serde(rename = "overdue")]
    #[cfg_attr(feature = "db", sqlx(rename = "overdue"))]
    Overdue,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::ToDo => "To-Do",
            WorkStatus::InProgress => "in-progress",
            WorkStatus::Completed => "completed",
            WorkStatus::Cancelled => "cancelled",
            WorkStatus::Overdue => "overdue",
        }
    }

    /// Completed, cancelled and overdue items are skipped by the overdue sweep
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            WorkStatus::Completed | WorkStatus::Cancelled | WorkStatus::Overdue
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Owner (project manager)
    pub user_id: i64,
    pub progress: i32,
    pub status: WorkStatus,
    pub estimated_time: Option<String>,
    pub github_repo: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub assignees: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreate {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub assignees: Vec<i64>,
    pub progress: Option<i32>,
    pub status: Option<WorkStatus>,
    pub estimated_time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub progress: Option<i32>,
    pub status: Option<WorkStatus>,
    pub estimated_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssigneeInput {
    pub assignees: Vec<i64>,
}

/// Link an existing repository
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubLink {
    pub github_repo: String,
}

/// Create a repository on GitHub, then link it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubRepoCreate {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub private: bool,
}

/// Projects per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCounts {
    pub total: i64,
    pub to_do: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub overdue: i64,
}

impl ProjectCounts {
    pub fn add(&mut self, status: WorkStatus, n: i64) {
        self.total += n;
        match status {
            WorkStatus::ToDo => self.to_do += n,
            WorkStatus::InProgress => self.in_progress += n,
            WorkStatus::Completed => self.completed += n,
            WorkStatus::Cancelled => self.cancelled += n,
            WorkStatus::Overdue => self.overdue += n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_status_wire_names() {
        assert_eq!(serde_json::to_string(&WorkStatus::ToDo).unwrap(), "\"To-Do\"");
        let s: WorkStatus = serde_json::from_str("\"in-progress\"").unwrap();
        assert_eq!(s, WorkStatus::InProgress);
    }

    #[test]
    fn settled_statuses() {
        assert!(WorkStatus::Overdue.is_settled());
        assert!(WorkStatus::Completed.is_settled());
        assert!(!WorkStatus::InProgress.is_settled());
    }

    #[test]
    fn counts_accumulate_by_status() {
        let mut counts = ProjectCounts::default();
        counts.add(WorkStatus::ToDo, 2);
        counts.add(WorkStatus::Overdue, 1);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.to_do, 2);
        assert_eq!(counts.overdue, 1);
    }
}
