//! Appraisal and Review Models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum AppraisalType {
    Promotion,
    Salary,
    Feedback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Appraisal {
    pub id: i64,
    pub date: NaiveDate,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub appraisal_type: AppraisalType,
    pub feedback: String,
    pub new_position: Option<String>,
    pub new_salary: Option<f64>,
    pub past_position: Option<String>,
    pub past_salary: Option<f64>,
}

/// Appraisal row joined with the employee's name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct AppraisalEntry {
    #[cfg_attr(feature = "db", sqlx(flatten))]
    #[serde(flatten)]
    pub appraisal: Appraisal,
    pub employee_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionInput {
    pub new_position: String,
    pub new_salary: Option<f64>,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryIncreaseInput {
    pub new_salary: f64,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackInput {
    pub feedback: String,
}

/// Per-employee figures shown on the appraisal screen
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppraisalMeasures {
    pub user_id: i64,
    pub name: String,
    pub position: String,
    pub salary: f64,
    pub projects_total: i64,
    pub projects_completed: i64,
    pub tickets_total: i64,
    pub tickets_completed: i64,
    pub average_grading: Option<f64>,
    pub leaves_taken: i64,
    pub present_days: i64,
    pub absent_days: i64,
    pub remote_days: i64,
    pub onsite_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub year: i32,
    pub job_knowledge_rating: Option<i32>,
    pub work_quality_rating: Option<i32>,
    pub problem_solving_rating: Option<i32>,
    pub job_knowledge_employee_review: Option<String>,
    pub work_quality_employee_review: Option<String>,
    pub problem_solving_employee_review: Option<String>,
    pub job_knowledge_manager_review: Option<String>,
    pub work_quality_manager_review: Option<String>,
    pub problem_solving_manager_review: Option<String>,
    pub manager_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Self-assessment submitted by the employee
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCreate {
    pub year: Option<i32>,
    pub job_knowledge_rating: Option<i32>,
    pub work_quality_rating: Option<i32>,
    pub problem_solving_rating: Option<i32>,
    pub job_knowledge_employee_review: Option<String>,
    pub work_quality_employee_review: Option<String>,
    pub problem_solving_employee_review: Option<String>,
}

/// Manager's part of a review
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerReviewInput {
    pub job_knowledge_manager_review: Option<String>,
    pub work_quality_manager_review: Option<String>,
    pub problem_solving_manager_review: Option<String>,
}
