//! Comment and Attachment Models
//!
//! Both hang off a project or a ticket.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub comment: String,
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub ticket_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentCreate {
    pub comment: String,
    pub project_id: Option<i64>,
    pub ticket_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    /// URL or storage key
    pub attachment: String,
    pub user_id: i64,
    pub project_id: Option<i64>,
    pub ticket_id: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentCreate {
    pub attachment: String,
    pub project_id: Option<i64>,
    pub ticket_id: Option<i64>,
}
