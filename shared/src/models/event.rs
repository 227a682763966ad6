//! Calendar Event Model

use serde::{Deserialize, Serialize};

/// Calendar entry. `start`/`end` are Unix millis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "start")]
    pub start_at: i64,
    #[serde(rename = "end")]
    pub end_at: i64,
    #[serde(rename = "type")]
    pub event_type: String,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCreate {
    pub title: String,
    pub description: Option<String>,
    pub start: i64,
    pub end: i64,
    #[serde(rename = "type")]
    pub event_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

/// `GET /events` filters: explicit window or a named range around now
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventQuery {
    pub start: Option<i64>,
    pub end: Option<i64>,
    /// week | month | year
    pub range: Option<String>,
}
