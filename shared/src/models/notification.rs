//! Notification Model

use serde::{Deserialize, Serialize};

use super::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub message: String,
    pub link: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_seen: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Recipient selector for a fan-out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", content = "value", rename_all = "camelCase")]
pub enum Audience {
    User(i64),
    Role(Role),
    Roles(Vec<Role>),
    All,
}

/// Message to fan out to an [`Audience`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub message: String,
    pub link: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub audience: Audience,
}

impl Notice {
    pub fn new(
        message: impl Into<String>,
        link: impl Into<String>,
        kind: impl Into<String>,
        audience: Audience,
    ) -> Self {
        Self {
            message: message.into(),
            link: Some(link.into()),
            kind: kind.into(),
            audience,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnseenCount {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_serializes_with_target_tag() {
        let json = serde_json::to_value(Audience::Roles(vec![Role::Admin, Role::Hr])).unwrap();
        assert_eq!(json["target"], "roles");
        assert_eq!(json["value"][1], "HR");

        let all = serde_json::to_value(Audience::All).unwrap();
        assert_eq!(all["target"], "all");
    }

    #[test]
    fn notice_survives_outbox_encoding() {
        let notice = Notice::new("hello", "/request/1", "request", Audience::User(7));
        let text = serde_json::to_string(&notice).unwrap();
        let back: Notice = serde_json::from_str(&text).unwrap();
        assert_eq!(back, notice);
    }
}
