//! Notification events and their persisted form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What triggered a notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ProjectUpvote,
    CreatorUpvote,
    Comment,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProjectUpvote => "project_upvote",
            Self::CreatorUpvote => "creator_upvote",
            Self::Comment => "comment",
        }
    }
}

/// Append-only notification event as returned by the API.
///
/// Only `read` changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub payload: serde_json::Value,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// bincode-safe row; the opaque payload is kept as JSON text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredNotification {
    pub id: String,
    pub recipient_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub payload_json: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl StoredNotification {
    pub(crate) fn from_notification(n: &Notification) -> Self {
        Self {
            id: n.id.clone(),
            recipient_id: n.recipient_id.clone(),
            kind: n.kind,
            title: n.title.clone(),
            message: n.message.clone(),
            payload_json: n.payload.to_string(),
            read: n.read,
            created_at: n.created_at,
        }
    }

    pub(crate) fn into_notification(self) -> Notification {
        let payload = serde_json::from_str(&self.payload_json).unwrap_or_else(|err| {
            tracing::warn!(
                notification_id = %self.id,
                "Stored notification payload is not valid JSON: {}",
                err
            );
            serde_json::Value::Null
        });
        Notification {
            id: self.id,
            recipient_id: self.recipient_id,
            kind: self.kind,
            title: self.title,
            message: self.message,
            payload,
            read: self.read,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ListNotificationsQuery {
    pub limit: Option<usize>,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub user_id: String,
}
