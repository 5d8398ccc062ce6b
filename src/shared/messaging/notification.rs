//! Notification Data Structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a notification is about
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Follow,
    Like,
    Comment,
    Message,
    Mention,
    Other,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Follow => "follow",
            NotificationKind::Like => "like",
            NotificationKind::Comment => "comment",
            NotificationKind::Message => "message",
            NotificationKind::Mention => "mention",
            NotificationKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "follow" => NotificationKind::Follow,
            "like" => NotificationKind::Like,
            "comment" => NotificationKind::Comment,
            "message" => NotificationKind::Message,
            "mention" => NotificationKind::Mention,
            _ => NotificationKind::Other,
        }
    }
}

/// A persisted notification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub content: String,
    /// Entity the notification refers to (post, message, ...)
    pub ref_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// A notification that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub content: String,
    pub ref_id: Option<Uuid>,
}

/// Response body for the unread counter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}
