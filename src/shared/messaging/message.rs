//! Message Data Structure
//!
//! A persisted direct or group message. Messages are immutable once created
//! apart from their read state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Kind of media attached to a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Document,
    #[default]
    None,
}

impl MediaKind {
    /// Classify an uploaded file by its MIME type
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image/") {
            MediaKind::Image
        } else if mime.starts_with("video/") {
            MediaKind::Video
        } else if mime.starts_with("application/") {
            MediaKind::Document
        } else {
            MediaKind::None
        }
    }

    /// Column value used by the database
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Document => "document",
            MediaKind::None => "none",
        }
    }

    /// Parse a column value, falling back to `None` for unknown values
    pub fn parse(s: &str) -> Self {
        match s {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            "document" => MediaKind::Document,
            _ => MediaKind::None,
        }
    }
}

/// Reference to an uploaded media file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub url: String,
    pub kind: MediaKind,
}

/// Addressee of a message: exactly one user or one group, never both.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MessageTarget {
    User(Uuid),
    Group(Uuid),
}

/// Per-user read timestamp on a group message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReadReceipt {
    pub user_id: Uuid,
    pub read_at: DateTime<Utc>,
}

/// A persisted message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message ID
    pub id: Uuid,
    /// User who sent the message
    pub sender_id: Uuid,
    /// Recipient user or group
    pub target: MessageTarget,
    /// Text content, never empty
    pub content: String,
    /// Optional attachment
    pub media: Option<Media>,
    /// Whether the recipient has read a direct message
    pub read: bool,
    /// Read receipts for group messages
    #[serde(default)]
    pub read_by: Vec<ReadReceipt>,
    /// Assigned by the store; authoritative for ordering
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn recipient_id(&self) -> Option<Uuid> {
        match self.target {
            MessageTarget::User(id) => Some(id),
            MessageTarget::Group(_) => None,
        }
    }

    pub fn group_id(&self) -> Option<Uuid> {
        match self.target {
            MessageTarget::Group(id) => Some(id),
            MessageTarget::User(_) => None,
        }
    }

    /// The other party of a direct message as seen by `viewer`.
    ///
    /// Returns `None` for group messages and for direct messages the viewer
    /// did not take part in.
    pub fn counterpart_of(&self, viewer: Uuid) -> Option<Uuid> {
        let recipient = self.recipient_id()?;
        if self.sender_id == viewer {
            Some(recipient)
        } else if recipient == viewer {
            Some(self.sender_id)
        } else {
            None
        }
    }

    /// Whether `user_id` has a read receipt on this group message
    pub fn is_read_by(&self, user_id: Uuid) -> bool {
        self.read_by.iter().any(|receipt| receipt.user_id == user_id)
    }

    /// Ordering key: creation time, then id so that equal timestamps still
    /// produce a total order.
    pub fn order_key(&self) -> (DateTime<Utc>, Uuid) {
        (self.created_at, self.id)
    }
}

/// A message that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub sender_id: Uuid,
    pub target: MessageTarget,
    pub content: String,
    pub media: Option<Media>,
}

impl NewMessage {
    pub fn direct(sender_id: Uuid, recipient_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            sender_id,
            target: MessageTarget::User(recipient_id),
            content: content.into(),
            media: None,
        }
    }

    pub fn group(sender_id: Uuid, group_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            sender_id,
            target: MessageTarget::Group(group_id),
            content: content.into(),
            media: None,
        }
    }

    pub fn with_media(mut self, media: Option<Media>) -> Self {
        self.media = media;
        self
    }

    /// Reject empty content and empty media URLs
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.content.trim().is_empty() {
            return Err(SharedError::validation("content", "Message content cannot be empty"));
        }
        if let Some(media) = &self.media {
            if media.url.trim().is_empty() {
                return Err(SharedError::validation("mediaUrl", "Media URL cannot be empty"));
            }
        }
        Ok(())
    }
}

/// Request body for sending a message over REST
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub content: String,
    /// URL of an already uploaded attachment
    #[serde(default)]
    pub media_url: Option<String>,
    /// MIME type of the attachment
    #[serde(default)]
    pub media_mime: Option<String>,
}

impl SendMessageRequest {
    /// Attachment described by this request, if any
    pub fn media(&self) -> Option<Media> {
        self.media_url.as_ref().map(|url| Media {
            url: url.clone(),
            kind: self
                .media_mime
                .as_deref()
                .map(MediaKind::from_mime)
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn direct(sender: Uuid, recipient: Uuid) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id: sender,
            target: MessageTarget::User(recipient),
            content: "hi".to_string(),
            media: None,
            read: false,
            read_by: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_media_kind_from_mime() {
        assert_eq!(MediaKind::from_mime("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("video/mp4"), MediaKind::Video);
        assert_eq!(MediaKind::from_mime("application/pdf"), MediaKind::Document);
        assert_eq!(MediaKind::from_mime("text/plain"), MediaKind::None);
    }

    #[test]
    fn test_counterpart_of() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let message = direct(a, b);

        assert_eq!(message.counterpart_of(a), Some(b));
        assert_eq!(message.counterpart_of(b), Some(a));
        assert_eq!(message.counterpart_of(c), None);
    }

    #[test]
    fn test_group_message_has_no_counterpart() {
        let sender = Uuid::new_v4();
        let mut message = direct(sender, Uuid::new_v4());
        message.target = MessageTarget::Group(Uuid::new_v4());

        assert_eq!(message.recipient_id(), None);
        assert_eq!(message.counterpart_of(sender), None);
    }

    #[test]
    fn test_validate_rejects_blank_content() {
        let message = NewMessage::direct(Uuid::new_v4(), Uuid::new_v4(), "   ");
        assert!(matches!(
            message.validate(),
            Err(SharedError::ValidationError { ref field, .. }) if field == "content"
        ));
    }

    #[test]
    fn test_send_request_media() {
        let request = SendMessageRequest {
            content: "look".to_string(),
            media_url: Some("/uploads/cat.png".to_string()),
            media_mime: Some("image/png".to_string()),
        };
        let media = request.media().unwrap();
        assert_eq!(media.kind, MediaKind::Image);
        assert_eq!(media.url, "/uploads/cat.png");
    }
}
