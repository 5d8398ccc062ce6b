//! Conversation Data Structure
//!
//! A conversation is derived, never stored: one entry per counterpart the
//! viewer has exchanged direct messages with.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Message;

/// Public profile fields shown next to a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub id: Uuid,
    pub username: String,
    pub profile_pic: Option<String>,
}

/// Summary of the direct messages between the viewer and one counterpart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// The other participant
    pub counterpart_id: Uuid,
    /// Profile of the other participant; `None` if the account no longer exists
    pub user: Option<ProfileSummary>,
    /// Most recent message between the pair
    pub last_message: Message,
    /// Unread messages sent to the viewer by the counterpart
    pub unread_count: u32,
}
