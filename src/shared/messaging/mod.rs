//! Messaging Module
//!
//! Data structures for direct/group messaging:
//!
//! - `Message` - A persisted direct or group message
//! - `Conversation` - Derived per-counterpart summary
//! - `Notification` - Read/unread tracked notification
//!
//! # Usage
//!
//! ```rust
//! use hearth::shared::messaging::{Message, MessageTarget, Conversation, Notification};
//! ```

pub mod conversation;
pub mod message;
pub mod notification;

pub use conversation::{Conversation, ProfileSummary};
pub use message::{
    Media, MediaKind, Message, MessageTarget, NewMessage, ReadReceipt, SendMessageRequest,
};
pub use notification::{NewNotification, Notification, NotificationKind, UnreadCountResponse};
