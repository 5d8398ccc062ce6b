/**
 * Realtime Event Protocol
 *
 * Frames exchanged over the realtime socket. Every frame is a JSON object
 * of the form `{"event": "<name>", "data": {...}}`.
 *
 * Inbound (client to server): `sendMessage`, `joinChat`, `leaveChat`, `typing`.
 * Outbound (server to client): `newMessage`, `userTyping`, `userStatus`,
 * `joinedChat`, `notification`, `error`.
 *
 * Inbound frames never carry message content: `sendMessage` names an already
 * persisted message by id and the server re-reads it from the store.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::messaging::{Message, Notification};

/// `sendMessage` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub message_id: Uuid,
    /// Expected recipient of a direct message; omitted for group messages
    #[serde(default)]
    pub recipient_id: Option<Uuid>,
}

/// `joinChat` / `leaveChat` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatPairPayload {
    pub user_id: Uuid,
    pub recipient_id: Uuid,
}

/// `typing` payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub recipient_id: Uuid,
    pub is_typing: bool,
}

/// Frame sent by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    SendMessage(SendMessagePayload),
    JoinChat(ChatPairPayload),
    LeaveChat(ChatPairPayload),
    Typing(TypingPayload),
}

/// Online status carried by `userStatus`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
}

/// Frame sent by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    NewMessage(Message),
    UserTyping { sender_id: Uuid, is_typing: bool },
    UserStatus { user_id: Uuid, status: PresenceStatus },
    JoinedChat { chat_room: String },
    Notification(Notification),
    Error { message: String },
}

impl ServerEvent {
    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::NewMessage(_) => "newMessage",
            ServerEvent::UserTyping { .. } => "userTyping",
            ServerEvent::UserStatus { .. } => "userStatus",
            ServerEvent::JoinedChat { .. } => "joinedChat",
            ServerEvent::Notification(_) => "notification",
            ServerEvent::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_send_message() {
        let id = Uuid::new_v4();
        let recipient = Uuid::new_v4();
        let frame = format!(
            r#"{{"event":"sendMessage","data":{{"messageId":"{id}","recipientId":"{recipient}"}}}}"#
        );

        let event: ClientEvent = serde_json::from_str(&frame).unwrap();
        assert_eq!(
            event,
            ClientEvent::SendMessage(SendMessagePayload {
                message_id: id,
                recipient_id: Some(recipient),
            })
        );
    }

    #[test]
    fn test_parse_group_send_without_recipient() {
        let id = Uuid::new_v4();
        let frame = format!(r#"{{"event":"sendMessage","data":{{"messageId":"{id}"}}}}"#);

        let event: ClientEvent = serde_json::from_str(&frame).unwrap();
        assert!(matches!(event, ClientEvent::SendMessage(SendMessagePayload { recipient_id: None, .. })));
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let result = serde_json::from_str::<ClientEvent>(r#"{"event":"shout","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_user_typing_wire_format() {
        let sender = Uuid::new_v4();
        let event = ServerEvent::UserTyping { sender_id: sender, is_typing: true };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "userTyping");
        assert_eq!(json["data"]["senderId"], sender.to_string());
        assert_eq!(json["data"]["isTyping"], true);
    }

    #[test]
    fn test_user_status_wire_format() {
        let user = Uuid::new_v4();
        let event = ServerEvent::UserStatus { user_id: user, status: PresenceStatus::Offline };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], event.name());
        assert_eq!(json["data"]["userId"], user.to_string());
        assert_eq!(json["data"]["status"], "offline");
    }
}
