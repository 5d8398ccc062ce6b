/**
 * Realtime Dispatch
 *
 * One function per inbound event kind. Each takes the presence tables and the
 * event and returns the frames to emit as `Outbound` effects; nothing here
 * touches a socket or the store, so every rule can be tested directly.
 *
 * # Routing rules
 *
 * - connect: join `user:<principal>`; first connection emits `userStatus online`
 *   to everyone
 * - joinChat: join the canonical pair room, answer `joinedChat` to the caller
 * - leaveChat: leave the pair room, no frame
 * - typing: `userTyping` to `user:<recipient>`, never the pair room
 * - delivery: `newMessage` to `user:<sender>` and `user:<recipient>`, or to
 *   `user:<member>` for every current group member
 * - disconnect: leave every room; last connection emits `userStatus offline`
 *   to every other connection
 */

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::backend::auth::Principal;
use crate::backend::error::BackendError;
use crate::backend::messaging::gate;
use crate::backend::realtime::registry::{ConnectionId, ConnectionRegistry};
use crate::backend::realtime::rooms::{RoomId, RoomTable};
use crate::backend::store::GroupRecord;
use crate::shared::event::{ChatPairPayload, TypingPayload};
use crate::shared::messaging::{Message, MessageTarget};
use crate::shared::{PresenceStatus, ServerEvent};

/// Who receives an outbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A single connection, e.g. the origin of a request
    Connection(ConnectionId),
    /// Every connection currently in a room
    Room(RoomId),
    /// Every live connection, optionally skipping one
    Everyone { except: Option<ConnectionId> },
}

/// A frame and its audience
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub target: Target,
    pub event: ServerEvent,
}

impl Outbound {
    pub fn new(target: Target, event: ServerEvent) -> Self {
        Self { target, event }
    }

    pub fn to_user(user_id: Uuid, event: ServerEvent) -> Self {
        Self::new(Target::Room(RoomId::user(user_id)), event)
    }
}

/// Outcome of a delivery that passed every check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// At least one addressee other than the sender had a live connection
    Delivered { connections: usize },
    /// Nobody besides the sender was online; the message waits in the store
    Unavailable,
}

/// Connection registry and room table, mutated together
#[derive(Debug, Default, Clone)]
pub struct PresenceState {
    pub registry: ConnectionRegistry,
    pub rooms: RoomTable,
}

impl PresenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an authenticated connection and join its inbox
    pub fn on_connect(&mut self, principal: Uuid, connection: ConnectionId) -> Vec<Outbound> {
        let first = self.registry.register(principal, connection);
        self.rooms.join(connection, RoomId::user(principal));

        if first {
            vec![Outbound::new(
                Target::Everyone { except: None },
                ServerEvent::UserStatus {
                    user_id: principal,
                    status: PresenceStatus::Online,
                },
            )]
        } else {
            Vec::new()
        }
    }

    pub fn on_join_chat(
        &mut self,
        principal: Uuid,
        connection: ConnectionId,
        payload: &ChatPairPayload,
    ) -> Result<Vec<Outbound>, BackendError> {
        match self.registry.principal_of(connection) {
            Some(owner) if owner == principal => {}
            Some(_) => return Err(BackendError::forbidden("Connection belongs to another user")),
            None => return Err(BackendError::not_found("connection")),
        }
        let room = pair_room(principal, payload)?;
        self.rooms.join(connection, room);

        let chat_room = room.chat_key().unwrap_or_else(|| room.to_string());
        Ok(vec![Outbound::new(
            Target::Connection(connection),
            ServerEvent::JoinedChat { chat_room },
        )])
    }

    pub fn on_leave_chat(
        &mut self,
        principal: Uuid,
        connection: ConnectionId,
        payload: &ChatPairPayload,
    ) -> Result<Vec<Outbound>, BackendError> {
        let room = pair_room(principal, payload)?;
        self.rooms.leave(connection, room);
        Ok(Vec::new())
    }

    pub fn on_typing(&self, principal: Uuid, payload: &TypingPayload) -> Vec<Outbound> {
        if payload.recipient_id == principal {
            return Vec::new();
        }
        vec![Outbound::to_user(
            payload.recipient_id,
            ServerEvent::UserTyping {
                sender_id: principal,
                is_typing: payload.is_typing,
            },
        )]
    }

    /// Remove a connection. Safe to call twice for the same connection.
    pub fn on_disconnect(&mut self, connection: ConnectionId) -> Vec<Outbound> {
        self.rooms.leave_all(connection);

        let Some(principal) = self.registry.principal_of(connection) else {
            return Vec::new();
        };
        if self.registry.unregister(principal, connection) {
            vec![Outbound::new(
                Target::Everyone {
                    except: Some(connection),
                },
                ServerEvent::UserStatus {
                    user_id: principal,
                    status: PresenceStatus::Offline,
                },
            )]
        } else {
            Vec::new()
        }
    }

    /// Expand a target into concrete connections, each at most once
    pub fn resolve(&self, target: &Target) -> Vec<ConnectionId> {
        let connections: BTreeSet<ConnectionId> = match target {
            Target::Connection(connection) => {
                if self.registry.principal_of(*connection).is_some() {
                    BTreeSet::from([*connection])
                } else {
                    BTreeSet::new()
                }
            }
            Target::Room(room) => self.rooms.members(room).into_iter().collect(),
            Target::Everyone { except } => self
                .registry
                .all_connections()
                .filter(|connection| Some(*connection) != *except)
                .collect(),
        };
        connections.into_iter().collect()
    }

    /// Classify a delivery plan: `Unavailable` when no addressee other than
    /// the sender has a live connection
    pub fn delivery_status(&self, message: &Message, plan: &[Outbound]) -> DeliveryStatus {
        let connections: usize = plan
            .iter()
            .filter(|outbound| match outbound.target {
                Target::Room(RoomId::User(user)) => user != message.sender_id,
                _ => false,
            })
            .map(|outbound| self.resolve(&outbound.target).len())
            .sum();

        if connections == 0 {
            DeliveryStatus::Unavailable
        } else {
            DeliveryStatus::Delivered { connections }
        }
    }
}

fn pair_room(principal: Uuid, payload: &ChatPairPayload) -> Result<RoomId, BackendError> {
    if principal != payload.user_id && principal != payload.recipient_id {
        return Err(BackendError::forbidden("You can only join your own chats"));
    }
    RoomId::chat(payload.user_id, payload.recipient_id)
        .ok_or_else(|| BackendError::invalid("recipientId", "cannot open a chat with yourself"))
}

/// Plan the fan-out of a message freshly re-read from the store.
///
/// `claimed_recipient` is what the client said the recipient was; it must
/// match the stored message when present. `group` must be the current record
/// of the message's group for group messages.
pub fn plan_delivery(
    principal: &Principal,
    message: &Message,
    claimed_recipient: Option<Uuid>,
    group: Option<&GroupRecord>,
) -> Result<Vec<Outbound>, BackendError> {
    gate::authorize_sender(principal, message)?;

    let event = ServerEvent::NewMessage(message.clone());
    match message.target {
        MessageTarget::User(recipient) => {
            if claimed_recipient.is_some_and(|claimed| claimed != recipient) {
                return Err(BackendError::invalid(
                    "recipientId",
                    "does not match the stored message",
                ));
            }
            Ok(vec![
                Outbound::to_user(message.sender_id, event.clone()),
                Outbound::to_user(recipient, event),
            ])
        }
        MessageTarget::Group(group_id) => {
            let group = gate::authorize_group_member(principal, group, group_id)?;
            let mut outbound: Vec<Outbound> = group
                .members
                .iter()
                .filter(|member| **member != message.sender_id)
                .map(|member| Outbound::to_user(*member, event.clone()))
                .collect();
            outbound.insert(0, Outbound::to_user(message.sender_id, event));
            Ok(outbound)
        }
    }
}
