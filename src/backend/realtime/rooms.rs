/**
 * Rooms
 *
 * Two kinds of room exist:
 *
 * - `user:<id>` - a principal's private inbox. Every connection joins its own
 *   inbox on connect. Messages, typing and notifications addressed to the
 *   principal go here.
 * - `chat:<lo>:<hi>` - the pair room of two principals. The ids are sorted so
 *   the name does not depend on who joined first.
 *
 * Rooms exist only while at least one connection is in them.
 */

use std::collections::{HashMap, HashSet};
use std::fmt;

use uuid::Uuid;

use crate::backend::realtime::registry::ConnectionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomId {
    /// Private inbox of one principal
    User(Uuid),
    /// Pair room; always constructed with the smaller id first
    Chat(Uuid, Uuid),
}

impl RoomId {
    pub fn user(id: Uuid) -> Self {
        RoomId::User(id)
    }

    /// Canonical pair room for `a` and `b`, or `None` when `a == b`
    pub fn chat(a: Uuid, b: Uuid) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(RoomId::Chat(a, b)),
            std::cmp::Ordering::Greater => Some(RoomId::Chat(b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Pair key reported to clients in `joinedChat`, `"<lo>:<hi>"`
    pub fn chat_key(&self) -> Option<String> {
        match self {
            RoomId::Chat(lo, hi) => Some(format!("{}:{}", lo, hi)),
            RoomId::User(_) => None,
        }
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::User(id) => write!(f, "user:{}", id),
            RoomId::Chat(lo, hi) => write!(f, "chat:{}:{}", lo, hi),
        }
    }
}

/// Room membership of live connections, indexed both ways
#[derive(Debug, Default, Clone)]
pub struct RoomTable {
    members: HashMap<RoomId, HashSet<ConnectionId>>,
    joined: HashMap<ConnectionId, HashSet<RoomId>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the connection was not already in the room
    pub fn join(&mut self, connection: ConnectionId, room: RoomId) -> bool {
        self.joined.entry(connection).or_default().insert(room);
        self.members.entry(room).or_default().insert(connection)
    }

    /// Returns true if the connection was in the room
    pub fn leave(&mut self, connection: ConnectionId, room: RoomId) -> bool {
        if let Some(rooms) = self.joined.get_mut(&connection) {
            rooms.remove(&room);
            if rooms.is_empty() {
                self.joined.remove(&connection);
            }
        }
        self.remove_member(room, connection)
    }

    /// Remove a connection from every room, returning the rooms it was in
    pub fn leave_all(&mut self, connection: ConnectionId) -> Vec<RoomId> {
        let rooms: Vec<RoomId> = self
            .joined
            .remove(&connection)
            .map(|rooms| rooms.into_iter().collect())
            .unwrap_or_default();
        for room in &rooms {
            self.remove_member(*room, connection);
        }
        rooms
    }

    fn remove_member(&mut self, room: RoomId, connection: ConnectionId) -> bool {
        let Some(connections) = self.members.get_mut(&room) else {
            return false;
        };
        let removed = connections.remove(&connection);
        if connections.is_empty() {
            self.members.remove(&room);
        }
        removed
    }

    pub fn members(&self, room: &RoomId) -> Vec<ConnectionId> {
        self.members
            .get(room)
            .map(|connections| connections.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_member(&self, connection: ConnectionId, room: &RoomId) -> bool {
        self.members
            .get(room)
            .is_some_and(|connections| connections.contains(&connection))
    }

    pub fn room_count(&self) -> usize {
        self.members.len()
    }
}
