/**
 * Connection Registry
 *
 * Maps each principal to the set of its live connections (one per open tab or
 * device). A principal is online iff it has an entry, and an entry never holds
 * an empty set: it is created by the first `register` and removed by the
 * `unregister` that empties it. Those two calls report the online/offline
 * transitions to the caller.
 *
 * The registry is plain data. Callers serialize access (see `hub`).
 */

use std::collections::{HashMap, HashSet};
use std::fmt;

use uuid::Uuid;

/// Process-unique identifier of one realtime connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConnectionRegistry {
    by_principal: HashMap<Uuid, HashSet<ConnectionId>>,
    owners: HashMap<ConnectionId, Uuid>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection. Returns true if it is the principal's first one.
    pub fn register(&mut self, principal: Uuid, connection: ConnectionId) -> bool {
        if let Some(previous) = self.owners.insert(connection, principal) {
            if previous != principal {
                self.remove_from(previous, connection);
            }
        }

        let connections = self.by_principal.entry(principal).or_default();
        let first = connections.is_empty();
        connections.insert(connection);
        first
    }

    /// Remove a connection. Returns true if the principal just went offline.
    ///
    /// Unknown connections are ignored, so a duplicate disconnect is harmless.
    pub fn unregister(&mut self, principal: Uuid, connection: ConnectionId) -> bool {
        if self.owners.get(&connection) != Some(&principal) {
            return false;
        }
        self.owners.remove(&connection);
        self.remove_from(principal, connection)
    }

    fn remove_from(&mut self, principal: Uuid, connection: ConnectionId) -> bool {
        let Some(connections) = self.by_principal.get_mut(&principal) else {
            return false;
        };
        if !connections.remove(&connection) {
            return false;
        }
        if connections.is_empty() {
            self.by_principal.remove(&principal);
            true
        } else {
            false
        }
    }

    pub fn is_online(&self, principal: Uuid) -> bool {
        self.by_principal.contains_key(&principal)
    }

    /// Live connections of a principal, in no particular order
    pub fn connections_of(&self, principal: Uuid) -> Vec<ConnectionId> {
        self.by_principal
            .get(&principal)
            .map(|connections| connections.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn principal_of(&self, connection: ConnectionId) -> Option<Uuid> {
        self.owners.get(&connection).copied()
    }

    pub fn all_connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.owners.keys().copied()
    }

    pub fn online_count(&self) -> usize {
        self.by_principal.len()
    }

    pub fn connection_count(&self) -> usize {
        self.owners.len()
    }
}
