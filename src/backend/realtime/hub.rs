/**
 * Realtime Hub
 *
 * Owns the presence tables and one bounded outbound queue per connection.
 * Transports call into the hub; the hub runs the dispatch rules and pushes
 * the resulting frames onto the queues.
 *
 * # Locking
 *
 * Presence tables and queues sit behind one `std::sync::Mutex`. It is never
 * held across an `.await`: store reads happen first, then the lock is taken
 * to plan and enqueue. Because enqueueing happens under the lock, every
 * connection observes frames in the order they were planned.
 *
 * # Slow consumers
 *
 * Queues are bounded. A frame that does not fit is dropped for that
 * connection and logged; clients recover by re-fetching over REST.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::backend::auth::Principal;
use crate::backend::error::BackendError;
use crate::backend::realtime::dispatch::{self, DeliveryStatus, Outbound, PresenceState, Target};
use crate::backend::realtime::registry::ConnectionId;
use crate::backend::store::{GroupDirectory, MessageStore};
use crate::shared::event::{ChatPairPayload, TypingPayload};
use crate::shared::{ClientEvent, ServerEvent};

/// Default capacity of each connection's outbound queue
pub const DEFAULT_OUTBOUND_BUFFER: usize = 256;

/// Size of the presence tables, reported by `/health`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubStats {
    pub online_users: usize,
    pub connections: usize,
    pub rooms: usize,
}

#[derive(Default)]
struct HubState {
    presence: PresenceState,
    outboxes: HashMap<ConnectionId, mpsc::Sender<ServerEvent>>,
}

impl HubState {
    /// Enqueue every effect; returns the number of frames queued
    fn emit(&self, effects: &[Outbound]) -> usize {
        let mut queued = 0;
        for outbound in effects {
            for connection in self.presence.resolve(&outbound.target) {
                if self.push(connection, outbound.event.clone()) {
                    queued += 1;
                }
            }
        }
        queued
    }

    fn push(&self, connection: ConnectionId, event: ServerEvent) -> bool {
        let Some(outbox) = self.outboxes.get(&connection) else {
            return false;
        };
        match outbox.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    "[Realtime] Outbound queue full for {}, dropping {}",
                    connection,
                    event.name()
                );
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

struct HubInner {
    state: Mutex<HubState>,
    next_id: AtomicU64,
    buffer: usize,
    messages: Arc<dyn MessageStore>,
    groups: Arc<dyn GroupDirectory>,
}

/// Shared handle to the realtime subsystem
#[derive(Clone)]
pub struct RealtimeHub {
    inner: Arc<HubInner>,
}

impl RealtimeHub {
    pub fn new(
        messages: Arc<dyn MessageStore>,
        groups: Arc<dyn GroupDirectory>,
        buffer: usize,
    ) -> Self {
        Self {
            inner: Arc::new(HubInner {
                state: Mutex::new(HubState::default()),
                next_id: AtomicU64::new(1),
                buffer: buffer.max(1),
                messages,
                groups,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new authenticated connection.
    ///
    /// Returns its id and the receiving end of its outbound queue.
    pub fn connect(&self, principal: &Principal) -> (ConnectionId, mpsc::Receiver<ServerEvent>) {
        let connection = ConnectionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::channel(self.inner.buffer);

        let mut state = self.lock();
        state.outboxes.insert(connection, tx);
        let effects = state.presence.on_connect(principal.user_id, connection);
        if !effects.is_empty() {
            tracing::info!("[Realtime] {} is online", principal.user_id);
        }
        state.emit(&effects);
        drop(state);

        tracing::info!("[Realtime] {} connected as {}", principal.user_id, connection);
        (connection, rx)
    }

    /// Tear down a connection. Calling it again for the same id does nothing.
    pub fn disconnect(&self, connection: ConnectionId) {
        let mut state = self.lock();
        if state.outboxes.remove(&connection).is_none() {
            return;
        }
        let principal = state.presence.registry.principal_of(connection);
        let effects = state.presence.on_disconnect(connection);
        state.emit(&effects);
        drop(state);

        match principal {
            Some(user) if !effects.is_empty() => {
                tracing::info!("[Realtime] {} closed, {} is offline", connection, user)
            }
            _ => tracing::info!("[Realtime] {} closed", connection),
        }
    }

    /// Process one inbound frame. Failures are reported to the originating
    /// connection as an `error` frame and never broadcast.
    pub async fn handle(&self, principal: &Principal, connection: ConnectionId, event: ClientEvent) {
        let result = match event {
            ClientEvent::SendMessage(payload) => self
                .deliver(principal, payload.message_id, payload.recipient_id)
                .await
                .map(|_| ()),
            ClientEvent::JoinChat(payload) => self.join_chat(principal, connection, &payload),
            ClientEvent::LeaveChat(payload) => self.leave_chat(principal, connection, &payload),
            ClientEvent::Typing(payload) => {
                self.typing(principal, &payload);
                Ok(())
            }
        };

        if let Err(err) = result {
            tracing::warn!("[Realtime] Rejected frame from {}: {}", connection, err);
            self.send_error(connection, err.client_message());
        }
    }

    /// Re-read a persisted message and fan it out.
    ///
    /// The sender's own connections always receive the echo. A deleted
    /// message yields `NotFound` and nothing is emitted.
    pub async fn deliver(
        &self,
        principal: &Principal,
        message_id: Uuid,
        claimed_recipient: Option<Uuid>,
    ) -> Result<DeliveryStatus, BackendError> {
        let message = match self.inner.messages.find_by_id(message_id).await? {
            Some(message) => message,
            None => {
                tracing::warn!("[Realtime] Dropping delivery of missing message {}", message_id);
                return Err(BackendError::not_found("message"));
            }
        };

        let group = match message.group_id() {
            Some(group_id) => self.inner.groups.find_group(group_id).await?,
            None => None,
        };

        let state = self.lock();
        let plan = dispatch::plan_delivery(principal, &message, claimed_recipient, group.as_ref())?;
        let status = state.presence.delivery_status(&message, &plan);
        state.emit(&plan);
        drop(state);

        match status {
            DeliveryStatus::Delivered { connections } => tracing::debug!(
                "[Realtime] Delivered {} to {} connection(s)",
                message_id,
                connections
            ),
            DeliveryStatus::Unavailable => tracing::debug!(
                "[Realtime] Recipient of {} is offline; it stays in the store",
                message_id
            ),
        }
        Ok(status)
    }

    pub fn join_chat(
        &self,
        principal: &Principal,
        connection: ConnectionId,
        payload: &ChatPairPayload,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        let effects = state
            .presence
            .on_join_chat(principal.user_id, connection, payload)?;
        state.emit(&effects);
        Ok(())
    }

    pub fn leave_chat(
        &self,
        principal: &Principal,
        connection: ConnectionId,
        payload: &ChatPairPayload,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        let effects = state
            .presence
            .on_leave_chat(principal.user_id, connection, payload)?;
        state.emit(&effects);
        Ok(())
    }

    /// Fire-and-forget typing indicator
    pub fn typing(&self, principal: &Principal, payload: &TypingPayload) {
        let state = self.lock();
        let effects = state.presence.on_typing(principal.user_id, payload);
        state.emit(&effects);
    }

    /// Push an event to every connection of a user. Returns frames queued.
    pub fn notify_user(&self, user_id: Uuid, event: ServerEvent) -> usize {
        self.lock().emit(&[Outbound::to_user(user_id, event)])
    }

    pub fn send_error(&self, connection: ConnectionId, message: impl Into<String>) {
        let state = self.lock();
        state.emit(&[Outbound::new(
            Target::Connection(connection),
            ServerEvent::Error {
                message: message.into(),
            },
        )]);
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.lock().presence.registry.is_online(user_id)
    }

    pub fn connection_count(&self) -> usize {
        self.lock().presence.registry.connection_count()
    }

    pub fn stats(&self) -> HubStats {
        let state = self.lock();
        HubStats {
            online_users: state.presence.registry.online_count(),
            connections: state.presence.registry.connection_count(),
            rooms: state.presence.rooms.room_count(),
        }
    }
}
