/**
 * Application State
 *
 * `AppState` is the single state type of the router. Handlers usually ask
 * for just the piece they need (`State<MessageService>`, `State<RealtimeHub>`,
 * ...) through the `FromRef` implementations below.
 *
 * Everything inside is cheap to clone: services hold `Arc`s to the store
 * collaborators, and the hub is a handle to shared state.
 */

use axum::extract::FromRef;

use crate::backend::auth::SessionKeys;
use crate::backend::messaging::MessageService;
use crate::backend::notifications::NotificationService;
use crate::backend::realtime::RealtimeHub;
use crate::backend::store::Stores;

#[derive(Clone)]
pub struct AppState {
    /// Persistence collaborators
    pub stores: Stores,
    /// Token verification
    pub sessions: SessionKeys,
    /// Presence, rooms and fan-out
    pub hub: RealtimeHub,
    /// REST messaging core
    pub messages: MessageService,
    pub notifications: NotificationService,
}

impl AppState {
    /// Wire services and the hub on top of a set of stores
    pub fn new(stores: Stores, sessions: SessionKeys, outbound_buffer: usize) -> Self {
        let hub = RealtimeHub::new(stores.messages.clone(), stores.groups.clone(), outbound_buffer);
        let messages = MessageService::new(stores.clone());
        let notifications = NotificationService::new(stores.notifications.clone(), hub.clone());

        Self {
            stores,
            sessions,
            hub,
            messages,
            notifications,
        }
    }
}

impl FromRef<AppState> for RealtimeHub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}

impl FromRef<AppState> for MessageService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.messages.clone()
    }
}

impl FromRef<AppState> for NotificationService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifications.clone()
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}
