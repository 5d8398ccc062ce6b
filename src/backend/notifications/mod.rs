//! Notifications Module
//!
//! Read/unread accounting for notifications, plus a best-effort push of new
//! notifications to the recipient's inbox room.
//!
//! - **`handlers`** - HTTP handlers under `/api/v1/notifications`

pub mod handlers;

use std::sync::Arc;

use uuid::Uuid;

use crate::backend::auth::Principal;
use crate::backend::error::BackendError;
use crate::backend::realtime::RealtimeHub;
use crate::backend::store::NotificationStore;
use crate::shared::messaging::{NewNotification, Notification, NotificationKind};
use crate::shared::ServerEvent;

pub use handlers::*;

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    hub: RealtimeHub,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>, hub: RealtimeHub) -> Self {
        Self { store, hub }
    }

    /// Notifications addressed to the principal, newest first
    pub async fn list(&self, principal: &Principal) -> Result<Vec<Notification>, BackendError> {
        self.store.list_for(principal.user_id).await
    }

    pub async fn unread_count(&self, principal: &Principal) -> Result<u64, BackendError> {
        self.store.unread_count(principal.user_id).await
    }

    pub async fn mark_read(
        &self,
        principal: &Principal,
        notification_id: Uuid,
    ) -> Result<Notification, BackendError> {
        let notification = self
            .store
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| BackendError::not_found("notification"))?;
        if notification.recipient_id != principal.user_id {
            return Err(BackendError::forbidden("Not your notification"));
        }
        if notification.is_read {
            return Ok(notification);
        }

        self.store
            .mark_read(notification_id)
            .await?
            .ok_or_else(|| BackendError::not_found("notification"))
    }

    /// Returns how many notifications changed from unread to read
    pub async fn mark_all_read(&self, principal: &Principal) -> Result<u64, BackendError> {
        let changed = self.store.mark_all_read(principal.user_id).await?;
        tracing::debug!(
            "[Notifications] Marked {} notification(s) read for {}",
            changed,
            principal.user_id
        );
        Ok(changed)
    }

    /// Persist a notification and push it to the recipient's live connections
    pub async fn notify(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
        kind: NotificationKind,
        content: impl Into<String>,
        ref_id: Option<Uuid>,
    ) -> Result<Notification, BackendError> {
        let notification = self
            .store
            .create(NewNotification {
                sender_id,
                recipient_id,
                kind,
                content: content.into(),
                ref_id,
            })
            .await?;

        let queued = self
            .hub
            .notify_user(recipient_id, ServerEvent::Notification(notification.clone()));
        tracing::debug!(
            "[Notifications] {} for {} pushed to {} connection(s)",
            kind.as_str(),
            recipient_id,
            queued
        );
        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::{MemoryStore, Stores};
    use assert_matches::assert_matches;

    fn service() -> NotificationService {
        let stores = Stores::memory(Arc::new(MemoryStore::new()));
        let hub = RealtimeHub::new(stores.messages.clone(), stores.groups.clone(), 16);
        NotificationService::new(stores.notifications, hub)
    }

    fn principal() -> Principal {
        Principal { user_id: Uuid::new_v4(), is_admin: false }
    }

    #[tokio::test]
    async fn test_notify_pushes_to_inbox() {
        let service = service();
        let (alice, bob) = (principal(), principal());
        let (_, mut rx) = service.hub.connect(&bob);
        while rx.try_recv().is_ok() {}

        let created = service
            .notify(bob.user_id, alice.user_id, NotificationKind::Follow, "alice followed you", None)
            .await
            .unwrap();

        assert_eq!(rx.try_recv().unwrap(), ServerEvent::Notification(created));
        assert_eq!(service.unread_count(&bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_rules() {
        let service = service();
        let (alice, bob) = (principal(), principal());
        let n = service
            .notify(bob.user_id, alice.user_id, NotificationKind::Like, "liked", None)
            .await
            .unwrap();

        assert_matches!(service.mark_read(&alice, n.id).await, Err(BackendError::Forbidden { .. }));
        assert_matches!(
            service.mark_read(&bob, Uuid::new_v4()).await,
            Err(BackendError::NotFound { .. })
        );

        assert!(service.mark_read(&bob, n.id).await.unwrap().is_read);
        assert_eq!(service.unread_count(&bob).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let service = service();
        let (alice, bob) = (principal(), principal());
        for i in 0..3 {
            service
                .notify(bob.user_id, alice.user_id, NotificationKind::Comment, format!("c{i}"), None)
                .await
                .unwrap();
        }

        assert_eq!(service.mark_all_read(&bob).await.unwrap(), 3);
        assert_eq!(service.mark_all_read(&bob).await.unwrap(), 0);
        assert_eq!(service.list(&bob).await.unwrap().len(), 3);
    }
}
