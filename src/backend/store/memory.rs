/**
 * In-Memory Store
 *
 * Implements every persistence trait on top of process-local maps guarded by
 * a single `tokio::sync::RwLock`. Used when `DATABASE_URL` is not configured
 * and throughout the test suite.
 *
 * # Timestamps
 *
 * `created_at` is strictly increasing across all messages created by one
 * store, even when the wall clock does not advance between two inserts.
 */
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::store::{
    GroupDirectory, GroupRecord, MessageStore, NotificationStore, UserDirectory, UserRecord,
};
use crate::shared::messaging::{
    Message, MessageTarget, NewMessage, NewNotification, Notification, ProfileSummary, ReadReceipt,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    groups: HashMap<Uuid, GroupRecord>,
    messages: HashMap<Uuid, Message>,
    notifications: HashMap<Uuid, Notification>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let at = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(at);
        at
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: UserRecord) {
        self.tables.write().await.users.insert(user.id, user);
    }

    /// Convenience for tests and seeding: create a plain user with a username
    pub async fn add_user(&self, username: &str) -> UserRecord {
        let user = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            profile_pic: None,
            is_admin: false,
        };
        self.insert_user(user.clone()).await;
        user
    }

    pub async fn insert_group(&self, group: GroupRecord) {
        self.tables.write().await.groups.insert(group.id, group);
    }

    /// Returns false when the group does not exist
    pub async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        match tables.groups.get_mut(&group_id) {
            Some(group) => {
                if !group.is_member(user_id) {
                    group.members.push(user_id);
                }
                true
            }
            None => false,
        }
    }

    /// Returns false when the group does not exist
    pub async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> bool {
        let mut tables = self.tables.write().await;
        match tables.groups.get_mut(&group_id) {
            Some(group) => {
                group.members.retain(|member| *member != user_id);
                true
            }
            None => false,
        }
    }
}

fn sorted_oldest_first(mut messages: Vec<Message>) -> Vec<Message> {
    messages.sort_by_key(Message::order_key);
    messages
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn create(&self, message: NewMessage) -> Result<Message, BackendError> {
        message.validate()?;

        let mut tables = self.tables.write().await;
        let created_at = tables.next_timestamp();
        let stored = Message {
            id: Uuid::new_v4(),
            sender_id: message.sender_id,
            target: message.target,
            content: message.content,
            media: message.media,
            read: false,
            read_by: Vec::new(),
            created_at,
        };
        tables.messages.insert(stored.id, stored.clone());
        tracing::debug!("[Store] Created message {}", stored.id);
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, BackendError> {
        Ok(self.tables.read().await.messages.get(&id).cloned())
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, BackendError> {
        let tables = self.tables.read().await;
        let messages = tables
            .messages
            .values()
            .filter(|m| match m.target {
                MessageTarget::User(recipient) => {
                    (m.sender_id == a && recipient == b) || (m.sender_id == b && recipient == a)
                }
                MessageTarget::Group(_) => false,
            })
            .cloned()
            .collect();
        Ok(sorted_oldest_first(messages))
    }

    async fn find_in_group(&self, group_id: Uuid) -> Result<Vec<Message>, BackendError> {
        let tables = self.tables.read().await;
        let messages = tables
            .messages
            .values()
            .filter(|m| m.group_id() == Some(group_id))
            .cloned()
            .collect();
        Ok(sorted_oldest_first(messages))
    }

    async fn find_direct_involving(&self, user_id: Uuid) -> Result<Vec<Message>, BackendError> {
        let tables = self.tables.read().await;
        let mut messages: Vec<Message> = tables
            .messages
            .values()
            .filter(|m| m.counterpart_of(user_id).is_some())
            .cloned()
            .collect();
        messages.sort_by_key(|m| std::cmp::Reverse(m.order_key()));
        Ok(messages)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BackendError> {
        Ok(self.tables.write().await.messages.remove(&id).is_some())
    }

    async fn mark_read(&self, id: Uuid) -> Result<Option<Message>, BackendError> {
        let mut tables = self.tables.write().await;
        Ok(tables.messages.get_mut(&id).map(|message| {
            message.read = true;
            message.clone()
        }))
    }

    async fn mark_read_by(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, BackendError> {
        let mut tables = self.tables.write().await;
        Ok(tables.messages.get_mut(&id).map(|message| {
            if !message.is_read_by(user_id) {
                message.read_by.push(ReadReceipt { user_id, read_at: at });
            }
            message.clone()
        }))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, BackendError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<ProfileSummary>, BackendError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).map(UserRecord::summary))
            .collect())
    }
}

#[async_trait]
impl GroupDirectory for MemoryStore {
    async fn find_group(&self, id: Uuid) -> Result<Option<GroupRecord>, BackendError> {
        Ok(self.tables.read().await.groups.get(&id).cloned())
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn create(&self, notification: NewNotification) -> Result<Notification, BackendError> {
        let mut tables = self.tables.write().await;
        let created_at = tables.next_timestamp();
        let stored = Notification {
            id: Uuid::new_v4(),
            sender_id: notification.sender_id,
            recipient_id: notification.recipient_id,
            kind: notification.kind,
            content: notification.content,
            ref_id: notification.ref_id,
            is_read: false,
            created_at,
        };
        tables.notifications.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_for(&self, recipient_id: Uuid) -> Result<Vec<Notification>, BackendError> {
        let tables = self.tables.read().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notifications)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, BackendError> {
        Ok(self.tables.read().await.notifications.get(&id).cloned())
    }

    async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>, BackendError> {
        let mut tables = self.tables.write().await;
        Ok(tables.notifications.get_mut(&id).map(|notification| {
            notification.is_read = true;
            notification.clone()
        }))
    }

    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64, BackendError> {
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for notification in tables.notifications.values_mut() {
            if notification.recipient_id == recipient_id && !notification.is_read {
                notification.is_read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn unread_count(&self, recipient_id: Uuid) -> Result<u64, BackendError> {
        let tables = self.tables.read().await;
        Ok(tables
            .notifications
            .values()
            .filter(|n| n.recipient_id == recipient_id && !n.is_read)
            .count() as u64)
    }
}
