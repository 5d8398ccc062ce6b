//! Persistence Collaborators
//!
//! The core never talks to a database directly. It goes through the traits
//! below, which are implemented by:
//!
//! - **`memory`** - `MemoryStore`, process-local maps (development, tests)
//! - **`postgres`** - `PgStore`, sqlx over PostgreSQL
//!
//! All traits are object safe so `AppState` can hold `Arc<dyn ...>` handles
//! and swap implementations at startup.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::shared::messaging::{Message, NewMessage, NewNotification, Notification, ProfileSummary};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A user account as seen by the messaging core
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub profile_pic: Option<String>,
    pub is_admin: bool,
}

impl UserRecord {
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            id: self.id,
            username: self.username.clone(),
            profile_pic: self.profile_pic.clone(),
        }
    }
}

/// A group and its current members
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<Uuid>,
}

impl GroupRecord {
    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }
}

/// Persisted record of every direct and group message
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message, assigning its id and creation timestamp
    async fn create(&self, message: NewMessage) -> Result<Message, BackendError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, BackendError>;

    /// Direct messages between two users, oldest first
    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, BackendError>;

    /// Messages posted to a group, oldest first
    async fn find_in_group(&self, group_id: Uuid) -> Result<Vec<Message>, BackendError>;

    /// Direct messages sent or received by a user, newest first
    async fn find_direct_involving(&self, user_id: Uuid) -> Result<Vec<Message>, BackendError>;

    /// Returns whether a message was removed
    async fn delete(&self, id: Uuid) -> Result<bool, BackendError>;

    /// Set the read flag of a direct message
    async fn mark_read(&self, id: Uuid) -> Result<Option<Message>, BackendError>;

    /// Record a per-user read receipt on a group message; repeated calls keep
    /// the first timestamp
    async fn mark_read_by(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, BackendError>;
}

/// User existence and public profiles
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, BackendError>;

    /// Profiles for the given ids; unknown ids are skipped
    async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<ProfileSummary>, BackendError>;
}

/// Group membership lookup
#[async_trait]
pub trait GroupDirectory: Send + Sync {
    async fn find_group(&self, id: Uuid) -> Result<Option<GroupRecord>, BackendError>;
}

/// Notifications with read/unread state
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: NewNotification) -> Result<Notification, BackendError>;

    /// Notifications addressed to a user, newest first
    async fn list_for(&self, recipient_id: Uuid) -> Result<Vec<Notification>, BackendError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, BackendError>;

    async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>, BackendError>;

    /// Returns the number of notifications that changed state
    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64, BackendError>;

    async fn unread_count(&self, recipient_id: Uuid) -> Result<u64, BackendError>;
}

/// Handles to every collaborator, cloned into each service
#[derive(Clone)]
pub struct Stores {
    pub messages: Arc<dyn MessageStore>,
    pub users: Arc<dyn UserDirectory>,
    pub groups: Arc<dyn GroupDirectory>,
    pub notifications: Arc<dyn NotificationStore>,
}

impl Stores {
    /// Back every collaborator with the same in-memory store
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            messages: store.clone(),
            users: store.clone(),
            groups: store.clone(),
            notifications: store,
        }
    }

    /// Back every collaborator with PostgreSQL
    pub fn postgres(store: PgStore) -> Self {
        let store = Arc::new(store);
        Self {
            messages: store.clone(),
            users: store.clone(),
            groups: store.clone(),
            notifications: store,
        }
    }
}
