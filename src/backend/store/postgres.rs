//! PostgreSQL store
//!
//! Runtime-checked sqlx queries against the schema in `migrations/`. Message
//! timestamps come from `clock_timestamp()` so rows inserted within one
//! transaction still get distinct, increasing values; ties are broken by id.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::store::{
    GroupDirectory, GroupRecord, MessageStore, NotificationStore, UserDirectory, UserRecord,
};
use crate::shared::messaging::{
    Media, MediaKind, Message, MessageTarget, NewMessage, NewNotification, Notification,
    NotificationKind, ProfileSummary, ReadReceipt,
};

const MESSAGE_COLUMNS: &str =
    "id, sender_id, recipient_id, group_id, content, media_url, media_kind, is_read, created_at";

const NOTIFICATION_COLUMNS: &str =
    "id, sender_id, recipient_id, kind, content, ref_id, is_read, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load read receipts for the given messages and attach them
    async fn with_receipts(&self, mut messages: Vec<Message>) -> Result<Vec<Message>, BackendError> {
        let group_ids: Vec<Uuid> = messages
            .iter()
            .filter(|m| m.group_id().is_some())
            .map(|m| m.id)
            .collect();
        if group_ids.is_empty() {
            return Ok(messages);
        }

        let rows = sqlx::query(
            r#"
            SELECT message_id, user_id, read_at
            FROM message_reads
            WHERE message_id = ANY($1)
            ORDER BY read_at ASC
            "#,
        )
        .bind(&group_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut receipts: HashMap<Uuid, Vec<ReadReceipt>> = HashMap::new();
        for row in rows {
            receipts
                .entry(row.try_get("message_id")?)
                .or_default()
                .push(ReadReceipt {
                    user_id: row.try_get("user_id")?,
                    read_at: row.try_get("read_at")?,
                });
        }

        for message in &mut messages {
            if let Some(found) = receipts.remove(&message.id) {
                message.read_by = found;
            }
        }
        Ok(messages)
    }

    async fn with_receipts_one(&self, message: Option<Message>) -> Result<Option<Message>, BackendError> {
        match message {
            Some(message) => Ok(self.with_receipts(vec![message]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn fetch_messages(
        &self,
        sql: &str,
        binds: &[Uuid],
    ) -> Result<Vec<Message>, BackendError> {
        let mut query = sqlx::query(sql);
        for id in binds {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        let messages = rows.iter().map(message_from_row).collect::<Result<Vec<_>, _>>()?;
        self.with_receipts(messages).await
    }
}

fn message_from_row(row: &PgRow) -> Result<Message, BackendError> {
    let id: Uuid = row.try_get("id")?;
    let recipient_id: Option<Uuid> = row.try_get("recipient_id")?;
    let group_id: Option<Uuid> = row.try_get("group_id")?;
    let target = match (recipient_id, group_id) {
        (Some(user), None) => MessageTarget::User(user),
        (None, Some(group)) => MessageTarget::Group(group),
        _ => {
            return Err(BackendError::storage(format!(
                "message {} must have exactly one recipient or group",
                id
            )))
        }
    };

    let media_url: Option<String> = row.try_get("media_url")?;
    let media_kind: String = row.try_get("media_kind")?;

    Ok(Message {
        id,
        sender_id: row.try_get("sender_id")?,
        target,
        content: row.try_get("content")?,
        media: media_url.map(|url| Media {
            url,
            kind: MediaKind::parse(&media_kind),
        }),
        read: row.try_get("is_read")?,
        read_by: Vec::new(),
        created_at: row.try_get("created_at")?,
    })
}

fn notification_from_row(row: &PgRow) -> Result<Notification, BackendError> {
    let kind: String = row.try_get("kind")?;
    Ok(Notification {
        id: row.try_get("id")?,
        sender_id: row.try_get("sender_id")?,
        recipient_id: row.try_get("recipient_id")?,
        kind: NotificationKind::parse(&kind),
        content: row.try_get("content")?,
        ref_id: row.try_get("ref_id")?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}

fn user_from_row(row: &PgRow) -> Result<UserRecord, BackendError> {
    Ok(UserRecord {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        profile_pic: row.try_get("profile_pic")?,
        is_admin: row.try_get("is_admin")?,
    })
}

#[async_trait]
impl MessageStore for PgStore {
    async fn create(&self, message: NewMessage) -> Result<Message, BackendError> {
        message.validate()?;

        let (recipient_id, group_id) = match message.target {
            MessageTarget::User(id) => (Some(id), None),
            MessageTarget::Group(id) => (None, Some(id)),
        };
        let media_kind = message
            .media
            .as_ref()
            .map(|media| media.kind)
            .unwrap_or_default();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO messages (id, sender_id, recipient_id, group_id, content, media_url, media_kind)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {MESSAGE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(message.sender_id)
        .bind(recipient_id)
        .bind(group_id)
        .bind(&message.content)
        .bind(message.media.as_ref().map(|media| media.url.as_str()))
        .bind(media_kind.as_str())
        .fetch_one(&self.pool)
        .await?;

        let stored = message_from_row(&row)?;
        tracing::debug!("[Store] Inserted message {}", stored.id);
        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Message>, BackendError> {
        let row = sqlx::query(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let message = row.as_ref().map(message_from_row).transpose()?;
        self.with_receipts_one(message).await
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, BackendError> {
        self.fetch_messages(
            &format!(
                r#"
                SELECT {MESSAGE_COLUMNS}
                FROM messages
                WHERE (sender_id = $1 AND recipient_id = $2)
                   OR (sender_id = $2 AND recipient_id = $1)
                ORDER BY created_at ASC, id ASC
                "#
            ),
            &[a, b],
        )
        .await
    }

    async fn find_in_group(&self, group_id: Uuid) -> Result<Vec<Message>, BackendError> {
        self.fetch_messages(
            &format!(
                r#"
                SELECT {MESSAGE_COLUMNS}
                FROM messages
                WHERE group_id = $1
                ORDER BY created_at ASC, id ASC
                "#
            ),
            &[group_id],
        )
        .await
    }

    async fn find_direct_involving(&self, user_id: Uuid) -> Result<Vec<Message>, BackendError> {
        self.fetch_messages(
            &format!(
                r#"
                SELECT {MESSAGE_COLUMNS}
                FROM messages
                WHERE recipient_id IS NOT NULL
                  AND (sender_id = $1 OR recipient_id = $1)
                ORDER BY created_at DESC, id DESC
                "#
            ),
            &[user_id],
        )
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, BackendError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_read(&self, id: Uuid) -> Result<Option<Message>, BackendError> {
        let row = sqlx::query(&format!(
            "UPDATE messages SET is_read = TRUE WHERE id = $1 RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let message = row.as_ref().map(message_from_row).transpose()?;
        self.with_receipts_one(message).await
    }

    async fn mark_read_by(
        &self,
        id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<Message>, BackendError> {
        if MessageStore::find_by_id(self, id).await?.is_none() {
            return Ok(None);
        }

        sqlx::query(
            r#"
            INSERT INTO message_reads (message_id, user_id, read_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (message_id, user_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        MessageStore::find_by_id(self, id).await
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<UserRecord>, BackendError> {
        let row = sqlx::query("SELECT id, username, profile_pic, is_admin FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<ProfileSummary>, BackendError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query("SELECT id, username, profile_pic FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<ProfileSummary, BackendError> {
                Ok(ProfileSummary {
                    id: row.try_get("id")?,
                    username: row.try_get("username")?,
                    profile_pic: row.try_get("profile_pic")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl GroupDirectory for PgStore {
    async fn find_group(&self, id: Uuid) -> Result<Option<GroupRecord>, BackendError> {
        let row = sqlx::query("SELECT id, name FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let members: Vec<Uuid> = sqlx::query_scalar(
            "SELECT user_id FROM group_members WHERE group_id = $1 ORDER BY joined_at ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(GroupRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            members,
        }))
    }
}

#[async_trait]
impl NotificationStore for PgStore {
    async fn create(&self, notification: NewNotification) -> Result<Notification, BackendError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO notifications (id, sender_id, recipient_id, kind, content, ref_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {NOTIFICATION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(notification.sender_id)
        .bind(notification.recipient_id)
        .bind(notification.kind.as_str())
        .bind(&notification.content)
        .bind(notification.ref_id)
        .fetch_one(&self.pool)
        .await?;

        notification_from_row(&row)
    }

    async fn list_for(&self, recipient_id: Uuid) -> Result<Vec<Notification>, BackendError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {NOTIFICATION_COLUMNS}
            FROM notifications
            WHERE recipient_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(notification_from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Notification>, BackendError> {
        let row = sqlx::query(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(notification_from_row).transpose()
    }

    async fn mark_read(&self, id: Uuid) -> Result<Option<Notification>, BackendError> {
        let row = sqlx::query(&format!(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(notification_from_row).transpose()
    }

    async fn mark_all_read(&self, recipient_id: Uuid) -> Result<u64, BackendError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn unread_count(&self, recipient_id: Uuid) -> Result<u64, BackendError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.max(0) as u64)
    }
}
