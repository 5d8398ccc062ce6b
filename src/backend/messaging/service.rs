/**
 * Message Service
 *
 * The REST side of messaging: persist, list, delete and mark read. Every call
 * loads its targets fresh and runs them through `gate` before touching the
 * store.
 *
 * Persisting a message does not notify anyone. Clients announce the new id on
 * the realtime channel (`sendMessage`), and the hub re-reads it from the
 * store before fanning it out.
 */

use chrono::Utc;
use uuid::Uuid;

use crate::backend::auth::Principal;
use crate::backend::error::BackendError;
use crate::backend::messaging::{gate, projector};
use crate::backend::store::Stores;
use crate::shared::messaging::{Conversation, Media, Message, MessageTarget, NewMessage};

#[derive(Clone)]
pub struct MessageService {
    stores: Stores,
}

impl MessageService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    async fn load(&self, message_id: Uuid) -> Result<Message, BackendError> {
        self.stores
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| BackendError::not_found("message"))
    }

    pub async fn send_direct(
        &self,
        principal: &Principal,
        recipient_id: Uuid,
        content: String,
        media: Option<Media>,
    ) -> Result<Message, BackendError> {
        let recipient = self.stores.users.find_user(recipient_id).await?;
        gate::authorize_direct_send(principal, recipient.as_ref())?;

        let message = self
            .stores
            .messages
            .create(NewMessage::direct(principal.user_id, recipient_id, content).with_media(media))
            .await?;
        tracing::info!(
            "[Messaging] {} sent message {} to {}",
            principal.user_id,
            message.id,
            recipient_id
        );
        Ok(message)
    }

    pub async fn send_group(
        &self,
        principal: &Principal,
        group_id: Uuid,
        content: String,
        media: Option<Media>,
    ) -> Result<Message, BackendError> {
        let group = self.stores.groups.find_group(group_id).await?;
        gate::authorize_group_member(principal, group.as_ref(), group_id)?;

        let message = self
            .stores
            .messages
            .create(NewMessage::group(principal.user_id, group_id, content).with_media(media))
            .await?;
        tracing::info!(
            "[Messaging] {} posted message {} to group {}",
            principal.user_id,
            message.id,
            group_id
        );
        Ok(message)
    }

    /// Direct messages between the principal and `other`, oldest first
    pub async fn private_messages(
        &self,
        principal: &Principal,
        other: Uuid,
    ) -> Result<Vec<Message>, BackendError> {
        if self.stores.users.find_user(other).await?.is_none() {
            return Err(BackendError::not_found("user"));
        }
        self.stores.messages.find_between(principal.user_id, other).await
    }

    /// Messages of a group the principal currently belongs to, oldest first
    pub async fn group_messages(
        &self,
        principal: &Principal,
        group_id: Uuid,
    ) -> Result<Vec<Message>, BackendError> {
        let group = self.stores.groups.find_group(group_id).await?;
        gate::authorize_group_member(principal, group.as_ref(), group_id)?;
        self.stores.messages.find_in_group(group_id).await
    }

    /// A single message, visible to its participants (and admins)
    pub async fn message(&self, principal: &Principal, message_id: Uuid) -> Result<Message, BackendError> {
        let message = self.load(message_id).await?;
        match message.target {
            MessageTarget::User(_) => gate::authorize_view_direct(principal, &message)?,
            MessageTarget::Group(group_id) => {
                let group = self.stores.groups.find_group(group_id).await?;
                gate::authorize_group_member(principal, group.as_ref(), group_id)?;
            }
        }
        Ok(message)
    }

    pub async fn delete(&self, principal: &Principal, message_id: Uuid) -> Result<(), BackendError> {
        let message = self.load(message_id).await?;
        gate::authorize_delete(principal, &message)?;

        if !self.stores.messages.delete(message_id).await? {
            return Err(BackendError::not_found("message"));
        }
        tracing::info!("[Messaging] {} deleted message {}", principal.user_id, message_id);
        Ok(())
    }

    /// Set the read flag of a direct message addressed to the principal
    pub async fn mark_read(&self, principal: &Principal, message_id: Uuid) -> Result<Message, BackendError> {
        let message = self.load(message_id).await?;
        gate::authorize_mark_read(principal, &message)?;
        if message.read {
            return Ok(message);
        }

        self.stores
            .messages
            .mark_read(message_id)
            .await?
            .ok_or_else(|| BackendError::not_found("message"))
    }

    /// Record the principal's read receipt on a group message
    pub async fn mark_group_read(
        &self,
        principal: &Principal,
        message_id: Uuid,
    ) -> Result<Message, BackendError> {
        let message = self.load(message_id).await?;
        let Some(group_id) = message.group_id() else {
            return Err(BackendError::invalid("messageId", "not a group message"));
        };
        let group = self.stores.groups.find_group(group_id).await?;
        gate::authorize_group_member(principal, group.as_ref(), group_id)?;

        if message.is_read_by(principal.user_id) {
            return Ok(message);
        }
        self.stores
            .messages
            .mark_read_by(message_id, principal.user_id, Utc::now())
            .await?
            .ok_or_else(|| BackendError::not_found("message"))
    }

    pub async fn conversations(&self, principal: &Principal) -> Result<Vec<Conversation>, BackendError> {
        projector::conversations_for(
            principal.user_id,
            self.stores.messages.as_ref(),
            self.stores.users.as_ref(),
        )
        .await
    }
}
