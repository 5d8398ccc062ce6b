/**
 * Conversation Projector
 *
 * Recomputes the viewer's conversation list from stored direct messages on
 * every call. There is no cache: a message inserted while a projection runs
 * may or may not be included, and the next call will see it.
 *
 * # Ordering
 *
 * Most recent message first. Two conversations whose last messages share a
 * timestamp are ordered by counterpart id so the output is deterministic.
 */

use std::collections::HashMap;

use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::store::{MessageStore, UserDirectory};
use crate::shared::messaging::{Conversation, Message};

/// Group direct messages by counterpart. Profiles are left empty.
pub fn project(viewer: Uuid, messages: impl IntoIterator<Item = Message>) -> Vec<Conversation> {
    let mut by_counterpart: HashMap<Uuid, Conversation> = HashMap::new();

    for message in messages {
        let Some(counterpart) = message.counterpart_of(viewer) else {
            continue;
        };
        let unread = message.recipient_id() == Some(viewer) && !message.read;

        match by_counterpart.get_mut(&counterpart) {
            Some(conversation) => {
                if unread {
                    conversation.unread_count += 1;
                }
                if message.order_key() > conversation.last_message.order_key() {
                    conversation.last_message = message;
                }
            }
            None => {
                by_counterpart.insert(
                    counterpart,
                    Conversation {
                        counterpart_id: counterpart,
                        user: None,
                        last_message: message,
                        unread_count: u32::from(unread),
                    },
                );
            }
        }
    }

    let mut conversations: Vec<Conversation> = by_counterpart.into_values().collect();
    conversations.sort_by(|a, b| {
        b.last_message
            .created_at
            .cmp(&a.last_message.created_at)
            .then_with(|| a.counterpart_id.cmp(&b.counterpart_id))
    });
    conversations
}

/// Conversation list for `viewer` with counterpart profiles attached
pub async fn conversations_for(
    viewer: Uuid,
    messages: &dyn MessageStore,
    users: &dyn UserDirectory,
) -> Result<Vec<Conversation>, BackendError> {
    let mut conversations = project(viewer, messages.find_direct_involving(viewer).await?);

    let ids: Vec<Uuid> = conversations.iter().map(|c| c.counterpart_id).collect();
    let mut profiles: HashMap<Uuid, _> = users
        .profiles(&ids)
        .await?
        .into_iter()
        .map(|profile| (profile.id, profile))
        .collect();

    for conversation in &mut conversations {
        conversation.user = profiles.remove(&conversation.counterpart_id);
    }

    tracing::debug!(
        "[Messaging] Projected {} conversations for {}",
        conversations.len(),
        viewer
    );
    Ok(conversations)
}
