//! Authorization Gate
//!
//! Pure predicates over a principal and already-loaded targets. Callers load
//! the user, group or message fresh for every request; nothing is cached, so
//! a membership change takes effect on the next call.
//!
//! Missing targets fail with `NotFound`, rule violations with `Forbidden`.

use uuid::Uuid;

use crate::backend::auth::Principal;
use crate::backend::error::BackendError;
use crate::backend::store::{GroupRecord, UserRecord};
use crate::shared::messaging::{Message, MessageTarget};

/// Direct send: the recipient exists and is not the sender
pub fn authorize_direct_send(
    principal: &Principal,
    recipient: Option<&UserRecord>,
) -> Result<(), BackendError> {
    let recipient = recipient.ok_or_else(|| BackendError::not_found("user"))?;
    if recipient.id == principal.user_id {
        return Err(BackendError::forbidden("You cannot message yourself"));
    }
    Ok(())
}

/// Group send or read: the group exists and the principal is a current member
pub fn authorize_group_member<'g>(
    principal: &Principal,
    group: Option<&'g GroupRecord>,
    group_id: Uuid,
) -> Result<&'g GroupRecord, BackendError> {
    let group = group
        .filter(|group| group.id == group_id)
        .ok_or_else(|| BackendError::not_found("group"))?;
    if !group.is_member(principal.user_id) {
        return Err(BackendError::forbidden("You are not a member of this group"));
    }
    Ok(group)
}

/// Delete: the sender, or an admin
pub fn authorize_delete(principal: &Principal, message: &Message) -> Result<(), BackendError> {
    if message.sender_id == principal.user_id || principal.is_admin {
        Ok(())
    } else {
        Err(BackendError::forbidden("Only the sender can delete this message"))
    }
}

/// Read flag on a direct message: the recipient only
pub fn authorize_mark_read(principal: &Principal, message: &Message) -> Result<(), BackendError> {
    match message.target {
        MessageTarget::User(recipient) if recipient == principal.user_id => Ok(()),
        MessageTarget::User(_) => Err(BackendError::forbidden(
            "Only the recipient can mark this message as read",
        )),
        MessageTarget::Group(_) => Err(BackendError::invalid(
            "messageId",
            "group messages take per-user read receipts",
        )),
    }
}

/// Realtime delivery: only the sender may announce their own message
pub fn authorize_sender(principal: &Principal, message: &Message) -> Result<(), BackendError> {
    if message.sender_id == principal.user_id {
        Ok(())
    } else {
        Err(BackendError::forbidden("You can only deliver your own messages"))
    }
}

/// Reading a single direct message: sender, recipient or admin
pub fn authorize_view_direct(principal: &Principal, message: &Message) -> Result<(), BackendError> {
    let involved = message.counterpart_of(principal.user_id).is_some();
    if involved || principal.is_admin {
        Ok(())
    } else {
        Err(BackendError::forbidden("You are not part of this conversation"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;

    fn user(id: Uuid) -> UserRecord {
        UserRecord { id, username: "u".into(), profile_pic: None, is_admin: false }
    }

    fn principal(user_id: Uuid, is_admin: bool) -> Principal {
        Principal { user_id, is_admin }
    }

    fn message(sender: Uuid, target: MessageTarget) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id: sender,
            target,
            content: "x".into(),
            media: None,
            read: false,
            read_by: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_direct_send() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let me = principal(a, false);

        assert!(authorize_direct_send(&me, Some(&user(b))).is_ok());
        assert_matches!(
            authorize_direct_send(&me, Some(&user(a))),
            Err(BackendError::Forbidden { .. })
        );
        assert_matches!(authorize_direct_send(&me, None), Err(BackendError::NotFound { .. }));
    }

    #[test]
    fn test_group_member() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let group = GroupRecord { id: Uuid::new_v4(), name: "g".into(), members: vec![a] };

        assert!(authorize_group_member(&principal(a, false), Some(&group), group.id).is_ok());
        assert_matches!(
            authorize_group_member(&principal(b, true), Some(&group), group.id),
            Err(BackendError::Forbidden { .. })
        );
        assert_matches!(
            authorize_group_member(&principal(a, false), None, group.id),
            Err(BackendError::NotFound { .. })
        );
        assert_matches!(
            authorize_group_member(&principal(a, false), Some(&group), Uuid::new_v4()),
            Err(BackendError::NotFound { .. })
        );
    }

    #[test]
    fn test_delete() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let m = message(a, MessageTarget::User(b));

        assert!(authorize_delete(&principal(a, false), &m).is_ok());
        assert!(authorize_delete(&principal(Uuid::new_v4(), true), &m).is_ok());
        assert_matches!(
            authorize_delete(&principal(b, false), &m),
            Err(BackendError::Forbidden { .. })
        );
    }

    #[test]
    fn test_mark_read() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let m = message(a, MessageTarget::User(b));

        assert!(authorize_mark_read(&principal(b, false), &m).is_ok());
        assert_matches!(
            authorize_mark_read(&principal(a, false), &m),
            Err(BackendError::Forbidden { .. })
        );

        let g = message(a, MessageTarget::Group(Uuid::new_v4()));
        assert_matches!(
            authorize_mark_read(&principal(b, false), &g),
            Err(BackendError::InvalidArgument { .. })
        );
    }

    #[test]
    fn test_view_direct() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let m = message(a, MessageTarget::User(b));

        assert!(authorize_view_direct(&principal(b, false), &m).is_ok());
        assert!(authorize_view_direct(&principal(c, true), &m).is_ok());
        assert_matches!(
            authorize_view_direct(&principal(c, false), &m),
            Err(BackendError::Forbidden { .. })
        );
    }
}
