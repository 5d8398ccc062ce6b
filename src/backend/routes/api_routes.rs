/**
 * API Routes
 *
 * Every endpoint below requires `Authorization: Bearer <token>`.
 *
 * ## Messages
 * - `POST /api/v1/messages/user/{user_id}` - send a direct message
 * - `GET /api/v1/messages/user/{user_id}` - direct messages with a user
 * - `POST /api/v1/messages/group/{group_id}` - post to a group
 * - `GET /api/v1/messages/group/{group_id}` - group history
 * - `GET /api/v1/messages/conversations` - conversation list
 * - `GET /api/v1/messages/{message_id}` - one message
 * - `DELETE /api/v1/messages/{message_id}` - delete (sender or admin)
 * - `PUT /api/v1/messages/{message_id}/read` - mark a direct message read
 * - `PUT /api/v1/messages/{message_id}/group-read` - group read receipt
 *
 * ## Notifications
 * - `GET /api/v1/notifications`
 * - `GET /api/v1/notifications/unread-count`
 * - `PUT /api/v1/notifications/{notification_id}/read`
 * - `PUT /api/v1/notifications/read-all`
 *
 * ## Presence
 * - `GET /api/v1/presence/{user_id}`
 */

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::backend::messaging::handlers::{
    delete_message, get_conversations, get_group_messages, get_message, get_private_messages,
    mark_group_message_read, mark_message_read, send_group_message, send_private_message,
};
use crate::backend::notifications::handlers::{
    get_notifications, get_unread_count, mark_all_notifications_read, mark_notification_read,
};
use crate::backend::realtime::handlers::get_presence;
use crate::backend::server::state::AppState;

pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Messages
        .route(
            "/api/v1/messages/user/{user_id}",
            post(send_private_message).get(get_private_messages),
        )
        .route(
            "/api/v1/messages/group/{group_id}",
            post(send_group_message).get(get_group_messages),
        )
        .route("/api/v1/messages/conversations", get(get_conversations))
        .route(
            "/api/v1/messages/{message_id}",
            get(get_message).delete(delete_message),
        )
        .route("/api/v1/messages/{message_id}/read", put(mark_message_read))
        .route(
            "/api/v1/messages/{message_id}/group-read",
            put(mark_group_message_read),
        )
        // Notifications
        .route("/api/v1/notifications", get(get_notifications))
        .route("/api/v1/notifications/unread-count", get(get_unread_count))
        .route(
            "/api/v1/notifications/read-all",
            put(mark_all_notifications_read),
        )
        .route(
            "/api/v1/notifications/{notification_id}/read",
            put(mark_notification_read),
        )
        // Presence
        .route("/api/v1/presence/{user_id}", get(get_presence))
}
