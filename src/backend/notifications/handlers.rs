//! Notification HTTP Handlers

use axum::{
    extract::State,
    Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::middleware::{ApiPath, AuthUser};
use crate::backend::notifications::NotificationService;
use crate::shared::messaging::{Notification, UnreadCountResponse};
use crate::shared::ApiResponse;

/// GET /api/v1/notifications
pub async fn get_notifications(
    AuthUser(principal): AuthUser,
    State(notifications): State<NotificationService>,
) -> Result<Json<ApiResponse<Vec<Notification>>>, BackendError> {
    let list = notifications.list(&principal).await?;
    Ok(Json(ApiResponse::list(list)))
}

/// GET /api/v1/notifications/unread-count
pub async fn get_unread_count(
    AuthUser(principal): AuthUser,
    State(notifications): State<NotificationService>,
) -> Result<Json<ApiResponse<UnreadCountResponse>>, BackendError> {
    let unread_count = notifications.unread_count(&principal).await?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { unread_count })))
}

/// PUT /api/v1/notifications/{notification_id}/read
pub async fn mark_notification_read(
    AuthUser(principal): AuthUser,
    State(notifications): State<NotificationService>,
    ApiPath(notification_id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Notification>>, BackendError> {
    let notification = notifications.mark_read(&principal, notification_id).await?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PUT /api/v1/notifications/read-all
pub async fn mark_all_notifications_read(
    AuthUser(principal): AuthUser,
    State(notifications): State<NotificationService>,
) -> Result<Json<ApiResponse<serde_json::Value>>, BackendError> {
    let updated = notifications.mark_all_read(&principal).await?;
    Ok(Json(ApiResponse::ok(serde_json::json!({ "updated": updated }))))
}
