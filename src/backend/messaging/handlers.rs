//! Messaging HTTP Handlers
//!
//! Thin wrappers over `MessageService`; authorization happens in the service.

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::messaging::service::MessageService;
use crate::backend::middleware::{ApiJson, ApiPath, AuthUser};
use crate::shared::messaging::{Conversation, Message, SendMessageRequest};
use crate::shared::ApiResponse;

type ApiResult<T> = Result<Json<ApiResponse<T>>, BackendError>;

/// POST /api/v1/messages/user/{user_id}
pub async fn send_private_message(
    AuthUser(principal): AuthUser,
    State(messages): State<MessageService>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Message>>), BackendError> {
    let media = request.media();
    let message = messages
        .send_direct(&principal, user_id, request.content, media)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}

/// POST /api/v1/messages/group/{group_id}
pub async fn send_group_message(
    AuthUser(principal): AuthUser,
    State(messages): State<MessageService>,
    ApiPath(group_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Message>>), BackendError> {
    let media = request.media();
    let message = messages
        .send_group(&principal, group_id, request.content, media)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(message))))
}

/// GET /api/v1/messages/user/{user_id}
pub async fn get_private_messages(
    AuthUser(principal): AuthUser,
    State(messages): State<MessageService>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Vec<Message>> {
    let list = messages.private_messages(&principal, user_id).await?;
    Ok(Json(ApiResponse::list(list)))
}

/// GET /api/v1/messages/group/{group_id}
pub async fn get_group_messages(
    AuthUser(principal): AuthUser,
    State(messages): State<MessageService>,
    ApiPath(group_id): ApiPath<Uuid>,
) -> ApiResult<Vec<Message>> {
    let list = messages.group_messages(&principal, group_id).await?;
    Ok(Json(ApiResponse::list(list)))
}

/// GET /api/v1/messages/conversations
pub async fn get_conversations(
    AuthUser(principal): AuthUser,
    State(messages): State<MessageService>,
) -> ApiResult<Vec<Conversation>> {
    let conversations = messages.conversations(&principal).await?;
    Ok(Json(ApiResponse::list(conversations)))
}

/// GET /api/v1/messages/{message_id}
pub async fn get_message(
    AuthUser(principal): AuthUser,
    State(messages): State<MessageService>,
    ApiPath(message_id): ApiPath<Uuid>,
) -> ApiResult<Message> {
    let message = messages.message(&principal, message_id).await?;
    Ok(Json(ApiResponse::ok(message)))
}

/// DELETE /api/v1/messages/{message_id}
pub async fn delete_message(
    AuthUser(principal): AuthUser,
    State(messages): State<MessageService>,
    ApiPath(message_id): ApiPath<Uuid>,
) -> ApiResult<serde_json::Value> {
    messages.delete(&principal, message_id).await?;
    Ok(Json(ApiResponse::ok(serde_json::json!({ "id": message_id }))))
}

/// PUT /api/v1/messages/{message_id}/read
pub async fn mark_message_read(
    AuthUser(principal): AuthUser,
    State(messages): State<MessageService>,
    ApiPath(message_id): ApiPath<Uuid>,
) -> ApiResult<Message> {
    let message = messages.mark_read(&principal, message_id).await?;
    Ok(Json(ApiResponse::ok(message)))
}

/// PUT /api/v1/messages/{message_id}/group-read
pub async fn mark_group_message_read(
    AuthUser(principal): AuthUser,
    State(messages): State<MessageService>,
    ApiPath(message_id): ApiPath<Uuid>,
) -> ApiResult<Message> {
    let message = messages.mark_group_read(&principal, message_id).await?;
    Ok(Json(ApiResponse::ok(message)))
}
