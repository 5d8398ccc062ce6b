//! REST API integration tests
//!
//! Requests go through the full router (auth extractor, handlers, error
//! conversion) with `tower::ServiceExt::oneshot`.

#[macro_use]
mod common;

use axum::http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use common::{send, TestApp};
use hearth::shared::messaging::NotificationKind;

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = send(
        app.router(),
        Method::GET,
        "/api/v1/messages/conversations",
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error_body!(body, 401);
}

#[tokio::test]
async fn test_token_for_unknown_user_is_unauthorized() {
    let app = TestApp::new();
    let mut ghost = app.user("ghost").await;
    ghost.token = app.state.sessions.create_token(Uuid::new_v4()).unwrap();

    let (status, _) = send(
        app.router(),
        Method::GET,
        "/api/v1/notifications",
        Some(&ghost),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_send_and_fetch_direct_messages() {
    let app = TestApp::new();
    let (alice, bob) = (app.user("alice").await, app.user("bob").await);
    let uri = format!("/api/v1/messages/user/{}", bob.id);

    let (status, body) = send(
        app.router(),
        Method::POST,
        &uri,
        Some(&alice),
        Some(json!({ "content": "hi bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["senderId"], alice.id.to_string());
    assert_eq!(body["data"]["read"], false);

    send(
        app.router(),
        Method::POST,
        &format!("/api/v1/messages/user/{}", alice.id),
        Some(&bob),
        Some(json!({ "content": "hi alice" })),
    )
    .await;

    let (status, body) = send(app.router(), Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"][0]["content"], "hi bob");
    assert_eq!(body["data"][1]["content"], "hi alice");
}

#[tokio::test]
async fn test_send_validation_errors() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    let (status, body) = send(
        app.router(),
        Method::POST,
        &format!("/api/v1/messages/user/{}", bob.id),
        Some(&alice),
        Some(json!({ "content": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body!(body, 400);

    let (status, _) = send(
        app.router(),
        Method::POST,
        &format!("/api/v1/messages/user/{}", Uuid::new_v4()),
        Some(&alice),
        Some(json!({ "content": "anyone there?" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        app.router(),
        Method::POST,
        &format!("/api/v1/messages/user/{}", alice.id),
        Some(&alice),
        Some(json!({ "content": "note to self" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_malformed_id_and_body_get_json_errors() {
    let app = TestApp::new();
    let alice = app.user("alice").await;
    let bob = app.user("bob").await;

    let (status, body) = send(
        app.router(),
        Method::GET,
        "/api/v1/messages/not-a-uuid",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body!(body, 400);

    let (status, body) = send(
        app.router(),
        Method::PUT,
        "/api/v1/notifications/42/read",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body!(body, 400);

    let (status, body) = send(
        app.router(),
        Method::POST,
        &format!("/api/v1/messages/user/{}", bob.id),
        Some(&alice),
        Some(json!({ "text": "wrong field" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_body!(body, 400);
}

#[tokio::test]
async fn test_group_messages_require_membership() {
    let app = TestApp::new();
    let (alice, bob, outsider) = (
        app.user("alice").await,
        app.user("bob").await,
        app.user("outsider").await,
    );
    let group = app.group("crew", &[&alice, &bob]).await;
    let uri = format!("/api/v1/messages/group/{}", group);

    let (status, body) = send(
        app.router(),
        Method::POST,
        &uri,
        Some(&alice),
        Some(json!({ "content": "standup", "mediaUrl": "/uploads/notes.pdf", "mediaMime": "application/pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["media"]["kind"], "document");

    let (status, _) = send(
        app.router(),
        Method::POST,
        &uri,
        Some(&outsider),
        Some(json!({ "content": "let me in" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(app.router(), Method::GET, &uri, Some(&outsider), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(app.router(), Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_unread_count_decrements_by_one() {
    let app = TestApp::new();
    let (alice, bob) = (app.user("alice").await, app.user("bob").await);

    let mut ids = Vec::new();
    for text in ["one", "two", "three"] {
        let (_, body) = send(
            app.router(),
            Method::POST,
            &format!("/api/v1/messages/user/{}", bob.id),
            Some(&alice),
            Some(json!({ "content": text })),
        )
        .await;
        ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (_, body) = send(
        app.router(),
        Method::GET,
        "/api/v1/messages/conversations",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["counterpartId"], alice.id.to_string());
    assert_eq!(body["data"][0]["unreadCount"], 3);
    assert_eq!(body["data"][0]["lastMessage"]["content"], "three");
    assert_eq!(body["data"][0]["user"]["username"], "alice");

    let read_uri = format!("/api/v1/messages/{}/read", ids[0]);
    let (status, body) = send(app.router(), Method::PUT, &read_uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["read"], true);

    // Marking it again changes nothing
    send(app.router(), Method::PUT, &read_uri, Some(&bob), None).await;

    let (_, body) = send(
        app.router(),
        Method::GET,
        "/api/v1/messages/conversations",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["unreadCount"], 2);

    // The sender sees nothing unread in the same conversation
    let (_, body) = send(
        app.router(),
        Method::GET,
        "/api/v1/messages/conversations",
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["unreadCount"], 0);
}

#[tokio::test]
async fn test_only_recipient_marks_read() {
    let app = TestApp::new();
    let (alice, bob) = (app.user("alice").await, app.user("bob").await);

    let (_, body) = send(
        app.router(),
        Method::POST,
        &format!("/api/v1/messages/user/{}", bob.id),
        Some(&alice),
        Some(json!({ "content": "read me" })),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app.router(),
        Method::PUT,
        &format!("/api/v1/messages/{}/read", id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_group_read_receipts() {
    let app = TestApp::new();
    let (alice, bob) = (app.user("alice").await, app.user("bob").await);
    let group = app.group("pair", &[&alice, &bob]).await;

    let (_, body) = send(
        app.router(),
        Method::POST,
        &format!("/api/v1/messages/group/{}", group),
        Some(&alice),
        Some(json!({ "content": "agenda" })),
    )
    .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/messages/{}/group-read", id);

    let (status, body) = send(app.router(), Method::PUT, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["readBy"][0]["userId"], bob.id.to_string());

    let (_, body) = send(app.router(), Method::PUT, &uri, Some(&bob), None).await;
    assert_eq!(body["data"]["readBy"].as_array().unwrap().len(), 1);

    // Direct-message read endpoint does not apply to group messages
    let (status, _) = send(
        app.router(),
        Method::PUT,
        &format!("/api/v1/messages/{}/read", id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_by_sender_or_admin() {
    let app = TestApp::new();
    let (alice, bob) = (app.user("alice").await, app.user("bob").await);
    let admin = app.admin("root").await;

    let mut ids = Vec::new();
    for text in ["first", "second"] {
        let (_, body) = send(
            app.router(),
            Method::POST,
            &format!("/api/v1/messages/user/{}", bob.id),
            Some(&alice),
            Some(json!({ "content": text })),
        )
        .await;
        ids.push(body["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, _) = send(
        app.router(),
        Method::DELETE,
        &format!("/api/v1/messages/{}", ids[0]),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app.router(),
        Method::DELETE,
        &format!("/api/v1/messages/{}", ids[0]),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], ids[0]);

    let (status, _) = send(
        app.router(),
        Method::DELETE,
        &format!("/api/v1/messages/{}", ids[1]),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        app.router(),
        Method::GET,
        &format!("/api/v1/messages/{}", ids[1]),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_message_visibility() {
    let app = TestApp::new();
    let (alice, bob, eve) = (
        app.user("alice").await,
        app.user("bob").await,
        app.user("eve").await,
    );

    let (_, body) = send(
        app.router(),
        Method::POST,
        &format!("/api/v1/messages/user/{}", bob.id),
        Some(&alice),
        Some(json!({ "content": "private" })),
    )
    .await;
    let uri = format!("/api/v1/messages/{}", body["data"]["id"].as_str().unwrap());

    let (status, body) = send(app.router(), Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "private");

    let (status, _) = send(app.router(), Method::GET, &uri, Some(&eve), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_notifications_flow() {
    let app = TestApp::new();
    let (alice, bob) = (app.user("alice").await, app.user("bob").await);
    let notifications = &app.state.notifications;

    let first = assert_ok!(
        notifications
            .notify(bob.id, alice.id, NotificationKind::Follow, "alice followed you", None)
            .await
    );
    assert_ok!(
        notifications
            .notify(bob.id, alice.id, NotificationKind::Like, "alice liked your post", None)
            .await
    );

    let (_, body) = send(
        app.router(),
        Method::GET,
        "/api/v1/notifications/unread-count",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(body["data"]["unreadCount"], 2);

    let (status, _) = send(
        app.router(),
        Method::PUT,
        &format!("/api/v1/notifications/{}/read", first.id),
        Some(&alice),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        app.router(),
        Method::PUT,
        &format!("/api/v1/notifications/{}/read", first.id),
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isRead"], true);

    let (_, body) = send(
        app.router(),
        Method::PUT,
        "/api/v1/notifications/read-all",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(body["data"]["updated"], 1);

    let (_, body) = send(
        app.router(),
        Method::GET,
        "/api/v1/notifications",
        Some(&bob),
        None,
    )
    .await;
    assert_eq!(body["count"], 2);
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|notification| notification["isRead"] == true));
}

#[tokio::test]
async fn test_presence_endpoint() {
    let app = TestApp::new();
    let (alice, bob) = (app.user("alice").await, app.user("bob").await);
    let uri = format!("/api/v1/presence/{}", bob.id);

    let (_, body) = send(app.router(), Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(body["data"]["online"], false);

    let (_conn, _rx) = app.state.hub.connect(&bob.principal);
    let (_, body) = send(app.router(), Method::GET, &uri, Some(&alice), None).await;
    assert_eq!(body["data"]["online"], true);
    assert_eq!(body["data"]["userId"], bob.id.to_string());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();

    let (status, body) = send(app.router(), Method::GET, "/api/v1/nothing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_body!(body, 404);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let (status, body) = send(app.router(), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["onlineUsers"], 0);

    let alice = app.user("alice").await;
    let (_conn, _rx) = app.state.hub.connect(&alice.principal);
    let (_, body) = send(app.router(), Method::GET, "/health", None, None).await;
    assert_eq!(body["onlineUsers"], 1);
    assert_eq!(body["connections"], 1);
    assert_eq!(body["rooms"], 1);
}
