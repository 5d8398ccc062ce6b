//! Common test utilities and helpers
//!
//! - `TestApp` - app state over a fresh `MemoryStore`, with helpers to add
//!   users and groups and mint their tokens
//! - request helpers for driving the router with `tower::ServiceExt::oneshot`
//! - custom assertion macros

#![allow(dead_code)]

#[macro_use]
pub mod assertions;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use hearth::backend::auth::Principal;
use hearth::backend::routes::create_router;
use hearth::backend::server::{build_state_with, AppState, ServerConfig};
use hearth::backend::store::{GroupRecord, MemoryStore, Stores};
use hearth::shared::ServerEvent;

pub const TEST_SECRET: &str = "integration-test-secret";

/// A user registered in the test store
#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
    pub principal: Principal,
}

impl TestUser {
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Application state over an in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub config: ServerConfig,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::builder().jwt_secret(TEST_SECRET).build())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = build_state_with(&config, Stores::memory(store.clone()));
        Self { store, state, config }
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone(), &self.config)
    }

    pub async fn user(&self, username: &str) -> TestUser {
        let record = self.store.add_user(username).await;
        self.login(record.id, record.is_admin, username)
    }

    pub async fn admin(&self, username: &str) -> TestUser {
        let mut record = self.store.add_user(username).await;
        record.is_admin = true;
        self.store.insert_user(record.clone()).await;
        self.login(record.id, true, username)
    }

    fn login(&self, id: Uuid, is_admin: bool, username: &str) -> TestUser {
        let token = self
            .state
            .sessions
            .create_token(id)
            .expect("Failed to create test token");
        TestUser {
            id,
            username: username.to_string(),
            token,
            principal: Principal { user_id: id, is_admin },
        }
    }

    pub async fn group(&self, name: &str, members: &[&TestUser]) -> Uuid {
        let id = Uuid::new_v4();
        self.store
            .insert_group(GroupRecord {
                id,
                name: name.to_string(),
                members: members.iter().map(|user| user.id).collect(),
            })
            .await;
        id
    }
}

/// Send one request through the router and decode the JSON body
pub async fn send(
    router: Router,
    method: Method,
    uri: &str,
    user: Option<&TestUser>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, user.bearer());
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Everything currently queued for a connection
pub fn drain(rx: &mut mpsc::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
