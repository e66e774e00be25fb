// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides the stub AI gateway, server bootstrap, and auth helpers

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Shared test utilities for `reverie_server`
//!
//! Test servers run against a file-backed `SQLite` database in a temp
//! directory (an in-memory URL would give every pooled connection its own
//! empty database) and a programmable stub in place of the AI gateway.

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use reverie_server::{
    config::ServerConfig,
    database::Database,
    errors::AppError,
    llm::AiGateway,
    models::User,
    resources::ServerResources,
    routes,
};
use std::sync::{Arc, Mutex, Once};
use tempfile::TempDir;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .init();
    });
}

/// Programmable stand-in for the external AI service.
///
/// Records every call so tests can assert on exact payloads, and can be
/// switched into failure mode per operation.
pub struct StubGateway {
    summary: Mutex<Result<String, String>>,
    reply: Mutex<Result<String, String>>,
    /// Every text passed to `summarize`, in call order
    pub summarize_calls: Mutex<Vec<String>>,
    /// Every `(transcript, context)` pair passed to `converse`, in call order
    pub converse_calls: Mutex<Vec<(String, String)>>,
}

impl StubGateway {
    pub fn new() -> Self {
        Self {
            summary: Mutex::new(Ok("stub summary".to_owned())),
            reply: Mutex::new(Ok("stub reply".to_owned())),
            summarize_calls: Mutex::new(Vec::new()),
            converse_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_summary(&self, summary: &str) {
        *self.summary.lock().unwrap() = Ok(summary.to_owned());
    }

    pub fn fail_summaries(&self) {
        *self.summary.lock().unwrap() = Err("summarize endpoint down".to_owned());
    }

    pub fn set_reply(&self, reply: &str) {
        *self.reply.lock().unwrap() = Ok(reply.to_owned());
    }

    pub fn fail_conversations(&self) {
        *self.reply.lock().unwrap() = Err("chat endpoint down".to_owned());
    }
}

impl Default for StubGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiGateway for StubGateway {
    async fn summarize(&self, text: &str) -> Result<String, AppError> {
        self.summarize_calls.lock().unwrap().push(text.to_owned());
        match &*self.summary.lock().unwrap() {
            Ok(summary) => Ok(summary.clone()),
            Err(reason) => Err(AppError::external_unavailable(reason.clone())),
        }
    }

    async fn converse(&self, transcript: &str, context: &str) -> Result<String, AppError> {
        self.converse_calls
            .lock()
            .unwrap()
            .push((transcript.to_owned(), context.to_owned()));
        match &*self.reply.lock().unwrap() {
            Ok(reply) => Ok(reply.clone()),
            Err(reason) => Err(AppError::external_unavailable(reason.clone())),
        }
    }
}

/// A fully wired test server over a throwaway database
pub struct TestServer {
    pub router: Router,
    pub resources: Arc<ServerResources>,
    pub gateway: Arc<StubGateway>,
    _db_dir: TempDir,
}

/// Build a test server with migrated storage and a stub gateway
pub async fn create_test_server() -> TestServer {
    init_test_logging();

    let db_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = db_dir.path().join("test.db");
    let config = ServerConfig {
        database_url: format!("sqlite:{}", db_path.display()),
        ..ServerConfig::default()
    };

    let database = Database::new(&config.database_url)
        .await
        .expect("Failed to open test database");
    database.migrate().await.expect("Failed to run migrations");

    let gateway = Arc::new(StubGateway::new());
    let resources = Arc::new(ServerResources::new(database, gateway.clone(), config));
    let router = routes::router(resources.clone());

    TestServer {
        router,
        resources,
        gateway,
        _db_dir: db_dir,
    }
}

/// Create a user directly in the store and issue a session for them.
///
/// Returns the user id and a `sid=...` pair ready for the `Cookie` header.
pub async fn create_logged_in_user(
    resources: &Arc<ServerResources>,
    email: &str,
) -> (Uuid, String) {
    let user = User {
        id: Uuid::new_v4(),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        email: email.to_owned(),
        password_hash: bcrypt::hash("hunter2hunter2", 4).expect("Failed to hash password"),
        journal_entries: Vec::new(),
        created_at: Utc::now(),
    };

    let user_id = resources
        .database
        .create_user(&user)
        .await
        .expect("Failed to create test user");

    let session = resources
        .sessions
        .issue_session(user_id)
        .await
        .expect("Failed to issue session");

    (user_id, format!("sid={}", session.token))
}
