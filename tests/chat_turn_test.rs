// ABOUTME: Integration tests for the chat turn workflow
// ABOUTME: Covers transcript assembly, atomic appends, and gateway failure handling

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use common::{create_logged_in_user, create_test_server, TestServer};
use helpers::axum_test::AxumTestRequest;
use reverie_server::models::MessageSender;
use serde_json::json;

/// Create a journal entry and return its id
async fn create_entry(server: &TestServer, cookie: &str, date: &str) -> String {
    let response = AxumTestRequest::post("/api/journal/entries")
        .header("cookie", cookie)
        .json(&json!({ "Title": "T", "Content": "C", "Date": date }))
        .send(server.router.clone())
        .await;
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json();
    body["journalId"].as_str().unwrap().to_owned()
}

async fn post_message(
    server: &TestServer,
    cookie: &str,
    entry_id: &str,
    content: &str,
) -> helpers::axum_test::AxumTestResponse {
    AxumTestRequest::post(&format!("/api/journal/entries/{entry_id}/chat/messages"))
        .header("cookie", cookie)
        .json(&json!({ "Content": content }))
        .send(server.router.clone())
        .await
}

#[tokio::test]
async fn test_first_message_sends_summary_grounded_transcript() {
    let server = create_test_server().await;
    let (_user_id, cookie) = create_logged_in_user(&server.resources, "ada@example.com").await;
    server.gateway.set_summary("S");

    let entry_id = create_entry(&server, &cookie, "2024-01-01").await;

    let response = post_message(&server, &cookie, &entry_id, "hello").await;
    assert_eq!(response.status(), 200);

    let calls = server.gateway.converse_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (transcript, context) = &calls[0];
    assert_eq!(transcript, "Context: S.user: hello.");
    assert_eq!(context, "S");
}

#[tokio::test]
async fn test_transcript_replays_full_history() {
    let server = create_test_server().await;
    let (_user_id, cookie) = create_logged_in_user(&server.resources, "ada@example.com").await;
    server.gateway.set_summary("S");
    server.gateway.set_reply("nice to meet you");

    let entry_id = create_entry(&server, &cookie, "2024-01-01").await;

    assert_eq!(post_message(&server, &cookie, &entry_id, "hi").await.status(), 200);
    assert_eq!(
        post_message(&server, &cookie, &entry_id, "hello").await.status(),
        200
    );

    let calls = server.gateway.converse_calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].0, "Context: S.user: hi.");
    assert_eq!(
        calls[1].0,
        "Context: S.user: hi.AI: nice to meet you.user: hello."
    );
}

#[tokio::test]
async fn test_successful_turn_appends_exactly_two_messages() {
    let server = create_test_server().await;
    let (_user_id, cookie) = create_logged_in_user(&server.resources, "ada@example.com").await;
    server.gateway.set_reply("I hear you");

    let entry_id = create_entry(&server, &cookie, "2024-01-01").await;

    let response = post_message(&server, &cookie, &entry_id, "hello").await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["aiResponse"], "I hear you");
    assert!(body.get("response").is_none(), "reply field is aiResponse");

    let entry = server
        .resources
        .database
        .get_entry(&entry_id)
        .await
        .unwrap()
        .unwrap();
    let chat = server
        .resources
        .database
        .get_chat(&entry.chat_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(chat.messages.len(), 2);
    assert_eq!(chat.messages[0].sender, MessageSender::User);
    assert_eq!(chat.messages[0].content, "hello");
    assert_eq!(chat.messages[1].sender, MessageSender::Ai);
    assert_eq!(chat.messages[1].content, "I hear you");
}

#[tokio::test]
async fn test_message_log_only_grows_in_order() {
    let server = create_test_server().await;
    let (_user_id, cookie) = create_logged_in_user(&server.resources, "ada@example.com").await;

    let entry_id = create_entry(&server, &cookie, "2024-01-01").await;

    for content in ["one", "two", "three"] {
        assert_eq!(post_message(&server, &cookie, &entry_id, content).await.status(), 200);
    }

    let entry = server
        .resources
        .database
        .get_entry(&entry_id)
        .await
        .unwrap()
        .unwrap();
    let chat = server
        .resources
        .database
        .get_chat(&entry.chat_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(chat.messages.len(), 6);
    let seqs: Vec<i64> = chat.messages.iter().map(|m| m.seq).collect();
    assert_eq!(seqs, vec![0, 1, 2, 3, 4, 5]);
    let user_contents: Vec<&str> = chat
        .messages
        .iter()
        .filter(|m| m.sender == MessageSender::User)
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(user_contents, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn test_gateway_failure_leaves_log_unchanged() {
    let server = create_test_server().await;
    let (_user_id, cookie) = create_logged_in_user(&server.resources, "ada@example.com").await;

    let entry_id = create_entry(&server, &cookie, "2024-01-01").await;
    assert_eq!(post_message(&server, &cookie, &entry_id, "hi").await.status(), 200);

    server.gateway.fail_conversations();
    let response = post_message(&server, &cookie, &entry_id, "hello").await;
    assert_eq!(response.status(), 502);

    let entry = server
        .resources
        .database
        .get_entry(&entry_id)
        .await
        .unwrap()
        .unwrap();
    let chat = server
        .resources
        .database
        .get_chat(&entry.chat_id)
        .await
        .unwrap()
        .unwrap();
    // Only the first successful turn is in the log
    assert_eq!(chat.messages.len(), 2);
}

#[tokio::test]
async fn test_post_message_rejects_empty_content() {
    let server = create_test_server().await;
    let (_user_id, cookie) = create_logged_in_user(&server.resources, "ada@example.com").await;

    let entry_id = create_entry(&server, &cookie, "2024-01-01").await;

    let response = post_message(&server, &cookie, &entry_id, "   ").await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_post_message_requires_session() {
    let server = create_test_server().await;
    let (_user_id, cookie) = create_logged_in_user(&server.resources, "ada@example.com").await;

    let entry_id = create_entry(&server, &cookie, "2024-01-01").await;

    let response = AxumTestRequest::post(&format!(
        "/api/journal/entries/{entry_id}/chat/messages"
    ))
    .json(&json!({ "Content": "hello" }))
    .send(server.router.clone())
    .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_post_message_to_unknown_entry_is_404() {
    let server = create_test_server().await;
    let (_user_id, cookie) = create_logged_in_user(&server.resources, "ada@example.com").await;

    let response = post_message(&server, &cookie, "no-such-entry", "hello").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_dangling_chat_link_is_surfaced_not_healed() {
    let server = create_test_server().await;
    let (_user_id, cookie) = create_logged_in_user(&server.resources, "ada@example.com").await;

    let entry_id = create_entry(&server, &cookie, "2024-01-01").await;

    // Drop the chat row out from under the entry
    sqlx::query("DELETE FROM chats WHERE journal_id = $1")
        .bind(&entry_id)
        .execute(server.resources.database.pool())
        .await
        .unwrap();

    let response = post_message(&server, &cookie, &entry_id, "hello").await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_get_chat_returns_message_log() {
    let server = create_test_server().await;
    let (_user_id, cookie) = create_logged_in_user(&server.resources, "ada@example.com").await;
    server.gateway.set_reply("noted");

    let entry_id = create_entry(&server, &cookie, "2024-01-01").await;
    assert_eq!(post_message(&server, &cookie, &entry_id, "hi").await.status(), 200);

    let response = AxumTestRequest::get(&format!("/api/journal/entries/{entry_id}/chat"))
        .header("cookie", &cookie)
        .send(server.router.clone())
        .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json();
    assert_eq!(body["journal_id"], entry_id);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["sender"], "user");
    assert_eq!(messages[1]["sender"], "AI");
    assert_eq!(messages[1]["content"], "noted");
}
