// ABOUTME: Chat thread route handlers for per-entry conversations
// ABOUTME: Builds summary-grounded transcripts, calls the AI gateway, and appends turns atomically

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! Chat routes
//!
//! Each journal entry owns one chat thread. Posting a message replays the
//! full history plus the entry summary to the AI gateway, then appends the
//! user message and the AI reply as one atomic turn. The reply is only
//! returned to the caller once the turn is durable.

use crate::errors::AppError;
use crate::models::{Chat, ChatMessage, JournalEntry, PostMessageRequest};
use crate::resources::ServerResources;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all chat routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/journal/entries/:entry_id/chat",
                get(Self::get_chat),
            )
            .route(
                "/api/journal/entries/:entry_id/chat/messages",
                post(Self::post_message),
            )
            .with_state(resources)
    }

    /// Get the chat thread for an entry, including its full message log
    async fn get_chat(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<String>,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;
        let entry = Self::load_owned_entry(&resources, &entry_id, user_id).await?;
        let chat = Self::load_entry_chat(&resources, &entry).await?;

        Ok((StatusCode::OK, Json(chat)).into_response())
    }

    /// Post a user message and return the AI reply.
    ///
    /// The reply is persisted before it is returned; if the append fails the
    /// caller gets an error and the log is unchanged, so the transcript never
    /// references a reply the store does not hold.
    async fn post_message(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(entry_id): Path<String>,
        Json(request): Json<PostMessageRequest>,
    ) -> Result<Response, AppError> {
        let user_id = resources.sessions.resolve_user(&headers).await?;

        if request.content.trim().is_empty() {
            return Err(AppError::missing_field("Content"));
        }

        let entry = Self::load_owned_entry(&resources, &entry_id, user_id).await?;
        let chat = Self::load_entry_chat(&resources, &entry).await?;

        let transcript = build_transcript(&entry.summary, &chat.messages, &request.content);

        let reply = resources
            .gateway
            .converse(&transcript, &entry.summary)
            .await?;

        resources
            .database
            .append_turn(&chat.id, &request.content, &reply)
            .await?;

        info!(
            "Appended chat turn to {} ({} prior messages)",
            chat.id,
            chat.messages.len()
        );
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "aiResponse": reply })),
        )
            .into_response())
    }

    /// Fetch an entry and verify the caller owns it
    async fn load_owned_entry(
        resources: &Arc<ServerResources>,
        entry_id: &str,
        user_id: Uuid,
    ) -> Result<JournalEntry, AppError> {
        let entry = resources
            .database
            .get_entry(entry_id)
            .await?
            .filter(|entry| entry.user_id == user_id)
            .ok_or_else(|| AppError::not_found("Journal entry"))?;
        Ok(entry)
    }

    /// Resolve the chat thread linked from an entry.
    ///
    /// A dangling link here is a consistency violation that gets surfaced as
    /// not-found; repair only happens on the entry update path.
    async fn load_entry_chat(
        resources: &Arc<ServerResources>,
        entry: &JournalEntry,
    ) -> Result<Chat, AppError> {
        if entry.chat_id.is_empty() {
            return Err(AppError::not_found("Chat"));
        }
        resources
            .database
            .get_chat(&entry.chat_id)
            .await?
            .ok_or_else(|| AppError::not_found("Chat"))
    }
}

/// Render the conversation as a single prompt string: the summary as a
/// `"Context: {summary}."` preamble, each logged message in order as
/// `"{sender}: {content}."`, then the new user message the same way.
fn build_transcript(summary: &str, history: &[ChatMessage], new_content: &str) -> String {
    let mut transcript = format!("Context: {summary}.");
    for message in history {
        let _ = write!(transcript, "{}: {}.", message.sender.as_str(), message.content);
    }
    let _ = write!(transcript, "user: {new_content}.");
    transcript
}
