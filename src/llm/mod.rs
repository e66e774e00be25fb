// ABOUTME: AI gateway abstraction for summarization and entry-scoped chat
// ABOUTME: Defines the trait seam plus the wire payload types shared with the remote service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! # AI Gateway
//!
//! Interface to the external summarization/conversation service. The
//! [`AiGateway`] trait is the seam the workflows depend on; [`HttpAiGateway`]
//! is the production implementation. Callers decide whether a gateway failure
//! is fatal: the chat turn workflow treats it as fatal, entry creation
//! tolerates a failed summarization with an empty fallback.

mod gateway;

pub use gateway::HttpAiGateway;

use crate::errors::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request body for the summarization endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    /// The journal entry content to summarize
    #[serde(rename = "Message")]
    pub message: String,
}

/// Request body for the chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverseRequest {
    /// The assembled conversation transcript
    #[serde(rename = "Message")]
    pub message: String,
    /// The raw entry summary, sent alongside the transcript
    #[serde(rename = "Context")]
    pub context: String,
}

/// Response body shared by both endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// The generated text
    pub response: String,
}

/// Client for the external AI summarization/conversation service.
///
/// Neither operation retries; both fail with `ExternalServiceUnavailable` on
/// transport errors, non-success statuses, or malformed response bodies.
#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Summarize a journal entry's content
    async fn summarize(&self, text: &str) -> Result<String, AppError>;

    /// Send a conversation transcript plus summary context, returning the
    /// AI's reply
    async fn converse(&self, transcript: &str, context: &str) -> Result<String, AppError>;
}
