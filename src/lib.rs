// ABOUTME: Main library entry point for the Reverie journaling backend
// ABOUTME: Provides session-gated journal, chat, and AI summarization APIs

// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

#![deny(unsafe_code)]

//! # Reverie Server
//!
//! A personal journaling backend. Users write one dated entry per calendar
//! day; each entry is summarized by an external AI service and owns a linked
//! chat thread for follow-up conversation grounded in that summary.
//!
//! ## Features
//!
//! - **Day-bucketed entries**: at most one journal entry per user per day,
//!   enforced by the store, with repeat submissions updating in place
//! - **AI summaries**: entry content is summarized through an external
//!   HTTP gateway; a gateway outage never blocks entry creation
//! - **Per-entry chat**: every entry carries exactly one conversation
//!   thread whose prompts replay the full history plus the summary
//! - **Cookie sessions**: opaque `sid` tokens with a TTL gate every
//!   journal and chat operation
//!
//! ## Architecture
//!
//! - **Routes**: axum handlers grouped per resource
//! - **Database**: `SQLite` stores for users, sessions, entries, and chats
//! - **Llm**: the AI gateway trait and its HTTP client
//! - **Auth**: session issuance, cookie parsing, and token resolution

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the binary crate (src/bin/) and integration
// tests (tests/). They must remain `pub` so external consumers can access
// them.

/// Session issuance and cookie-based token resolution
pub mod auth;

/// Configuration management loaded from environment variables
pub mod config;

/// User, session, journal, and chat persistence
pub mod database;

/// Unified error handling with standard error codes and HTTP responses
pub mod errors;

/// External AI gateway client for summarization and conversation
pub mod llm;

/// Structured logging initialization
pub mod logging;

/// Domain models and wire-format request types
pub mod models;

/// Shared resources threaded through route handlers
pub mod resources;

/// HTTP route handlers for auth, journal, chat, user status, and health endpoints
pub mod routes;
