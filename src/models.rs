// ABOUTME: Core domain models for users, sessions, journal entries, and chats
// ABOUTME: Includes wire-format request/response DTOs with PascalCase field names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Reverie

//! # Data Models
//!
//! Domain structures shared across the database layer and route handlers.
//! Inbound request bodies use PascalCase field names (`Title`, `Content`,
//! `Date`) to stay compatible with the existing client application.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address (unique, used for login)
    pub email: String,
    /// Bcrypt password hash, never serialized to clients
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Denormalized membership set of journal entry ids owned by this user.
    /// Entry listing queries the entry store directly; this set only rides
    /// along on the user record.
    pub journal_entries: Vec<String>,
    /// Account creation time
    pub created_at: DateTime<Utc>,
}

/// A server-side session record resolved from the `sid` cookie.
///
/// At most one live session exists per user: issuing a new token replaces
/// the previous row. Expired tokens fail lookup the same way absent ones do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token stored in the `sid` cookie
    pub token: String,
    /// The user this token resolves to
    pub user_id: Uuid,
    /// When the session was issued
    pub created_at: DateTime<Utc>,
    /// When the session stops being valid
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session is past its TTL at the given instant
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// A dated journal entry with its AI-generated summary and linked chat.
///
/// Invariant: at most one entry exists per `(user_id, calendar day)`, and a
/// non-empty `chat_id` always references a chat whose `journal_id` points
/// back at this entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique entry ID
    pub id: String,
    /// Owning user
    pub user_id: Uuid,
    /// Entry title
    pub title: String,
    /// Entry body text
    pub content: String,
    /// Entry timestamp; day membership is decided by the half-open range
    /// `[day, day+1)`, never exact equality
    pub entry_at: DateTime<Utc>,
    /// AI-generated summary, empty until summarization succeeds
    pub summary: String,
    /// Linked chat thread id, empty until the chat is created
    pub chat_id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// The calendar day this entry belongs to
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.entry_at.date_naive()
    }
}

/// A chat thread exclusively owned by one journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Unique chat ID
    pub id: String,
    /// The journal entry this chat belongs to
    pub journal_id: String,
    /// Ordered message log (insertion order is conversation order)
    pub messages: Vec<ChatMessage>,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Who authored a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageSender {
    /// The journaling user
    #[serde(rename = "user")]
    User,
    /// The AI assistant
    #[serde(rename = "AI", alias = "ai")]
    Ai,
}

impl MessageSender {
    /// Wire representation used in transcripts and storage
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "AI",
        }
    }

    /// Parse the stored representation
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "AI" | "ai" => Some(Self::Ai),
            _ => None,
        }
    }
}

/// A single immutable message inside a chat thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Position in the log; assigned at append time, never reordered
    pub seq: i64,
    /// Message author
    pub sender: MessageSender,
    /// Message text
    pub content: String,
    /// When the message was appended
    pub time: DateTime<Utc>,
}

/// A per-user profile summary singleton.
///
/// At most one status row exists per user; creating a second one is a
/// conflict, not a replace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatus {
    /// Owning user
    pub user_id: Uuid,
    /// Free-text summary of the user
    pub summary: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Registration request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegisterRequest {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Plaintext password, hashed before storage
    pub password: String,
}

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Journal entry upsert request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpsertEntryRequest {
    /// Entry title
    pub title: String,
    /// Entry body text
    pub content: String,
    /// Entry date as `yyyy-MM-dd`
    pub date: String,
}

/// Chat turn request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PostMessageRequest {
    /// The user's new message
    pub content: String,
}

/// User status create/update request body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserStatusRequest {
    /// Free-text summary of the user
    pub user_summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_roundtrip() {
        assert_eq!(MessageSender::parse("user"), Some(MessageSender::User));
        assert_eq!(MessageSender::parse("AI"), Some(MessageSender::Ai));
        assert_eq!(MessageSender::parse("robot"), None);
        assert_eq!(MessageSender::User.as_str(), "user");
        assert_eq!(MessageSender::Ai.as_str(), "AI");
    }

    #[test]
    fn test_upsert_request_wire_casing() {
        let body = r#"{"Title":"T","Content":"C","Date":"2024-01-01"}"#;
        let request: UpsertEntryRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.title, "T");
        assert_eq!(request.content, "C");
        assert_eq!(request.date, "2024-01-01");
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session {
            token: "tok".into(),
            user_id: Uuid::new_v4(),
            created_at: now - chrono::Duration::hours(2),
            expires_at: now - chrono::Duration::hours(1),
        };
        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - chrono::Duration::hours(1) - chrono::Duration::seconds(1)));
    }
}
