// ABOUTME: Chat thread database operations
// ABOUTME: Append-only message logs with transactional two-message turns

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Chat, ChatMessage, MessageSender};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

impl Database {
    /// Create chat tables
    pub(super) async fn migrate_chat(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chats (
                id TEXT PRIMARY KEY,
                journal_id TEXT UNIQUE NOT NULL,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // seq is the insertion order; it is never rewritten, so the log only
        // grows and history replays in the order it was appended.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS chat_messages (
                chat_id TEXT NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
                seq INTEGER NOT NULL,
                sender TEXT NOT NULL CHECK (sender IN ('user', 'AI')),
                content TEXT NOT NULL,
                created_at DATETIME NOT NULL,
                PRIMARY KEY (chat_id, seq)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chats_journal_id ON chats(journal_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create an empty chat thread for a journal entry (link repair path)
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn create_chat(&self, chat_id: &str, journal_id: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO chats (id, journal_id, created_at) VALUES ($1, $2, $3)")
            .bind(chat_id)
            .bind(journal_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get a chat thread with its full ordered message log
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_chat(&self, chat_id: &str) -> AppResult<Option<Chat>> {
        let row = sqlx::query("SELECT id, journal_id, created_at FROM chats WHERE id = $1")
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_chat(&row).await?)),
            None => Ok(None),
        }
    }

    /// Get the chat thread linked to a journal entry
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_chat_by_journal(&self, journal_id: &str) -> AppResult<Option<Chat>> {
        let row = sqlx::query("SELECT id, journal_id, created_at FROM chats WHERE journal_id = $1")
            .bind(journal_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.hydrate_chat(&row).await?)),
            None => Ok(None),
        }
    }

    /// Append a completed turn (user message, then AI message) atomically.
    ///
    /// Both messages commit together or not at all, so a crash mid-turn can
    /// never leave a user message without its reply in the log.
    ///
    /// # Errors
    ///
    /// Returns an error if either append fails; nothing is persisted then.
    pub async fn append_turn(
        &self,
        chat_id: &str,
        user_content: &str,
        ai_content: &str,
    ) -> AppResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let next_seq: i64 =
            sqlx::query("SELECT COALESCE(MAX(seq) + 1, 0) AS next_seq FROM chat_messages WHERE chat_id = $1")
                .bind(chat_id)
                .fetch_one(&mut *tx)
                .await?
                .get("next_seq");

        for (offset, (sender, content)) in [
            (MessageSender::User, user_content),
            (MessageSender::Ai, ai_content),
        ]
        .into_iter()
        .enumerate()
        {
            let result = sqlx::query(
                r"
                INSERT INTO chat_messages (chat_id, seq, sender, content, created_at)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(chat_id)
            .bind(next_seq + offset as i64)
            .bind(sender.as_str())
            .bind(content)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::database("Chat message append had no effect"));
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Load the ordered message log for a chat row
    async fn hydrate_chat(&self, row: &SqliteRow) -> AppResult<Chat> {
        let chat_id: String = row.get("id");

        let message_rows = sqlx::query(
            r"
            SELECT seq, sender, content, created_at
            FROM chat_messages WHERE chat_id = $1
            ORDER BY seq ASC
            ",
        )
        .bind(&chat_id)
        .fetch_all(&self.pool)
        .await?;

        let messages = message_rows
            .iter()
            .map(row_to_message)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Chat {
            id: chat_id,
            journal_id: row.get("journal_id"),
            messages,
            created_at: row.get("created_at"),
        })
    }
}

/// Convert a database row to a `ChatMessage`
fn row_to_message(row: &SqliteRow) -> AppResult<ChatMessage> {
    let sender_raw: String = row.get("sender");
    let sender = MessageSender::parse(&sender_raw)
        .ok_or_else(|| AppError::database(format!("Unknown message sender '{sender_raw}'")))?;

    Ok(ChatMessage {
        seq: row.get("seq"),
        sender,
        content: row.get("content"),
        time: row.get("created_at"),
    })
}
