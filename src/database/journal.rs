// ABOUTME: Journal entry database operations
// ABOUTME: Day-bucketed upsert queries with a uniqueness constraint per (user, day)

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::JournalEntry;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// Compute the half-open UTC day bucket `[day, day+1)` for an entry date.
///
/// Day membership must use this range, never exact timestamp equality, so
/// entries carrying a time-of-day component still land in the right bucket.
pub fn day_bounds(day: NaiveDate) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    let end = day
        .succ_opt()
        .ok_or_else(|| AppError::invalid_format("Date out of range"))?
        .and_time(NaiveTime::MIN)
        .and_utc();
    Ok((start, end))
}

/// Canonical day key used by the `(user_id, day)` uniqueness constraint
#[must_use]
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

impl Database {
    /// Create the journal entries table
    pub(super) async fn migrate_journal(&self) -> AppResult<()> {
        // UNIQUE(user_id, day_key) closes the concurrent-upsert race at the
        // store: two racing creates for the same day cannot both insert.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS journal_entries (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                entry_at DATETIME NOT NULL,
                day_key TEXT NOT NULL,
                summary TEXT NOT NULL DEFAULT '',
                chat_id TEXT NOT NULL DEFAULT '',
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,
                UNIQUE(user_id, day_key)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_journal_entries_user_date ON journal_entries(user_id, entry_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Find the user's entry for a calendar day, if one exists.
    ///
    /// Uses the half-open range `[day, day+1)`; existence alone decides the
    /// create-vs-update question for the upsert workflow.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_entry_for_day(
        &self,
        user_id: Uuid,
        day: NaiveDate,
    ) -> AppResult<Option<JournalEntry>> {
        let (start, end) = day_bounds(day)?;

        let row = sqlx::query(
            r"
            SELECT id, user_id, title, content, entry_at, summary, chat_id, created_at, updated_at
            FROM journal_entries
            WHERE user_id = $1 AND entry_at >= $2 AND entry_at < $3
            ",
        )
        .bind(user_id.to_string())
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_entry).transpose()
    }

    /// Get an entry by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_entry(&self, entry_id: &str) -> AppResult<Option<JournalEntry>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, title, content, entry_at, summary, chat_id, created_at, updated_at
            FROM journal_entries WHERE id = $1
            ",
        )
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_entry).transpose()
    }

    /// List a user's entries, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_entries(&self, user_id: Uuid) -> AppResult<Vec<JournalEntry>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, title, content, entry_at, summary, chat_id, created_at, updated_at
            FROM journal_entries WHERE user_id = $1
            ORDER BY entry_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_entry).collect()
    }

    /// Insert a new entry together with its chat thread and index membership.
    ///
    /// Entry, chat, and the user's journal-index row are written in one
    /// transaction so the entry↔chat link cannot be half-established by a
    /// crash between writes.
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if another entry for the same
    /// `(user, day)` won the race, or a database error on failure.
    pub async fn create_entry_with_chat(&self, entry: &JournalEntry) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO chats (id, journal_id, created_at) VALUES ($1, $2, $3)")
            .bind(&entry.chat_id)
            .bind(&entry.id)
            .bind(entry.created_at)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            INSERT INTO journal_entries
                (id, user_id, title, content, entry_at, day_key, summary, chat_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            ",
        )
        .bind(&entry.id)
        .bind(entry.user_id.to_string())
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(entry.entry_at)
        .bind(day_key(entry.day()))
        .bind(&entry.summary)
        .bind(&entry.chat_id)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::already_exists("An entry for this day already exists")
            }
            _ => AppError::from(e),
        })?;

        sqlx::query("INSERT OR IGNORE INTO user_journal_index (user_id, entry_id) VALUES ($1, $2)")
            .bind(entry.user_id.to_string())
            .bind(&entry.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Overwrite title, content, and summary of an existing entry
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails; the returned count is
    /// zero when the entry vanished between lookup and write.
    pub async fn update_entry_fields(
        &self,
        entry_id: &str,
        title: &str,
        content: &str,
        summary: &str,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE journal_entries
            SET title = $2, content = $3, summary = $4, updated_at = $5
            WHERE id = $1
            ",
        )
        .bind(entry_id)
        .bind(title)
        .bind(content)
        .bind(summary)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Persist a repaired chat link onto an entry
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn set_entry_chat(&self, entry_id: &str, chat_id: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE journal_entries SET chat_id = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(entry_id)
        .bind(chat_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete an entry, its chat thread, and its index membership
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails.
    pub async fn delete_entry(&self, entry: &JournalEntry) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM chat_messages WHERE chat_id IN (SELECT id FROM chats WHERE journal_id = $1)")
            .bind(&entry.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM chats WHERE journal_id = $1")
            .bind(&entry.id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM journal_entries WHERE id = $1")
            .bind(&entry.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM user_journal_index WHERE user_id = $1 AND entry_id = $2")
            .bind(entry.user_id.to_string())
            .bind(&entry.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Convert a database row to a `JournalEntry`
fn row_to_entry(row: &SqliteRow) -> AppResult<JournalEntry> {
    let user_id_raw: String = row.get("user_id");
    let user_id = Uuid::parse_str(&user_id_raw)
        .map_err(|e| AppError::database(format!("Malformed user id '{user_id_raw}': {e}")))?;

    Ok(JournalEntry {
        id: row.get("id"),
        user_id,
        title: row.get("title"),
        content: row.get("content"),
        entry_at: row.get("entry_at"),
        summary: row.get("summary"),
        chat_id: row.get("chat_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds_half_open() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let (start, end) = day_bounds(day).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-01-02T00:00:00+00:00");

        // A time-of-day component stays inside the bucket
        let noon = day.and_hms_opt(12, 30, 0).unwrap().and_utc();
        assert!(noon >= start && noon < end);
        assert!(!(end >= start && end < end));
    }

    #[test]
    fn test_day_key_format() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(day_key(day), "2024-03-07");
    }
}
