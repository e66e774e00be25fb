// ABOUTME: User account database operations
// ABOUTME: Handles registration lookups and the denormalized journal entry index

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create users table and the journal index table
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Denormalized membership set: which entry ids belong to which user.
        // Surfaced as the journal_entries list on the user record; entry
        // listing itself queries journal_entries directly.
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_journal_index (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                entry_id TEXT NOT NULL,
                PRIMARY KEY (user_id, entry_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Create a new user
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email is taken, or a database
    /// error on failure.
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO users (id, first_name, last_name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::already_exists("Email already in use")
            }
            _ => AppError::from(e),
        })?;

        Ok(user.id)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        self.get_user_impl("id", &user_id.to_string()).await
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.get_user_impl("email", email).await
    }

    /// Internal implementation for getting a user
    async fn get_user_impl(&self, field: &str, value: &str) -> AppResult<Option<User>> {
        let query = format!(
            r"
            SELECT id, first_name, last_name, email, password_hash, created_at
            FROM users WHERE {field} = $1
            "
        );

        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let id_raw: String = row.get("id");
        let id = Uuid::parse_str(&id_raw)
            .map_err(|e| AppError::database(format!("Malformed user id '{id_raw}': {e}")))?;

        let journal_entries = self.get_journal_index(id).await?;

        Ok(Some(User {
            id,
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            journal_entries,
            created_at: row.get("created_at"),
        }))
    }

    /// Read the user's journal index
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_journal_index(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT entry_id FROM user_journal_index WHERE user_id = $1 ORDER BY entry_id",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("entry_id")).collect())
    }
}
