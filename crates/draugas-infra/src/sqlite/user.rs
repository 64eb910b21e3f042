//! SQLite user repository implementation.
//!
//! Implements `UserRepository` from `draugas-core`. The user aggregate is
//! stored as a JSON document next to indexed `username`/`email` columns and a
//! `revision` counter used for compare-and-swap saves.

use chrono::Utc;
use sqlx::Row;

use draugas_core::repository::user::UserRepository;
use draugas_types::error::RepositoryError;
use draugas_types::user::{User, UserId};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `UserRepository`.
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, column: &str, value: String) -> Result<Option<User>, RepositoryError> {
        // `column` is always one of our own literals, never caller input.
        let sql = format!("SELECT document, revision FROM users WHERE {column} = ?");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        row.as_ref().map(user_from_row).transpose()
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, RepositoryError> {
    let document: String = row
        .try_get("document")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let revision: i64 = row
        .try_get("revision")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    let mut user: User = serde_json::from_str(&document)
        .map_err(|e| RepositoryError::Query(format!("invalid user document: {e}")))?;
    // The column is authoritative; the embedded copy may lag behind.
    user.revision = revision;
    Ok(user)
}

fn to_document(user: &User) -> Result<String, RepositoryError> {
    serde_json::to_string(user).map_err(|e| RepositoryError::Query(e.to_string()))
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let mut created = user.clone();
        created.revision = 0;
        let document = to_document(&created)?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO users (id, username, email, document, revision, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(created.id.to_string())
        .bind(&created.username)
        .bind(&created.email)
        .bind(&document)
        .bind(created.created_at.to_rfc3339())
        .bind(&now)
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(created),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => {
                Err(RepositoryError::Conflict(format!(
                    "username '{}' or email '{}' already exists",
                    created.username, created.email
                )))
            }
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_where("username", username.to_string()).await
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_where("id", id.to_string()).await
    }

    async fn save(&self, user: &User) -> Result<User, RepositoryError> {
        let mut saved = user.clone();
        saved.revision = user.revision + 1;
        let document = to_document(&saved)?;

        let result = sqlx::query(
            "UPDATE users SET username = ?, email = ?, document = ?, revision = ?, updated_at = ?
             WHERE id = ? AND revision = ?",
        )
        .bind(&saved.username)
        .bind(&saved.email)
        .bind(&document)
        .bind(saved.revision)
        .bind(Utc::now().to_rfc3339())
        .bind(saved.id.to_string())
        .bind(user.revision)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 1 {
            return Ok(saved);
        }

        // Nothing updated: tell a missing row apart from a stale revision.
        let exists: Option<(i64,)> = sqlx::query_as("SELECT revision FROM users WHERE id = ?")
            .bind(user.id.to_string())
            .fetch_optional(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match exists {
            Some((current,)) => Err(RepositoryError::Conflict(format!(
                "stale revision {} for user {} (current {current})",
                user.revision, user.id
            ))),
            None => Err(RepositoryError::NotFound),
        }
    }
}
