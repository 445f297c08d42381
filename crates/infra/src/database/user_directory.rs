//! SQLite-backed connected-user directory

use std::sync::Arc;

use async_trait::async_trait;
use presencesync_core::UserDirectory;
use presencesync_domain::{PresenceSyncError, Result as DomainResult, UserRecord};
use rusqlite::{params, OptionalExtension, Row};
use tokio::task;
use tracing::debug;

use super::manager::{map_sql_error, DbManager};

/// Implementation of [`UserDirectory`] over the `connected_users` table
pub struct SqliteUserDirectory {
    db: Arc<DbManager>,
}

impl SqliteUserDirectory {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Link (or relink) a chat user to a mailbox.
    ///
    /// Relinking keeps the user's original position in directory order.
    pub async fn connect_user(&self, user: UserRecord) -> DomainResult<()> {
        let db = Arc::clone(&self.db);

        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO connected_users (chat_user_id, mailbox, remote_user_id, connected_at)
                 VALUES (?1, ?2, ?3, CAST(strftime('%s','now') AS INTEGER))
                 ON CONFLICT(chat_user_id) DO UPDATE SET
                     mailbox = excluded.mailbox,
                     remote_user_id = excluded.remote_user_id",
                params![user.chat_user_id, user.mailbox, user.remote_user_id],
            )
            .map_err(map_sql_error)?;
            debug!(chat_user_id = %user.chat_user_id, "user connected");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    /// Remove a user; returns whether a row was deleted.
    pub async fn disconnect_user(&self, chat_user_id: &str) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let chat_user_id = chat_user_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let deleted = conn
                .execute("DELETE FROM connected_users WHERE chat_user_id = ?1", params![chat_user_id])
                .map_err(map_sql_error)?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn load_all_connected_users(&self) -> DomainResult<Vec<UserRecord>> {
        let db = Arc::clone(&self.db);

        let users = task::spawn_blocking(move || -> DomainResult<Vec<UserRecord>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT chat_user_id, mailbox, remote_user_id
                     FROM connected_users ORDER BY connected_at, rowid",
                )
                .map_err(map_sql_error)?;
            let rows = stmt.query_map([], map_user_row).map_err(map_sql_error)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)??;

        if users.is_empty() {
            return Err(PresenceSyncError::NotFound("user index is empty".into()));
        }
        Ok(users)
    }

    async fn load_user_by_chat_id(&self, chat_user_id: &str) -> DomainResult<UserRecord> {
        let db = Arc::clone(&self.db);
        let chat_user_id = chat_user_id.to_owned();

        task::spawn_blocking(move || -> DomainResult<UserRecord> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT chat_user_id, mailbox, remote_user_id
                 FROM connected_users WHERE chat_user_id = ?1",
                params![&chat_user_id],
                map_user_row,
            )
            .optional()
            .map_err(map_sql_error)?
            .ok_or_else(|| PresenceSyncError::NotFound(format!("user {chat_user_id} is not connected")))
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        chat_user_id: row.get(0)?,
        mailbox: row.get(1)?,
        remote_user_id: row.get(2)?,
    })
}

fn map_join_error(err: task::JoinError) -> PresenceSyncError {
    if err.is_cancelled() {
        PresenceSyncError::Internal("blocking task cancelled".into())
    } else {
        PresenceSyncError::Internal(format!("blocking task panicked: {err}"))
    }
}
