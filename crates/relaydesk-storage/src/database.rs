// SPDX-FileCopyrightText: 2026 Relaydesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use relaydesk_core::RelaydeskError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Handle to the SQLite database backing the repository.
pub struct Database {
    conn: Connection,
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> RelaydeskError {
    RelaydeskError::Storage { source: Box::new(e) }
}

impl Database {
    /// Open (or create) the database at `path`, set PRAGMAs, and run all
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, RelaydeskError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| RelaydeskError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        conn.call(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            crate::migrations::run_migrations(conn)?;
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(())
        })
        .await
        .map_err(|e| match e {
            tokio_rusqlite::Error::Error(source) => RelaydeskError::Storage { source },
            e => RelaydeskError::Storage {
                source: e.to_string().into(),
            },
        })?;

        debug!(path = path, "database opened");
        Ok(Self { conn })
    }

    /// The shared connection handle. All queries go through this.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Close the background connection, flushing pending writes.
    pub async fn close(&self) -> Result<(), RelaydeskError> {
        self.conn
            .clone()
            .close()
            .await
            .map_err(|e| RelaydeskError::Storage { source: Box::new(e) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema_and_closes() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        // All tables from the initial migration must exist.
        let count: i64 = db
            .connection()
            .call(|conn| {
                let n = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                     AND name IN ('users', 'tickets', 'ticket_staff', 'ticket_support',
                                  'chats', 'staff', 'encrypted_events', 'event_pairs')",
                    [],
                    |row| row.get(0),
                )?;
                Ok::<_, rusqlite::Error>(n)
            })
            .await
            .unwrap();
        assert_eq!(count, 8);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();

        // Migrations must not re-run or fail on a second open.
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }
}
