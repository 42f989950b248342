// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database handle: one `tokio-rusqlite` connection serving every query.
//!
//! All writes are serialized on the connection's background thread, so
//! query modules take `&Database` and run their SQL inside `call()`.

use feedbackbot_core::FeedbackBotError;
use tracing::debug;

use crate::migrations;

/// Milliseconds a statement waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Handle to the FeedbackBot SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode and
    /// apply pending migrations.
    pub async fn open(path: &str) -> Result<Self, FeedbackBotError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, FeedbackBotError> {
        let migrate_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), FeedbackBotError> {
            let mut conn =
                rusqlite::Connection::open(&migrate_path).map_err(FeedbackBotError::storage)?;
            if wal_mode {
                let mode: String = conn
                    .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                    .map_err(FeedbackBotError::storage)?;
                debug!(mode, "journal mode set");
            }
            conn.pragma_update(None, "foreign_keys", "ON")
                .map_err(FeedbackBotError::storage)?;
            migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| FeedbackBotError::Internal(format!("migration task failed: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(FeedbackBotError::storage)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> {
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.pragma_update(None, "busy_timeout", BUSY_TIMEOUT_MS)?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL into the main database file.
    pub async fn close(&self) -> Result<(), FeedbackBotError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Convert a tokio-rusqlite error into `FeedbackBotError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> FeedbackBotError {
    FeedbackBotError::Storage {
        source: Box::new(e),
    }
}
