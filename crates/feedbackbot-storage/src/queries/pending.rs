// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted pending group selections, one per end-user.

use feedbackbot_core::FeedbackBotError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{PENDING_COLUMNS, PendingSelection, pending_from_row};

/// Store a selection, replacing any earlier one for the same user.
pub async fn put_pending(db: &Database, pending: PendingSelection) -> Result<(), FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pending_feedbacks (telegram_user_id, bot_id, text, admin_only, language)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(telegram_user_id) DO UPDATE SET
                     bot_id = excluded.bot_id,
                     text = excluded.text,
                     admin_only = excluded.admin_only,
                     language = excluded.language,
                     created_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    pending.telegram_user_id,
                    pending.bot_id,
                    pending.text,
                    pending.admin_only,
                    pending.language.to_string(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_pending(
    db: &Database,
    telegram_user_id: i64,
) -> Result<Option<PendingSelection>, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {PENDING_COLUMNS} FROM pending_feedbacks WHERE telegram_user_id = ?1"),
                params![telegram_user_id],
                pending_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Read and delete the user's selection atomically.
pub async fn take_pending(
    db: &Database,
    telegram_user_id: i64,
) -> Result<Option<PendingSelection>, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let pending = tx
                .query_row(
                    &format!(
                        "SELECT {PENDING_COLUMNS} FROM pending_feedbacks WHERE telegram_user_id = ?1"
                    ),
                    params![telegram_user_id],
                    pending_from_row,
                )
                .optional()?;
            if pending.is_some() {
                tx.execute(
                    "DELETE FROM pending_feedbacks WHERE telegram_user_id = ?1",
                    params![telegram_user_id],
                )?;
            }
            tx.commit()?;
            Ok(pending)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
