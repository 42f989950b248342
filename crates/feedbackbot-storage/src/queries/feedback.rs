// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback record persistence.

use feedbackbot_core::FeedbackBotError;
use feedbackbot_core::types::NewFeedback;
use rusqlite::params;

use crate::database::Database;
use crate::models::{FEEDBACK_COLUMNS, FeedbackRecord, feedback_from_row};
use crate::queries::members::find_or_create_member_in;

/// Resolve the sender and insert the record in one transaction.
///
/// If either step fails nothing is written.
pub async fn record_feedback(
    db: &Database,
    feedback: NewFeedback,
) -> Result<FeedbackRecord, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let member = find_or_create_member_in(
                &tx,
                feedback.tenant_id,
                feedback.group_id,
                feedback.telegram_user_id,
            )?;
            tx.execute(
                "INSERT INTO feedbacks (tenant_id, group_id, sender_id, message, admin_only, posted)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                params![
                    feedback.tenant_id,
                    feedback.group_id,
                    member.id,
                    feedback.message,
                    feedback.admin_only,
                ],
            )?;
            let id = tx.last_insert_rowid();
            let record = tx.query_row(
                &format!("SELECT {FEEDBACK_COLUMNS} FROM feedbacks WHERE id = ?1"),
                params![id],
                feedback_from_row,
            )?;
            tx.commit()?;
            Ok(record)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flag a record as republished into its group.
pub async fn mark_posted(db: &Database, feedback_id: i64) -> Result<(), FeedbackBotError> {
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE feedbacks SET posted = 1 WHERE id = ?1",
                params![feedback_id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(FeedbackBotError::NotFound {
            entity: "feedback",
            id: feedback_id.to_string(),
        });
    }
    Ok(())
}

/// Feedback submitted into a group, oldest first.
pub async fn list_feedback_for_group(
    db: &Database,
    group_id: i64,
) -> Result<Vec<FeedbackRecord>, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FEEDBACK_COLUMNS} FROM feedbacks WHERE group_id = ?1 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![group_id], feedback_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total number of feedback records across all groups.
pub async fn count_feedback(db: &Database) -> Result<i64, FeedbackBotError> {
    db.connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM feedbacks", [], |row| row.get(0)))
        .await
        .map_err(crate::database::map_tr_err)
}
