// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group lifecycle and feedback-config queries.

use feedbackbot_core::FeedbackBotError;
use feedbackbot_core::types::{GroupUpsert, NewGroup};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{FeedbackConfig, GROUP_COLUMNS, Group, group_from_row};

pub async fn get_group(db: &Database, id: i64) -> Result<Option<Group>, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {GROUP_COLUMNS} FROM chat_groups WHERE id = ?1"),
                params![id],
                group_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_group_by_chat_id(
    db: &Database,
    chat_id: i64,
) -> Result<Option<Group>, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {GROUP_COLUMNS} FROM chat_groups WHERE chat_id = ?1"),
                params![chat_id],
                group_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active groups owned by a bot, oldest first.
pub async fn list_active_groups_for_bot(
    db: &Database,
    bot_id: i64,
) -> Result<Vec<Group>, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {GROUP_COLUMNS} FROM chat_groups
                 WHERE bot_id = ?1 AND is_active = 1
                 ORDER BY id"
            ))?;
            let rows = stmt.query_map(params![bot_id], group_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create the chat's group with a default config, or reactivate it.
///
/// Reactivation refreshes title and kind only; the owning bot and tenant
/// are fixed when the row is created. Runs in one transaction so a group
/// never exists without its config row.
pub async fn upsert_active_group(
    db: &Database,
    group: NewGroup,
) -> Result<GroupUpsert, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let chat_type = group.chat_type.to_string();

            let existing: Option<(i64, i64, i64)> = tx
                .query_row(
                    "SELECT id, tenant_id, bot_id FROM chat_groups WHERE chat_id = ?1",
                    params![group.chat_id],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()?;

            let (id, tenant_id, bot_id, created) = match existing {
                Some((id, tenant_id, bot_id)) => {
                    tx.execute(
                        "UPDATE chat_groups
                         SET title = ?1, chat_type = ?2, is_active = 1,
                             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?3",
                        params![group.title, chat_type, id],
                    )?;
                    // Groups created before configs existed still get one.
                    tx.execute(
                        "INSERT INTO feedback_configs (group_id) VALUES (?1)
                         ON CONFLICT(group_id) DO NOTHING",
                        params![id],
                    )?;
                    (id, tenant_id, bot_id, false)
                }
                None => {
                    tx.execute(
                        "INSERT INTO chat_groups (tenant_id, bot_id, chat_id, title, chat_type, is_active)
                         VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                        params![group.tenant_id, group.bot_id, group.chat_id, group.title, chat_type],
                    )?;
                    let id = tx.last_insert_rowid();
                    tx.execute(
                        "INSERT INTO feedback_configs (group_id, post_to_group) VALUES (?1, 0)",
                        params![id],
                    )?;
                    (id, group.tenant_id, group.bot_id, true)
                }
            };
            tx.commit()?;

            let stored = Group {
                id,
                tenant_id,
                bot_id,
                chat_id: group.chat_id,
                title: group.title,
                chat_type: group.chat_type,
                is_active: true,
            };
            Ok(if created {
                GroupUpsert::Created(stored)
            } else {
                GroupUpsert::Reactivated(stored)
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Deactivate the chat's group if `bot_id` owns it and it is active.
///
/// Returns whether a row changed; repeated calls are no-ops.
pub async fn deactivate_group(
    db: &Database,
    bot_id: i64,
    chat_id: i64,
) -> Result<bool, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE chat_groups
                 SET is_active = 0, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE chat_id = ?1 AND bot_id = ?2 AND is_active = 1",
                params![chat_id, bot_id],
            )
        })
        .await
        .map(|changed| changed > 0)
        .map_err(crate::database::map_tr_err)
}

pub async fn get_feedback_config(
    db: &Database,
    group_id: i64,
) -> Result<Option<FeedbackConfig>, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT group_id, post_to_group, forum_topic_id
                 FROM feedback_configs WHERE group_id = ?1",
                params![group_id],
                |row| {
                    Ok(FeedbackConfig {
                        group_id: row.get(0)?,
                        post_to_group: row.get(1)?,
                        forum_topic_id: row.get(2)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite a group's republishing settings.
pub async fn update_feedback_config(
    db: &Database,
    config: FeedbackConfig,
) -> Result<(), FeedbackBotError> {
    let group_id = config.group_id;
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE feedback_configs
                 SET post_to_group = ?1, forum_topic_id = ?2,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE group_id = ?3",
                params![config.post_to_group, config.forum_topic_id, config.group_id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(FeedbackBotError::NotFound {
            entity: "feedback config",
            id: group_id.to_string(),
        });
    }
    Ok(())
}
