// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot registration and lookup.

use feedbackbot_core::FeedbackBotError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{BOT_COLUMNS, Bot, NewBot, bot_from_row};

/// Register a bot. Tokens are unique across all tenants.
pub async fn create_bot(db: &Database, bot: NewBot) -> Result<Bot, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO bots (tenant_id, token, username, name, verified)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![bot.tenant_id, bot.token, bot.username, bot.name, bot.verified],
            )?;
            Ok(Bot {
                id: conn.last_insert_rowid(),
                tenant_id: bot.tenant_id,
                token: bot.token,
                username: bot.username,
                name: bot.name,
                verified: bot.verified,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_bot(db: &Database, id: i64) -> Result<Option<Bot>, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {BOT_COLUMNS} FROM bots WHERE id = ?1"),
                params![id],
                bot_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All verified bots, in registration order.
pub async fn list_verified_bots(db: &Database) -> Result<Vec<Bot>, FeedbackBotError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOT_COLUMNS} FROM bots WHERE verified = 1 ORDER BY id"
            ))?;
            let rows = stmt.query_map([], bot_from_row)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a successful token check, refreshing the bot's display handle.
pub async fn mark_verified(
    db: &Database,
    id: i64,
    username: &str,
    name: &str,
) -> Result<(), FeedbackBotError> {
    let username = username.to_string();
    let name = name.to_string();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE bots SET verified = 1, username = ?1, name = ?2 WHERE id = ?3",
                params![username, name, id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if updated == 0 {
        return Err(FeedbackBotError::NotFound {
            entity: "bot",
            id: id.to_string(),
        });
    }
    Ok(())
}
