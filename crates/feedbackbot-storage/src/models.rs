// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage-only input types and row decoding helpers.
//!
//! The persisted entities themselves live in `feedbackbot_core::types`.

use std::str::FromStr;

use rusqlite::types::Type;

pub use feedbackbot_core::types::{
    Bot, ChatType, FeedbackConfig, FeedbackRecord, Group, GroupMember, Language,
    PendingSelection, Tenant,
};

/// Input for registering a bot under a tenant.
#[derive(Debug, Clone)]
pub struct NewBot {
    pub tenant_id: i64,
    pub token: String,
    pub username: String,
    pub name: String,
    pub verified: bool,
}

/// Read a TEXT column and parse it with `FromStr`.
pub(crate) fn parse_column<T>(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn bot_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Bot> {
    Ok(Bot {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        token: row.get(2)?,
        username: row.get(3)?,
        name: row.get(4)?,
        verified: row.get(5)?,
    })
}

pub(crate) fn group_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        bot_id: row.get(2)?,
        chat_id: row.get(3)?,
        title: row.get(4)?,
        chat_type: parse_column(row, 5)?,
        is_active: row.get(6)?,
    })
}

pub(crate) fn member_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<GroupMember> {
    Ok(GroupMember {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        group_id: row.get(2)?,
        telegram_user_id: row.get(3)?,
    })
}

pub(crate) fn feedback_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackRecord> {
    Ok(FeedbackRecord {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        group_id: row.get(2)?,
        sender_id: row.get(3)?,
        message: row.get(4)?,
        admin_only: row.get(5)?,
        posted: row.get(6)?,
        created_at: row.get(7)?,
    })
}

pub(crate) fn pending_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PendingSelection> {
    Ok(PendingSelection {
        telegram_user_id: row.get(0)?,
        bot_id: row.get(1)?,
        text: row.get(2)?,
        admin_only: row.get(3)?,
        language: parse_column(row, 4)?,
    })
}

pub(crate) const BOT_COLUMNS: &str = "id, tenant_id, token, username, name, verified";
pub(crate) const GROUP_COLUMNS: &str =
    "id, tenant_id, bot_id, chat_id, title, chat_type, is_active";
pub(crate) const MEMBER_COLUMNS: &str = "id, tenant_id, group_id, telegram_user_id";
pub(crate) const FEEDBACK_COLUMNS: &str =
    "id, tenant_id, group_id, sender_id, message, admin_only, posted, created_at";
pub(crate) const PENDING_COLUMNS: &str = "telegram_user_id, bot_id, text, admin_only, language";
