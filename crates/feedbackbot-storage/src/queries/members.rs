// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group member resolution.

use feedbackbot_core::FeedbackBotError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{GroupMember, MEMBER_COLUMNS, member_from_row};

/// Find the member for (group, user), inserting it first when absent.
///
/// Usable inside an open transaction; the unique (group_id, telegram_user_id)
/// constraint makes concurrent first submissions converge on one row.
pub(crate) fn find_or_create_member_in(
    conn: &rusqlite::Connection,
    tenant_id: i64,
    group_id: i64,
    telegram_user_id: i64,
) -> rusqlite::Result<GroupMember> {
    conn.execute(
        "INSERT INTO group_users (tenant_id, group_id, telegram_user_id) VALUES (?1, ?2, ?3)
         ON CONFLICT(group_id, telegram_user_id) DO NOTHING",
        params![tenant_id, group_id, telegram_user_id],
    )?;
    conn.query_row(
        &format!(
            "SELECT {MEMBER_COLUMNS} FROM group_users
             WHERE group_id = ?1 AND telegram_user_id = ?2"
        ),
        params![group_id, telegram_user_id],
        member_from_row,
    )
}

pub async fn find_or_create_member(
    db: &Database,
    tenant_id: i64,
    group_id: i64,
    telegram_user_id: i64,
) -> Result<GroupMember, FeedbackBotError> {
    db.connection()
        .call(move |conn| find_or_create_member_in(conn, tenant_id, group_id, telegram_user_id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of members known in a group.
pub async fn count_members(db: &Database, group_id: i64) -> Result<i64, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM group_users WHERE group_id = ?1",
                params![group_id],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}
