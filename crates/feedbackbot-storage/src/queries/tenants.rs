// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tenant provisioning and lookup.

use feedbackbot_core::FeedbackBotError;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::Tenant;

/// Create a tenant. Slugs are unique.
pub async fn create_tenant(db: &Database, name: &str, slug: &str) -> Result<Tenant, FeedbackBotError> {
    let name = name.to_string();
    let slug = slug.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO tenants (name, slug) VALUES (?1, ?2)",
                params![name, slug],
            )?;
            Ok(Tenant {
                id: conn.last_insert_rowid(),
                name,
                slug,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_tenant(db: &Database, id: i64) -> Result<Option<Tenant>, FeedbackBotError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT id, name, slug FROM tenants WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Tenant {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
