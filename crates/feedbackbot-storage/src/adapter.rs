// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the FeedbackStore and PendingStore traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use feedbackbot_config::model::StorageConfig;
use feedbackbot_core::types::{
    Bot, FeedbackConfig, FeedbackRecord, Group, GroupMember, GroupUpsert, NewFeedback, NewGroup,
    PendingSelection,
};
use feedbackbot_core::{
    AdapterType, FeedbackBotError, FeedbackStore, HealthStatus, PendingStore, PluginAdapter,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store.
///
/// The database is opened lazily by [`SqliteStore::initialize`], or
/// supplied up front with [`SqliteStore::from_database`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already open database.
    pub fn from_database(db: Database) -> Self {
        Self {
            config: StorageConfig::default(),
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Open the configured database and run migrations.
    pub async fn initialize(&self) -> Result<(), FeedbackBotError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| FeedbackBotError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// The underlying database, for provisioning queries.
    pub fn database(&self) -> Result<&Database, FeedbackBotError> {
        self.db.get().ok_or_else(|| FeedbackBotError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, FeedbackBotError> {
        self.database()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FeedbackBotError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl FeedbackStore for SqliteStore {
    async fn verified_bots(&self) -> Result<Vec<Bot>, FeedbackBotError> {
        queries::bots::list_verified_bots(self.database()?).await
    }

    async fn get_bot(&self, id: i64) -> Result<Option<Bot>, FeedbackBotError> {
        queries::bots::get_bot(self.database()?, id).await
    }

    async fn get_group(&self, id: i64) -> Result<Option<Group>, FeedbackBotError> {
        queries::groups::get_group(self.database()?, id).await
    }

    async fn get_group_by_chat_id(&self, chat_id: i64) -> Result<Option<Group>, FeedbackBotError> {
        queries::groups::get_group_by_chat_id(self.database()?, chat_id).await
    }

    async fn active_groups_for_bot(&self, bot_id: i64) -> Result<Vec<Group>, FeedbackBotError> {
        queries::groups::list_active_groups_for_bot(self.database()?, bot_id).await
    }

    async fn upsert_active_group(&self, group: NewGroup) -> Result<GroupUpsert, FeedbackBotError> {
        queries::groups::upsert_active_group(self.database()?, group).await
    }

    async fn deactivate_group(&self, bot_id: i64, chat_id: i64) -> Result<bool, FeedbackBotError> {
        queries::groups::deactivate_group(self.database()?, bot_id, chat_id).await
    }

    async fn feedback_config(
        &self,
        group_id: i64,
    ) -> Result<Option<FeedbackConfig>, FeedbackBotError> {
        queries::groups::get_feedback_config(self.database()?, group_id).await
    }

    async fn find_or_create_member(
        &self,
        tenant_id: i64,
        group_id: i64,
        telegram_user_id: i64,
    ) -> Result<GroupMember, FeedbackBotError> {
        queries::members::find_or_create_member(
            self.database()?,
            tenant_id,
            group_id,
            telegram_user_id,
        )
        .await
    }

    async fn record_feedback(
        &self,
        feedback: NewFeedback,
    ) -> Result<FeedbackRecord, FeedbackBotError> {
        queries::feedback::record_feedback(self.database()?, feedback).await
    }

    async fn mark_posted(&self, feedback_id: i64) -> Result<(), FeedbackBotError> {
        queries::feedback::mark_posted(self.database()?, feedback_id).await
    }
}

#[async_trait]
impl PendingStore for SqliteStore {
    async fn put(&self, selection: PendingSelection) -> Result<(), FeedbackBotError> {
        queries::pending::put_pending(self.database()?, selection).await
    }

    async fn get(
        &self,
        telegram_user_id: i64,
    ) -> Result<Option<PendingSelection>, FeedbackBotError> {
        queries::pending::get_pending(self.database()?, telegram_user_id).await
    }

    async fn take(
        &self,
        telegram_user_id: i64,
    ) -> Result<Option<PendingSelection>, FeedbackBotError> {
        queries::pending::take_pending(self.database()?, telegram_user_id).await
    }
}
