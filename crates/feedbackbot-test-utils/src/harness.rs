// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full pipeline over a temp SQLite database
//! with a seeded tenant and verified bot, a mock transport factory and a
//! poller registry tuned for fast tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use feedbackbot_agent::{
    DispatchOutcome, Dispatcher, InMemoryPendingStore, PollerRegistry, PollerSettings,
    SlidingWindowLimiter,
};
use feedbackbot_config::model::{FeedbackBotConfig, PendingBackend, StorageConfig};
use feedbackbot_core::types::{
    Bot, FeedbackConfig, FeedbackRecord, Group, InboundEvent, InboundUpdate, PendingSelection,
    Tenant,
};
use feedbackbot_core::{FeedbackBotError, FeedbackStore, PendingStore};
use feedbackbot_storage::queries::{bots, feedback, groups, tenants};
use feedbackbot_storage::{NewBot, SqliteStore};
use tokio_util::sync::CancellationToken;

use crate::events;
use crate::mock_transport::{MockTransport, MockTransportFactory};

/// Poller timings used by the harness registry.
pub const FAST_POLLER: PollerSettings = PollerSettings {
    long_poll_timeout: Duration::ZERO,
    error_backoff: Duration::from_millis(20),
    idle_interval: Duration::from_millis(5),
};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: FeedbackBotConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: FeedbackBotConfig::default(),
        }
    }

    pub fn with_rate_limit(mut self, max_per_window: u32, window_secs: u64) -> Self {
        self.config.rate_limit.max_per_window = max_per_window;
        self.config.rate_limit.window_secs = window_secs;
        self
    }

    pub fn with_pending_backend(mut self, backend: PendingBackend) -> Self {
        self.config.pending.backend = backend;
        self
    }

    pub fn with_max_message_length(mut self, max: usize) -> Self {
        self.config.feedback.max_message_length = max;
        self
    }

    /// Build the harness: temp database, seeded tenant and verified bot.
    pub async fn build(mut self) -> Result<TestHarness, FeedbackBotError> {
        let temp_dir = tempfile::TempDir::new().map_err(FeedbackBotError::storage)?;
        let db_path = temp_dir.path().join("test.db");
        self.config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let store = Arc::new(SqliteStore::new(self.config.storage.clone()));
        store.initialize().await?;

        let tenant = tenants::create_tenant(store.database()?, "Acme", "acme").await?;
        let bot = bots::create_bot(
            store.database()?,
            NewBot {
                tenant_id: tenant.id,
                token: "1001:acme-token".to_string(),
                username: "acme_feedback_bot".to_string(),
                name: "Acme Feedback".to_string(),
                verified: true,
            },
        )
        .await?;

        let pending: Arc<dyn PendingStore> = match self.config.pending.backend {
            PendingBackend::Memory => Arc::new(InMemoryPendingStore::new()),
            PendingBackend::Sqlite => store.clone(),
        };
        let limiter = Arc::new(SlidingWindowLimiter::from_config(&self.config.rate_limit));
        let dispatcher = Arc::new(Dispatcher::new(
            store.clone(),
            pending.clone(),
            limiter,
            &self.config.feedback,
        ));

        let factory = Arc::new(MockTransportFactory::new());
        let shutdown = CancellationToken::new();
        let registry = PollerRegistry::new(
            factory.clone(),
            dispatcher.clone(),
            FAST_POLLER,
            shutdown.clone(),
        );

        Ok(TestHarness {
            store,
            pending,
            factory,
            dispatcher,
            registry,
            shutdown,
            tenant,
            bot,
            config: self.config,
            next_update_id: AtomicI64::new(1),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock transports and temp storage.
pub struct TestHarness {
    /// SQLite store (temp DB, cleaned up on drop).
    pub store: Arc<SqliteStore>,
    /// Pending-selection store chosen by the configured backend.
    pub pending: Arc<dyn PendingStore>,
    pub factory: Arc<MockTransportFactory>,
    pub dispatcher: Arc<Dispatcher>,
    /// Registry spawning pollers against `factory` transports.
    pub registry: PollerRegistry,
    /// Parent token of every poller the registry starts.
    pub shutdown: CancellationToken,
    pub tenant: Tenant,
    /// The seeded, verified bot.
    pub bot: Bot,
    pub config: FeedbackBotConfig,
    next_update_id: AtomicI64,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default configuration.
    pub async fn new() -> Result<Self, FeedbackBotError> {
        Self::builder().build().await
    }

    /// The mock transport serving the seeded bot.
    pub fn transport(&self) -> Arc<MockTransport> {
        self.factory.transport_for(self.bot.id)
    }

    /// Wraps `event` with the next update id.
    pub fn update(&self, event: InboundEvent) -> InboundUpdate {
        InboundUpdate {
            update_id: self.next_update_id.fetch_add(1, Ordering::SeqCst),
            event,
        }
    }

    /// Dispatches one event to the seeded bot, bypassing the poller.
    pub async fn dispatch(&self, event: InboundEvent) -> DispatchOutcome {
        let bot = self.bot.clone();
        self.dispatch_as(&bot, event).await
    }

    /// Dispatches one event as received by `bot`.
    pub async fn dispatch_as(&self, bot: &Bot, event: InboundEvent) -> DispatchOutcome {
        let transport = self.factory.transport_for(bot.id);
        let update = self.update(event);
        self.dispatcher
            .dispatch(bot, transport.as_ref(), &update)
            .await
    }

    /// Registers another bot under the seeded tenant.
    pub async fn add_bot(&self, username: &str, verified: bool) -> Result<Bot, FeedbackBotError> {
        bots::create_bot(
            self.store.database()?,
            NewBot {
                tenant_id: self.tenant.id,
                token: format!("{username}:token"),
                username: username.to_string(),
                name: username.to_string(),
                verified,
            },
        )
        .await
    }

    /// Adds the seeded bot to a supergroup through the pipeline.
    pub async fn add_group(&self, chat_id: i64, title: &str) -> Result<Group, FeedbackBotError> {
        self.dispatch(events::bot_added(chat_id, title)).await;
        self.store
            .get_group_by_chat_id(chat_id)
            .await?
            .ok_or_else(|| FeedbackBotError::NotFound {
                entity: "group",
                id: chat_id.to_string(),
            })
    }

    pub async fn enable_republish(
        &self,
        group_id: i64,
        forum_topic_id: Option<i32>,
    ) -> Result<(), FeedbackBotError> {
        groups::update_feedback_config(
            self.store.database()?,
            FeedbackConfig {
                group_id,
                post_to_group: true,
                forum_topic_id,
            },
        )
        .await
    }

    pub async fn feedback_for(&self, group_id: i64) -> Result<Vec<FeedbackRecord>, FeedbackBotError> {
        feedback::list_feedback_for_group(self.store.database()?, group_id).await
    }

    pub async fn feedback_count(&self) -> Result<i64, FeedbackBotError> {
        feedback::count_feedback(self.store.database()?).await
    }

    pub async fn pending_for(
        &self,
        telegram_user_id: i64,
    ) -> Result<Option<PendingSelection>, FeedbackBotError> {
        self.pending.get(telegram_user_id).await
    }
}
