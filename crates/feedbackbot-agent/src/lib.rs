// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback ingestion pipeline for FeedbackBot.
//!
//! The [`FeedbackAgent`] runs one long-poll worker per verified bot. Each
//! worker hands its events, in order, to the [`Dispatcher`], which:
//! - tracks the groups a bot has been added to or removed from
//! - classifies private messages and enforces the per-user rate limit
//! - records feedback and optionally republishes it into the group
//! - completes multi-group submissions when the user picks a group

pub mod callback;
pub mod command;
pub mod conversation;
pub mod dispatcher;
pub mod i18n;
pub mod membership;
pub mod metrics;
pub mod pending;
pub mod poller;
pub mod ratelimit;
pub mod registry;
pub mod reply;
pub mod resolver;
pub mod shutdown;
pub mod submission;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use feedbackbot_config::model::FeedbackBotConfig;
use feedbackbot_core::types::Bot;
use feedbackbot_core::{FeedbackBotError, FeedbackStore, PendingStore, TransportFactory};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use pending::InMemoryPendingStore;
pub use poller::{Poller, PollerSettings};
pub use ratelimit::SlidingWindowLimiter;
pub use registry::{PollerRegistry, StartOutcome};

/// Process-level coordinator: wires the pipeline and owns the pollers.
pub struct FeedbackAgent {
    store: Arc<dyn FeedbackStore>,
    registry: PollerRegistry,
    shutdown: CancellationToken,
}

impl FeedbackAgent {
    /// Builds the pipeline. Pollers stop when `shutdown` is cancelled.
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        pending: Arc<dyn PendingStore>,
        factory: Arc<dyn TransportFactory>,
        config: &FeedbackBotConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let limiter = Arc::new(SlidingWindowLimiter::from_config(&config.rate_limit));
        let dispatcher = Arc::new(Dispatcher::new(
            store.clone(),
            pending,
            limiter,
            &config.feedback,
        ));
        let registry = PollerRegistry::new(
            factory,
            dispatcher,
            PollerSettings::from_config(&config.telegram),
            shutdown.clone(),
        );
        Self {
            store,
            registry,
            shutdown,
        }
    }

    pub fn registry(&self) -> &PollerRegistry {
        &self.registry
    }

    /// Starts polling a newly verified bot. Idempotent per bot.
    pub async fn start_polling(&self, bot: Bot) -> Result<StartOutcome, FeedbackBotError> {
        self.registry.start(bot).await
    }

    /// Starts every verified bot, then waits for shutdown and stops all pollers.
    pub async fn run(&self) -> Result<(), FeedbackBotError> {
        metrics::register_metrics();
        self.registry.start_verified(self.store.as_ref()).await?;
        info!("feedback agent running");

        self.shutdown.cancelled().await;
        info!("shutdown signal received, stopping pollers");
        self.registry.stop_all().await;

        info!("feedback agent stopped");
        Ok(())
    }
}
