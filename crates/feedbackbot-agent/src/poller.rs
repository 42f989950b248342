// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-poll worker for one bot.
//!
//! The cursor starts at zero and is moved to `update_id + 1` before each
//! event is dispatched, so a failing event is never fetched again. A failed
//! fetch leaves the cursor alone and waits out the backoff.

use std::sync::Arc;
use std::time::Duration;

use feedbackbot_config::model::TelegramConfig;
use feedbackbot_core::BotTransport;
use feedbackbot_core::types::Bot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::metrics;

/// Timing knobs for every poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerSettings {
    /// Server-side long-wait passed to each fetch.
    pub long_poll_timeout: Duration,
    /// Wait after a failed fetch.
    pub error_backoff: Duration,
    /// Wait after an empty batch.
    pub idle_interval: Duration,
}

impl PollerSettings {
    pub fn from_config(config: &TelegramConfig) -> Self {
        Self {
            long_poll_timeout: Duration::from_secs(config.long_poll_timeout_secs),
            error_backoff: Duration::from_secs(config.error_backoff_secs),
            idle_interval: Duration::from_secs(config.idle_interval_secs),
        }
    }
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self::from_config(&TelegramConfig::default())
    }
}

pub struct Poller {
    bot: Bot,
    transport: Arc<dyn BotTransport>,
    dispatcher: Arc<Dispatcher>,
    settings: PollerSettings,
    offset: i64,
}

impl Poller {
    pub fn new(
        bot: Bot,
        transport: Arc<dyn BotTransport>,
        dispatcher: Arc<Dispatcher>,
        settings: PollerSettings,
    ) -> Self {
        Self {
            bot,
            transport,
            dispatcher,
            settings,
            offset: 0,
        }
    }

    /// Polls until `cancel` fires.
    ///
    /// Cancellation is observed between iterations and during the backoff
    /// and idle waits. A fetch in flight is allowed to finish and its batch
    /// is dispatched completely before the loop exits.
    pub async fn run(mut self, cancel: CancellationToken) {
        let bot_id = self.bot.id;
        info!(bot_id, username = %self.bot.username, "poller started");

        while !cancel.is_cancelled() {
            let fetched = self
                .transport
                .fetch_updates(self.offset, self.settings.long_poll_timeout)
                .await;

            let updates = match fetched {
                Ok(updates) => updates,
                Err(e) => {
                    if e.is_transient() {
                        warn!(error = %e, bot_id, offset = self.offset, "failed to fetch updates, backing off");
                    } else {
                        error!(error = %e, bot_id, offset = self.offset, "failed to fetch updates, backing off");
                    }
                    metrics::record_poll_error(bot_id);
                    pause(self.settings.error_backoff, &cancel).await;
                    continue;
                }
            };

            if updates.is_empty() {
                pause(self.settings.idle_interval, &cancel).await;
                continue;
            }

            debug!(bot_id, count = updates.len(), "dispatching batch");
            for update in updates {
                self.offset = self.offset.max(update.update_id + 1);
                self.dispatcher
                    .dispatch(&self.bot, self.transport.as_ref(), &update)
                    .await;
            }
        }

        if let Err(e) = self.transport.shutdown().await {
            warn!(error = %e, bot_id, "transport shutdown failed (non-fatal)");
        }
        info!(bot_id, offset = self.offset, "poller stopped");
    }
}

/// Sleeps for `duration` unless cancelled first.
async fn pause(duration: Duration, cancel: &CancellationToken) {
    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        _ = cancel.cancelled() => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let settings = PollerSettings::from_config(&TelegramConfig {
            long_poll_timeout_secs: 25,
            error_backoff_secs: 7,
            idle_interval_secs: 2,
            ..TelegramConfig::default()
        });
        assert_eq!(settings.long_poll_timeout, Duration::from_secs(25));
        assert_eq!(settings.error_backoff, Duration::from_secs(7));
        assert_eq!(settings.idle_interval, Duration::from_secs(2));
    }

    #[test]
    fn default_settings_match_config_defaults() {
        let settings = PollerSettings::default();
        assert_eq!(settings.long_poll_timeout, Duration::from_secs(30));
        assert_eq!(settings.error_backoff, Duration::from_secs(5));
        assert_eq!(settings.idle_interval, Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_returns_early_on_cancel() {
        let cancel = CancellationToken::new();
        let waiter = {
            let cancel = cancel.clone();
            tokio::spawn(async move { pause(Duration::from_secs(3600), &cancel).await })
        };
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("pause should end on cancel")
            .unwrap();
    }
}
