// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owns the poller tasks, at most one per bot.

use std::collections::HashMap;
use std::sync::Arc;

use feedbackbot_core::types::Bot;
use feedbackbot_core::{FeedbackBotError, FeedbackStore, TransportFactory};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::poller::{Poller, PollerSettings};

/// Result of [`PollerRegistry::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A poller for this bot is still running; nothing was spawned.
    AlreadyRunning,
    /// Unverified bots are never polled.
    NotVerified,
}

struct RunningPoller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Starts and stops per-bot pollers.
///
/// Every poller's token is a child of the registry's token, so cancelling
/// the process token stops them all; [`stop_all`](Self::stop_all) also
/// waits for the tasks to exit.
pub struct PollerRegistry {
    factory: Arc<dyn TransportFactory>,
    dispatcher: Arc<Dispatcher>,
    settings: PollerSettings,
    shutdown: CancellationToken,
    running: Mutex<HashMap<i64, RunningPoller>>,
}

impl PollerRegistry {
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        dispatcher: Arc<Dispatcher>,
        settings: PollerSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            factory,
            dispatcher,
            settings,
            shutdown,
            running: Mutex::new(HashMap::new()),
        }
    }

    /// Spawns a poller for `bot` unless one is already running.
    pub async fn start(&self, bot: Bot) -> Result<StartOutcome, FeedbackBotError> {
        if !bot.verified {
            warn!(bot_id = bot.id, "refusing to poll unverified bot");
            return Ok(StartOutcome::NotVerified);
        }

        let mut running = self.running.lock().await;
        if running
            .get(&bot.id)
            .is_some_and(|poller| !poller.handle.is_finished())
        {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let transport = self.factory.create(&bot)?;
        let cancel = self.shutdown.child_token();
        let bot_id = bot.id;
        let poller = Poller::new(bot, transport, self.dispatcher.clone(), self.settings);
        let handle = tokio::spawn(poller.run(cancel.clone()));
        running.insert(bot_id, RunningPoller { cancel, handle });
        Ok(StartOutcome::Started)
    }

    /// Starts every verified bot in the store. Bots whose transport cannot
    /// be built are logged and skipped. Returns how many pollers started.
    pub async fn start_verified(&self, store: &dyn FeedbackStore) -> Result<usize, FeedbackBotError> {
        let mut started = 0;
        for bot in store.verified_bots().await? {
            let bot_id = bot.id;
            match self.start(bot).await {
                Ok(StartOutcome::Started) => started += 1,
                Ok(_) => {}
                Err(e) => error!(error = %e, bot_id, "failed to start poller"),
            }
        }
        info!(started, "pollers started for verified bots");
        Ok(started)
    }

    /// Stops one bot's poller and waits for it. Returns `false` if none was registered.
    pub async fn stop(&self, bot_id: i64) -> bool {
        let Some(poller) = self.running.lock().await.remove(&bot_id) else {
            return false;
        };
        poller.cancel.cancel();
        join(bot_id, poller.handle).await;
        true
    }

    /// Stops every poller and waits for all of them to exit.
    pub async fn stop_all(&self) {
        let pollers: Vec<_> = self.running.lock().await.drain().collect();
        for poller in pollers.iter().map(|(_, p)| p) {
            poller.cancel.cancel();
        }
        for (bot_id, poller) in pollers {
            join(bot_id, poller.handle).await;
        }
        info!("all pollers stopped");
    }

    pub async fn is_running(&self, bot_id: i64) -> bool {
        self.running
            .lock()
            .await
            .get(&bot_id)
            .is_some_and(|poller| !poller.handle.is_finished())
    }

    pub async fn running_count(&self) -> usize {
        self.running
            .lock()
            .await
            .values()
            .filter(|poller| !poller.handle.is_finished())
            .count()
    }
}

async fn join(bot_id: i64, handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        error!(error = %e, bot_id, "poller task ended abnormally");
    }
}
