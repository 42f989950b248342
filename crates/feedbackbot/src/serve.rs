// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `feedbackbot serve` command implementation.
//!
//! Opens storage, wires the Telegram transport into the feedback agent
//! and polls every verified bot until SIGINT/SIGTERM.

use std::sync::Arc;

use feedbackbot_agent::shutdown::install_signal_handler;
use feedbackbot_agent::{FeedbackAgent, InMemoryPendingStore};
use feedbackbot_config::{FeedbackBotConfig, PendingBackend};
use feedbackbot_core::{FeedbackBotError, PendingStore, PluginAdapter, TransportFactory};
use feedbackbot_storage::SqliteStore;
use feedbackbot_telegram::TelegramTransportFactory;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Runs the `feedbackbot serve` command.
pub async fn run_serve(config: FeedbackBotConfig) -> Result<(), FeedbackBotError> {
    init_tracing(&config.agent.log_level);
    info!("starting feedbackbot serve");

    let factory = Arc::new(TelegramTransportFactory::new(config.telegram.clone()));
    serve_until(config, factory, install_signal_handler()).await
}

/// Serves until `shutdown` is cancelled, then stops every poller and
/// checkpoints the database.
async fn serve_until(
    config: FeedbackBotConfig,
    factory: Arc<dyn TransportFactory>,
    shutdown: CancellationToken,
) -> Result<(), FeedbackBotError> {
    let store = Arc::new(SqliteStore::new(config.storage.clone()));
    store.initialize().await?;
    info!(path = %config.storage.database_path, "storage ready");

    let pending = pending_store(config.pending.backend, &store);
    let agent = FeedbackAgent::new(store.clone(), pending, factory, &config, shutdown);
    let result = agent.run().await;

    if let Err(e) = store.shutdown().await {
        warn!(error = %e, "storage shutdown failed");
    }
    info!("feedbackbot stopped");
    result
}

fn pending_store(backend: PendingBackend, store: &Arc<SqliteStore>) -> Arc<dyn PendingStore> {
    match backend {
        PendingBackend::Memory => {
            info!("pending selections kept in memory");
            Arc::new(InMemoryPendingStore::new())
        }
        PendingBackend::Sqlite => store.clone(),
    }
}

/// Initializes the tracing subscriber with the given log level.
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("feedbackbot={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
