// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process signal handling.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Which signal ended the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl ShutdownSignal {
    pub fn name(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
        }
    }
}

/// Returns the process token, cancelled on SIGINT or SIGTERM.
///
/// Every poller token is a child of this one. When SIGTERM cannot be
/// watched only Ctrl+C stops the process.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let process = token.clone();

    tokio::spawn(async move {
        match wait_for_signal().await {
            Some(signal) => info!(signal = signal.name(), "stopping pollers"),
            None => warn!("signal listener failed, stopping pollers"),
        }
        process.cancel();
    });

    token
}

#[cfg(unix)]
async fn wait_for_signal() -> Option<ShutdownSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "SIGTERM unavailable, listening for Ctrl+C only");
            return interrupt().await;
        }
    };

    tokio::select! {
        received = interrupt() => received,
        _ = terminate.recv() => Some(ShutdownSignal::Terminate),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Option<ShutdownSignal> {
    interrupt().await
}

async fn interrupt() -> Option<ShutdownSignal> {
    tokio::signal::ctrl_c()
        .await
        .ok()
        .map(|()| ShutdownSignal::Interrupt)
}
