// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging transport traits: inbound long-poll source and outbound messenger.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FeedbackBotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Bot, InboundUpdate, InlineOption};

/// Source of inbound events for one bot.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetches events with an id of at least `offset`, waiting up to
    /// `timeout` on the server side when none are queued.
    ///
    /// Network failures surface as [`FeedbackBotError::Transport`] and
    /// undecodable batches as [`FeedbackBotError::Decode`].
    async fn fetch_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<InboundUpdate>, FeedbackBotError>;
}

/// Outbound message delivery for one bot.
///
/// Callers treat every operation as fire-and-forget: a failure is logged and
/// never rolls back persisted state.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Sends a plain text message to a chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), FeedbackBotError>;

    /// Sends a plain text message into a sub-thread of a chat.
    async fn send_to_thread(
        &self,
        chat_id: i64,
        thread_id: i32,
        text: &str,
    ) -> Result<(), FeedbackBotError>;

    /// Sends a text message with one selectable option per row.
    async fn send_with_options(
        &self,
        chat_id: i64,
        text: &str,
        options: &[InlineOption],
    ) -> Result<(), FeedbackBotError>;

    /// Acknowledges a selection callback so the client stops its spinner.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), FeedbackBotError>;
}

/// A full transport for one bot: adapter lifecycle plus both directions.
pub trait BotTransport: PluginAdapter + UpdateSource + Messenger {}

impl<T> BotTransport for T where T: PluginAdapter + UpdateSource + Messenger {}

/// Builds transports for bots as pollers are started.
pub trait TransportFactory: Send + Sync + 'static {
    fn create(&self, bot: &Bot) -> Result<Arc<dyn BotTransport>, FeedbackBotError>;
}
