// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram transport for FeedbackBot.
//!
//! Implements [`UpdateSource`] and [`Messenger`] for the Telegram Bot API via
//! teloxide. Updates are pulled with `getUpdates` by the agent's own poller
//! rather than teloxide's dispatcher, so the cursor stays under our control.

pub mod convert;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use feedbackbot_config::model::TelegramConfig;
use feedbackbot_core::types::{AdapterType, Bot, HealthStatus, InboundUpdate, InlineOption};
use feedbackbot_core::{
    BotTransport, FeedbackBotError, Messenger, PluginAdapter, TransportFactory, UpdateSource,
};
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{
    AllowedUpdate, CallbackQueryId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId,
    ThreadId,
};
use tracing::debug;

/// Slack added to the HTTP timeout on top of the long-poll wait.
const HTTP_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

/// Update kinds requested from `getUpdates`.
fn allowed_updates() -> Vec<AllowedUpdate> {
    vec![
        AllowedUpdate::MyChatMember,
        AllowedUpdate::Message,
        AllowedUpdate::CallbackQuery,
    ]
}

/// Bot API transport for one registered bot.
pub struct TelegramTransport {
    bot: teloxide::Bot,
    bot_id: i64,
}

impl TelegramTransport {
    /// Builds a transport for `bot`, honoring the configured API URL.
    ///
    /// The HTTP client timeout is raised above the long-poll wait so
    /// `getUpdates` is not cut off client-side.
    pub fn new(bot: &Bot, config: &TelegramConfig) -> Result<Self, FeedbackBotError> {
        if bot.token.trim().is_empty() {
            return Err(FeedbackBotError::Config(format!(
                "bot {} has an empty token",
                bot.id
            )));
        }

        let timeout = Duration::from_secs(config.long_poll_timeout_secs) + HTTP_TIMEOUT_MARGIN;
        let client = teloxide::net::default_reqwest_settings()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedbackBotError::Config(format!("failed to build HTTP client: {e}")))?;

        let mut api = teloxide::Bot::with_client(bot.token.clone(), client);
        if let Some(url) = &config.api_url {
            let url = url
                .parse()
                .map_err(|e| FeedbackBotError::Config(format!("invalid telegram.api_url: {e}")))?;
            api = api.set_api_url(url);
        }

        Ok(Self {
            bot: api,
            bot_id: bot.id,
        })
    }
}

/// Maps a teloxide request failure, keeping undecodable responses distinct.
fn request_err(action: &str, e: RequestError) -> FeedbackBotError {
    match e {
        RequestError::InvalidJson { .. } => {
            FeedbackBotError::Decode(format!("failed to {action}: {e}"))
        }
        other => FeedbackBotError::transport(format!("failed to {action}"), other),
    }
}

#[async_trait]
impl PluginAdapter for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, FeedbackBotError> {
        match self.bot.get_me().await {
            Ok(me) => {
                debug!(bot_id = self.bot_id, username = ?me.username, "getMe succeeded");
                Ok(HealthStatus::Healthy)
            }
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), FeedbackBotError> {
        debug!(bot_id = self.bot_id, "Telegram transport shutting down");
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for TelegramTransport {
    async fn fetch_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<InboundUpdate>, FeedbackBotError> {
        let offset = i32::try_from(offset).map_err(|_| {
            FeedbackBotError::Internal(format!("update offset {offset} exceeds the Bot API range"))
        })?;
        let timeout = u32::try_from(timeout.as_secs()).unwrap_or(u32::MAX);

        let updates = self
            .bot
            .get_updates()
            .offset(offset)
            .timeout(timeout)
            .allowed_updates(allowed_updates())
            .await
            .map_err(|e| request_err("fetch updates", e))?;

        Ok(updates.into_iter().map(convert::convert_update).collect())
    }
}

#[async_trait]
impl Messenger for TelegramTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), FeedbackBotError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .await
            .map_err(|e| request_err("send message", e))?;
        Ok(())
    }

    async fn send_to_thread(
        &self,
        chat_id: i64,
        thread_id: i32,
        text: &str,
    ) -> Result<(), FeedbackBotError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .message_thread_id(ThreadId(MessageId(thread_id)))
            .await
            .map_err(|e| request_err("send thread message", e))?;
        Ok(())
    }

    async fn send_with_options(
        &self,
        chat_id: i64,
        text: &str,
        options: &[InlineOption],
    ) -> Result<(), FeedbackBotError> {
        let keyboard = InlineKeyboardMarkup::new(options.iter().map(|option| {
            vec![InlineKeyboardButton::callback(
                option.label.clone(),
                option.data.clone(),
            )]
        }));
        self.bot
            .send_message(ChatId(chat_id), text)
            .reply_markup(keyboard)
            .await
            .map_err(|e| request_err("send options", e))?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), FeedbackBotError> {
        self.bot
            .answer_callback_query(CallbackQueryId(callback_id.to_owned()))
            .await
            .map_err(|e| request_err("answer callback", e))?;
        Ok(())
    }
}

/// Creates one [`TelegramTransport`] per bot token.
#[derive(Debug, Clone)]
pub struct TelegramTransportFactory {
    config: TelegramConfig,
}

impl TelegramTransportFactory {
    pub fn new(config: TelegramConfig) -> Self {
        Self { config }
    }
}

impl TransportFactory for TelegramTransportFactory {
    fn create(&self, bot: &Bot) -> Result<Arc<dyn BotTransport>, FeedbackBotError> {
        Ok(Arc::new(TelegramTransport::new(bot, &self.config)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot(token: &str) -> Bot {
        Bot {
            id: 1,
            tenant_id: 1,
            token: token.to_string(),
            username: "acme_bot".into(),
            name: "Acme".into(),
            verified: true,
        }
    }

    #[test]
    fn rejects_empty_token() {
        let result = TelegramTransport::new(&bot(" "), &TelegramConfig::default());
        assert!(matches!(result, Err(FeedbackBotError::Config(_))));
    }

    #[test]
    fn accepts_custom_api_url() {
        let config = TelegramConfig {
            api_url: Some("http://localhost:8081".into()),
            ..TelegramConfig::default()
        };
        assert!(TelegramTransport::new(&bot("123:ABC"), &config).is_ok());
    }

    #[test]
    fn rejects_unparseable_api_url() {
        let config = TelegramConfig {
            api_url: Some("http://".into()),
            ..TelegramConfig::default()
        };
        let result = TelegramTransport::new(&bot("123:ABC"), &config);
        assert!(matches!(result, Err(FeedbackBotError::Config(_))));
    }

    #[test]
    fn plugin_adapter_metadata() {
        let transport = TelegramTransport::new(&bot("123:ABC"), &TelegramConfig::default()).unwrap();
        assert_eq!(transport.name(), "telegram");
        assert_eq!(transport.version(), semver::Version::new(0, 1, 0));
        assert_eq!(transport.adapter_type(), AdapterType::Transport);
    }

    #[test]
    fn factory_builds_transport_objects() {
        let factory = TelegramTransportFactory::new(TelegramConfig::default());
        let transport = factory.create(&bot("123:ABC")).unwrap();
        assert_eq!(transport.name(), "telegram");
    }

    #[test]
    fn allowed_updates_cover_pipeline_kinds() {
        let kinds = allowed_updates();
        assert_eq!(kinds.len(), 3);
        assert!(kinds.contains(&AllowedUpdate::MyChatMember));
        assert!(kinds.contains(&AllowedUpdate::Message));
        assert!(kinds.contains(&AllowedUpdate::CallbackQuery));
    }
}
