// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock transport for deterministic testing.
//!
//! `MockTransport` implements `BotTransport` with scripted inbound batches
//! and captured outbound messages for assertion in tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use feedbackbot_core::types::{AdapterType, Bot, HealthStatus, InboundUpdate, InlineOption};
use feedbackbot_core::{
    BotTransport, FeedbackBotError, Messenger, PluginAdapter, TransportFactory, UpdateSource,
};

/// One outbound call captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessage {
    Text {
        chat_id: i64,
        text: String,
    },
    Thread {
        chat_id: i64,
        thread_id: i32,
        text: String,
    },
    Options {
        chat_id: i64,
        text: String,
        options: Vec<InlineOption>,
    },
}

impl SentMessage {
    pub fn chat_id(&self) -> i64 {
        match self {
            Self::Text { chat_id, .. }
            | Self::Thread { chat_id, .. }
            | Self::Options { chat_id, .. } => *chat_id,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Text { text, .. } | Self::Thread { text, .. } | Self::Options { text, .. } => {
                text
            }
        }
    }
}

enum ScriptedFetch {
    Batch(Vec<InboundUpdate>),
    Fail(String),
}

/// A mock Bot API transport.
///
/// - **inbound**: batches queued with `push_batch()` are returned by
///   `fetch_updates()` in order; an empty queue yields empty batches
/// - **sent**: outbound calls are captured and retrievable via `sent_messages()`
pub struct MockTransport {
    inbound: Mutex<VecDeque<ScriptedFetch>>,
    sent: Mutex<Vec<SentMessage>>,
    answered: Mutex<Vec<String>>,
    offsets: Mutex<Vec<i64>>,
    failing_chats: Mutex<HashSet<i64>>,
    fetches: AtomicUsize,
    fetched: Notify,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            answered: Mutex::new(Vec::new()),
            offsets: Mutex::new(Vec::new()),
            failing_chats: Mutex::new(HashSet::new()),
            fetches: AtomicUsize::new(0),
            fetched: Notify::new(),
        }
    }

    /// Queue a batch for a later fetch.
    pub async fn push_batch(&self, updates: Vec<InboundUpdate>) {
        self.inbound
            .lock()
            .await
            .push_back(ScriptedFetch::Batch(updates));
    }

    /// Queue a failed fetch.
    pub async fn push_failure(&self, message: &str) {
        self.inbound
            .lock()
            .await
            .push_back(ScriptedFetch::Fail(message.to_string()));
    }

    /// Make every send to `chat_id` fail with a transport error.
    pub async fn fail_sends_to(&self, chat_id: i64) {
        self.failing_chats.lock().await.insert(chat_id);
    }

    pub async fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().await.clone()
    }

    /// Messages sent to one chat, in order.
    pub async fn sent_to(&self, chat_id: i64) -> Vec<SentMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.chat_id() == chat_id)
            .cloned()
            .collect()
    }

    pub async fn answered_callbacks(&self) -> Vec<String> {
        self.answered.lock().await.clone()
    }

    /// Offsets passed to each `fetch_updates()` call.
    pub async fn requested_offsets(&self) -> Vec<i64> {
        self.offsets.lock().await.clone()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Waits until at least `count` fetches happened. Because a poller only
    /// fetches again after dispatching its previous batch, this also means
    /// every batch before the `count`-th fetch has been processed.
    pub async fn wait_for_fetches(&self, count: usize, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, async {
            loop {
                let notified = self.fetched.notified();
                if self.fetch_count() >= count {
                    return;
                }
                notified.await;
            }
        })
        .await
        .is_ok()
    }

    async fn record(&self, message: SentMessage) -> Result<(), FeedbackBotError> {
        let chat_id = message.chat_id();
        if self.failing_chats.lock().await.contains(&chat_id) {
            return Err(FeedbackBotError::Transport {
                message: format!("mock send to {chat_id} failed"),
                source: None,
            });
        }
        self.sent.lock().await.push(message);
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockTransport {
    fn name(&self) -> &str {
        "mock-transport"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Transport
    }

    async fn health_check(&self) -> Result<HealthStatus, FeedbackBotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), FeedbackBotError> {
        Ok(())
    }
}

#[async_trait]
impl UpdateSource for MockTransport {
    async fn fetch_updates(
        &self,
        offset: i64,
        _timeout: Duration,
    ) -> Result<Vec<InboundUpdate>, FeedbackBotError> {
        self.offsets.lock().await.push(offset);
        let next = self.inbound.lock().await.pop_front();
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.fetched.notify_waiters();

        match next {
            Some(ScriptedFetch::Batch(updates)) => Ok(updates),
            Some(ScriptedFetch::Fail(message)) => Err(FeedbackBotError::Transport {
                message,
                source: None,
            }),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl Messenger for MockTransport {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), FeedbackBotError> {
        self.record(SentMessage::Text {
            chat_id,
            text: text.to_string(),
        })
        .await
    }

    async fn send_to_thread(
        &self,
        chat_id: i64,
        thread_id: i32,
        text: &str,
    ) -> Result<(), FeedbackBotError> {
        self.record(SentMessage::Thread {
            chat_id,
            thread_id,
            text: text.to_string(),
        })
        .await
    }

    async fn send_with_options(
        &self,
        chat_id: i64,
        text: &str,
        options: &[InlineOption],
    ) -> Result<(), FeedbackBotError> {
        self.record(SentMessage::Options {
            chat_id,
            text: text.to_string(),
            options: options.to_vec(),
        })
        .await
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), FeedbackBotError> {
        self.answered.lock().await.push(callback_id.to_string());
        Ok(())
    }
}

/// Hands out one shared [`MockTransport`] per bot id.
#[derive(Default)]
pub struct MockTransportFactory {
    transports: StdMutex<HashMap<i64, Arc<MockTransport>>>,
    created: AtomicUsize,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The transport the factory returns for `bot_id`, created on first use.
    pub fn transport_for(&self, bot_id: i64) -> Arc<MockTransport> {
        let mut transports = match self.transports.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        transports
            .entry(bot_id)
            .or_insert_with(|| Arc::new(MockTransport::new()))
            .clone()
    }

    /// Number of `create()` calls so far.
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(&self, bot: &Bot) -> Result<Arc<dyn BotTransport>, FeedbackBotError> {
        if bot.token.is_empty() {
            return Err(FeedbackBotError::Config(format!(
                "bot {} has an empty token",
                bot.id
            )));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(self.transport_for(bot.id))
    }
}
