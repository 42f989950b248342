// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unit-test fixtures: a recording messenger and a temp SQLite store.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use feedbackbot_core::types::{Bot, ChatType, FeedbackConfig, Group, InlineOption, NewGroup};
use feedbackbot_core::{FeedbackBotError, FeedbackStore, Messenger};
use feedbackbot_storage::queries::{bots, groups, tenants};
use feedbackbot_storage::{Database, NewBot, SqliteStore};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
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
    Answer(String),
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    failing_chats: Mutex<HashSet<i64>>,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `chat_id` fail.
    pub fn fail_chat(&self, chat_id: i64) {
        self.failing_chats.lock().unwrap().insert(chat_id);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Plain texts (including option prompts) sent to one chat.
    pub fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { chat_id: c, text } | Sent::Options { chat_id: c, text, .. }
                    if c == chat_id =>
                {
                    Some(text)
                }
                _ => None,
            })
            .collect()
    }

    fn record(&self, chat_id: Option<i64>, sent: Sent) -> Result<(), FeedbackBotError> {
        let failing = chat_id.filter(|c| self.failing_chats.lock().unwrap().contains(c));
        if let Some(chat_id) = failing {
            return Err(FeedbackBotError::Transport {
                message: format!("chat {chat_id} unreachable"),
                source: None,
            });
        }
        self.sent.lock().unwrap().push(sent);
        Ok(())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), FeedbackBotError> {
        self.record(
            Some(chat_id),
            Sent::Text {
                chat_id,
                text: text.to_string(),
            },
        )
    }

    async fn send_to_thread(
        &self,
        chat_id: i64,
        thread_id: i32,
        text: &str,
    ) -> Result<(), FeedbackBotError> {
        self.record(
            Some(chat_id),
            Sent::Thread {
                chat_id,
                thread_id,
                text: text.to_string(),
            },
        )
    }

    async fn send_with_options(
        &self,
        chat_id: i64,
        text: &str,
        options: &[InlineOption],
    ) -> Result<(), FeedbackBotError> {
        self.record(
            Some(chat_id),
            Sent::Options {
                chat_id,
                text: text.to_string(),
                options: options.to_vec(),
            },
        )
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), FeedbackBotError> {
        self.record(None, Sent::Answer(callback_id.to_string()))
    }
}

pub async fn store() -> (Arc<SqliteStore>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("agent.db").to_str().unwrap())
        .await
        .unwrap();
    (Arc::new(SqliteStore::from_database(db)), dir)
}

pub async fn seed_bot(store: &SqliteStore, slug: &str) -> Bot {
    let db = store.database().unwrap();
    let tenant = tenants::create_tenant(db, slug, slug).await.unwrap();
    bots::create_bot(
        db,
        NewBot {
            tenant_id: tenant.id,
            token: format!("{slug}:token"),
            username: format!("{slug}_bot"),
            name: slug.to_string(),
            verified: true,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_group(store: &SqliteStore, bot: &Bot, chat_id: i64, title: &str) -> Group {
    store
        .upsert_active_group(NewGroup {
            tenant_id: bot.tenant_id,
            bot_id: bot.id,
            chat_id,
            title: title.to_string(),
            chat_type: ChatType::Supergroup,
        })
        .await
        .unwrap()
        .group()
        .clone()
}

pub async fn enable_republish(store: &SqliteStore, group_id: i64, forum_topic_id: Option<i32>) {
    groups::update_feedback_config(
        store.database().unwrap(),
        FeedbackConfig {
            group_id,
            post_to_group: true,
            forum_topic_id,
        },
    )
    .await
    .unwrap();
}
