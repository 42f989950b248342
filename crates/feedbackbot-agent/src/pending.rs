// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory pending-selection store for single-process deployments.
//!
//! Selections are lost on restart; users then get the session-expired
//! reply and resubmit.

use std::collections::HashMap;

use async_trait::async_trait;
use feedbackbot_core::types::PendingSelection;
use feedbackbot_core::{FeedbackBotError, PendingStore};
use tokio::sync::Mutex;

/// [`PendingStore`] backed by a map keyed by end-user.
#[derive(Debug, Default)]
pub struct InMemoryPendingStore {
    entries: Mutex<HashMap<i64, PendingSelection>>,
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl PendingStore for InMemoryPendingStore {
    async fn put(&self, selection: PendingSelection) -> Result<(), FeedbackBotError> {
        self.entries
            .lock()
            .await
            .insert(selection.telegram_user_id, selection);
        Ok(())
    }

    async fn get(
        &self,
        telegram_user_id: i64,
    ) -> Result<Option<PendingSelection>, FeedbackBotError> {
        Ok(self.entries.lock().await.get(&telegram_user_id).cloned())
    }

    async fn take(
        &self,
        telegram_user_id: i64,
    ) -> Result<Option<PendingSelection>, FeedbackBotError> {
        Ok(self.entries.lock().await.remove(&telegram_user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedbackbot_core::types::Language;

    fn selection(user: i64, text: &str) -> PendingSelection {
        PendingSelection {
            telegram_user_id: user,
            bot_id: 1,
            text: text.to_string(),
            admin_only: false,
            language: Language::En,
        }
    }

    #[tokio::test]
    async fn put_overwrites_previous_selection() {
        let store = InMemoryPendingStore::new();
        store.put(selection(1, "first")).await.unwrap();
        store.put(selection(1, "second")).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(1).await.unwrap().unwrap().text, "second");
    }

    #[tokio::test]
    async fn take_consumes_exactly_once() {
        let store = InMemoryPendingStore::new();
        store.put(selection(1, "hello")).await.unwrap();

        assert_eq!(store.take(1).await.unwrap().unwrap().text, "hello");
        assert!(store.take(1).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let store = InMemoryPendingStore::new();
        store.put(selection(1, "a")).await.unwrap();
        store.put(selection(2, "b")).await.unwrap();

        assert_eq!(store.take(2).await.unwrap().unwrap().text, "b");
        assert_eq!(store.get(1).await.unwrap().unwrap().text, "a");
    }
}
