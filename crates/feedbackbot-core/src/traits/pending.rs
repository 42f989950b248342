// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store for undecided multi-group submissions.

use async_trait::async_trait;

use crate::error::FeedbackBotError;
use crate::types::PendingSelection;

/// Holds at most one [`PendingSelection`] per end-user.
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// Stores the selection, replacing any earlier one for the same user.
    async fn put(&self, selection: PendingSelection) -> Result<(), FeedbackBotError>;

    /// Reads the user's selection without consuming it.
    async fn get(&self, telegram_user_id: i64)
    -> Result<Option<PendingSelection>, FeedbackBotError>;

    /// Reads and deletes the user's selection in one step.
    async fn take(
        &self,
        telegram_user_id: i64,
    ) -> Result<Option<PendingSelection>, FeedbackBotError>;
}
