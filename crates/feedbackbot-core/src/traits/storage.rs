// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence trait for the feedback data model.

use async_trait::async_trait;

use crate::error::FeedbackBotError;
use crate::types::{
    Bot, FeedbackConfig, FeedbackRecord, Group, GroupMember, GroupUpsert, NewFeedback, NewGroup,
};

/// Read and write access to bots, groups, members and feedback records.
///
/// Implementations must serialize concurrent writers per row; the uniqueness
/// constraints (one group per chat, one member per group and user) are
/// enforced by the store, not by callers.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    /// All bots whose token has been verified.
    async fn verified_bots(&self) -> Result<Vec<Bot>, FeedbackBotError>;

    async fn get_bot(&self, id: i64) -> Result<Option<Bot>, FeedbackBotError>;

    async fn get_group(&self, id: i64) -> Result<Option<Group>, FeedbackBotError>;

    async fn get_group_by_chat_id(&self, chat_id: i64) -> Result<Option<Group>, FeedbackBotError>;

    /// Active groups owned by `bot_id`, oldest first.
    async fn active_groups_for_bot(&self, bot_id: i64) -> Result<Vec<Group>, FeedbackBotError>;

    /// Creates the group with a default feedback config, or reactivates the
    /// existing one for the chat and refreshes its title and kind. The owning
    /// bot and tenant never change after creation.
    async fn upsert_active_group(&self, group: NewGroup) -> Result<GroupUpsert, FeedbackBotError>;

    /// Marks the chat's group inactive if `bot_id` owns it.
    ///
    /// Returns `true` when an active group was deactivated.
    async fn deactivate_group(&self, bot_id: i64, chat_id: i64) -> Result<bool, FeedbackBotError>;

    async fn feedback_config(
        &self,
        group_id: i64,
    ) -> Result<Option<FeedbackConfig>, FeedbackBotError>;

    /// Looks up the member by (group, user), creating it when absent.
    async fn find_or_create_member(
        &self,
        tenant_id: i64,
        group_id: i64,
        telegram_user_id: i64,
    ) -> Result<GroupMember, FeedbackBotError>;

    /// Resolves the sender and inserts the record as one unit of work.
    async fn record_feedback(
        &self,
        feedback: NewFeedback,
    ) -> Result<FeedbackRecord, FeedbackBotError>;

    /// Sets the republished flag on a record.
    async fn mark_posted(&self, feedback_id: i64) -> Result<(), FeedbackBotError>;
}
