// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracks which chats a bot currently serves.
//!
//! Each chat moves between two states, inactive-or-absent and active,
//! driven only by the bot's own membership status. Title and chat kind are
//! refreshed on the add transition.

use std::sync::Arc;

use feedbackbot_core::types::{Bot, Group, GroupUpsert, MembershipChange, NewGroup};
use feedbackbot_core::{FeedbackBotError, FeedbackStore};
use tracing::{debug, info};

/// What a membership event did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipOutcome {
    /// First time the bot joined this chat.
    Created(Group),
    /// The bot re-joined a known chat.
    Reactivated(Group),
    /// The bot left or was removed.
    Deactivated,
    /// Non-group chat, intermediate status, or a removal with nothing to change.
    Ignored,
}

pub struct MembershipTracker {
    store: Arc<dyn FeedbackStore>,
}

impl MembershipTracker {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    /// Applies one membership change reported to `bot`.
    pub async fn apply(
        &self,
        bot: &Bot,
        change: &MembershipChange,
    ) -> Result<MembershipOutcome, FeedbackBotError> {
        if !change.chat_type.is_group_like() {
            debug!(
                bot_id = bot.id,
                chat_id = change.chat_id,
                chat_type = %change.chat_type,
                "ignoring membership change outside a group"
            );
            return Ok(MembershipOutcome::Ignored);
        }

        if change.new_status.is_present() {
            let upsert = self
                .store
                .upsert_active_group(NewGroup {
                    tenant_id: bot.tenant_id,
                    bot_id: bot.id,
                    chat_id: change.chat_id,
                    title: change.chat_title.clone().unwrap_or_default(),
                    chat_type: change.chat_type,
                })
                .await?;

            return Ok(match upsert {
                GroupUpsert::Created(group) => {
                    info!(
                        bot_id = bot.id,
                        group_id = group.id,
                        chat_id = group.chat_id,
                        title = %group.title,
                        "bot added to new group"
                    );
                    MembershipOutcome::Created(group)
                }
                GroupUpsert::Reactivated(group) => {
                    info!(
                        bot_id = bot.id,
                        group_id = group.id,
                        chat_id = group.chat_id,
                        "bot re-added to group"
                    );
                    MembershipOutcome::Reactivated(group)
                }
            });
        }

        if change.new_status.is_removed() {
            if self.store.deactivate_group(bot.id, change.chat_id).await? {
                info!(
                    bot_id = bot.id,
                    chat_id = change.chat_id,
                    status = %change.new_status,
                    "bot removed from group"
                );
                return Ok(MembershipOutcome::Deactivated);
            }
            debug!(
                bot_id = bot.id,
                chat_id = change.chat_id,
                "removal for unknown or inactive group"
            );
            return Ok(MembershipOutcome::Ignored);
        }

        debug!(
            bot_id = bot.id,
            chat_id = change.chat_id,
            status = %change.new_status,
            "membership status does not change group state"
        );
        Ok(MembershipOutcome::Ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use feedbackbot_core::types::{ChatType, MemberStatus};

    fn change(chat_id: i64, chat_type: ChatType, new_status: MemberStatus) -> MembershipChange {
        MembershipChange {
            chat_id,
            chat_title: Some("Team".into()),
            chat_type,
            changed_by: 42,
            old_status: MemberStatus::Left,
            new_status,
        }
    }

    #[tokio::test]
    async fn add_creates_group_with_default_config() {
        let (store, _dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        let tracker = MembershipTracker::new(store.clone());

        let outcome = tracker
            .apply(&bot, &change(-100, ChatType::Supergroup, MemberStatus::Member))
            .await
            .unwrap();
        let MembershipOutcome::Created(group) = outcome else {
            panic!("expected Created, got {outcome:?}");
        };
        assert!(group.is_active);
        assert_eq!(group.bot_id, bot.id);

        let config = store.feedback_config(group.id).await.unwrap().unwrap();
        assert!(!config.post_to_group);
    }

    #[tokio::test]
    async fn re_add_refreshes_instead_of_duplicating() {
        let (store, _dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        let tracker = MembershipTracker::new(store.clone());

        tracker
            .apply(&bot, &change(-100, ChatType::Group, MemberStatus::Member))
            .await
            .unwrap();
        let mut renamed = change(-100, ChatType::Supergroup, MemberStatus::Administrator);
        renamed.chat_title = Some("Renamed".into());
        let outcome = tracker.apply(&bot, &renamed).await.unwrap();

        let MembershipOutcome::Reactivated(group) = outcome else {
            panic!("expected Reactivated, got {outcome:?}");
        };
        assert_eq!(group.title, "Renamed");
        assert_eq!(group.chat_type, ChatType::Supergroup);
        assert_eq!(store.active_groups_for_bot(bot.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removal_is_idempotent() {
        let (store, _dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        let tracker = MembershipTracker::new(store.clone());

        tracker
            .apply(&bot, &change(-100, ChatType::Group, MemberStatus::Member))
            .await
            .unwrap();
        let first = tracker
            .apply(&bot, &change(-100, ChatType::Group, MemberStatus::Kicked))
            .await
            .unwrap();
        let second = tracker
            .apply(&bot, &change(-100, ChatType::Group, MemberStatus::Left))
            .await
            .unwrap();

        assert_eq!(first, MembershipOutcome::Deactivated);
        assert_eq!(second, MembershipOutcome::Ignored);
        let group = store.get_group_by_chat_id(-100).await.unwrap().unwrap();
        assert!(!group.is_active);
    }

    #[tokio::test]
    async fn private_chat_is_ignored() {
        let (store, _dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        let tracker = MembershipTracker::new(store.clone());

        let outcome = tracker
            .apply(&bot, &change(555, ChatType::Private, MemberStatus::Member))
            .await
            .unwrap();
        assert_eq!(outcome, MembershipOutcome::Ignored);
        assert!(store.get_group_by_chat_id(555).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn removal_by_other_bot_leaves_group_active() {
        let (store, _dir) = testing::store().await;
        let owner = testing::seed_bot(&store, "acme").await;
        let other = testing::seed_bot(&store, "globex").await;
        let tracker = MembershipTracker::new(store.clone());

        tracker
            .apply(&owner, &change(-100, ChatType::Group, MemberStatus::Member))
            .await
            .unwrap();
        let outcome = tracker
            .apply(&other, &change(-100, ChatType::Group, MemberStatus::Left))
            .await
            .unwrap();

        assert_eq!(outcome, MembershipOutcome::Ignored);
        assert!(store.get_group_by_chat_id(-100).await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn re_add_by_other_bot_keeps_original_owner() {
        let (store, _dir) = testing::store().await;
        let owner = testing::seed_bot(&store, "acme").await;
        let other = testing::seed_bot(&store, "globex").await;
        let tracker = MembershipTracker::new(store.clone());

        tracker
            .apply(&owner, &change(-100, ChatType::Group, MemberStatus::Member))
            .await
            .unwrap();
        let outcome = tracker
            .apply(&other, &change(-100, ChatType::Group, MemberStatus::Member))
            .await
            .unwrap();

        let MembershipOutcome::Reactivated(group) = outcome else {
            panic!("expected Reactivated, got {outcome:?}");
        };
        assert_eq!(group.bot_id, owner.id);
        assert_eq!(group.tenant_id, owner.tenant_id);

        let stored = store.get_group_by_chat_id(-100).await.unwrap().unwrap();
        assert_eq!(stored.bot_id, owner.id);
        assert_eq!(stored.tenant_id, owner.tenant_id);
        assert_eq!(store.active_groups_for_bot(owner.id).await.unwrap().len(), 1);
        assert!(store.active_groups_for_bot(other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn restricted_status_changes_nothing() {
        let (store, _dir) = testing::store().await;
        let bot = testing::seed_bot(&store, "acme").await;
        let tracker = MembershipTracker::new(store.clone());

        let outcome = tracker
            .apply(&bot, &change(-100, ChatType::Group, MemberStatus::Restricted))
            .await
            .unwrap();
        assert_eq!(outcome, MembershipOutcome::Ignored);
        assert!(store.get_group_by_chat_id(-100).await.unwrap().is_none());
    }
}
