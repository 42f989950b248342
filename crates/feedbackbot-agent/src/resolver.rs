// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Finds the group(s) a submission could be delivered to.

use std::sync::Arc;

use feedbackbot_core::types::Group;
use feedbackbot_core::{FeedbackBotError, FeedbackStore};

/// Active groups owned by the receiving bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupResolution {
    NoActiveGroups,
    Single(Group),
    /// More than one; the user must choose.
    Multiple(Vec<Group>),
}

pub struct GroupResolver {
    store: Arc<dyn FeedbackStore>,
}

impl GroupResolver {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, bot_id: i64) -> Result<GroupResolution, FeedbackBotError> {
        let mut groups = self.store.active_groups_for_bot(bot_id).await?;
        Ok(match groups.len() {
            0 => GroupResolution::NoActiveGroups,
            1 => match groups.pop() {
                Some(group) => GroupResolution::Single(group),
                None => GroupResolution::NoActiveGroups,
            },
            _ => GroupResolution::Multiple(groups),
        })
    }
}
