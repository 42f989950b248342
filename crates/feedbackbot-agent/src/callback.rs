// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completes a multi-group submission once the user picks a group.

use std::sync::Arc;

use feedbackbot_core::types::{Bot, Language, SelectionCallback};
use feedbackbot_core::{FeedbackBotError, FeedbackStore, Messenger, PendingStore};
use tracing::{debug, warn};

use crate::i18n::MessageKey;
use crate::reply::send_localized;
use crate::submission::{FeedbackPipeline, Submission, SubmissionRequest};

const SELECTION_PREFIX: &str = "fb:";

/// Option data identifying `group_id`.
pub fn selection_data(group_id: i64) -> String {
    format!("{SELECTION_PREFIX}{group_id}")
}

/// Group id from option data, or `None` for anything we did not issue.
pub fn parse_selection(data: &str) -> Option<i64> {
    data.strip_prefix(SELECTION_PREFIX)?.parse().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Not one of our selections; acknowledged only.
    Ignored,
    SessionExpired,
    GroupNotFound,
    Submitted(Submission),
}

pub struct CallbackHandler {
    store: Arc<dyn FeedbackStore>,
    pending: Arc<dyn PendingStore>,
    pipeline: Arc<FeedbackPipeline>,
}

impl CallbackHandler {
    pub fn new(
        store: Arc<dyn FeedbackStore>,
        pending: Arc<dyn PendingStore>,
        pipeline: Arc<FeedbackPipeline>,
    ) -> Self {
        Self {
            store,
            pending,
            pipeline,
        }
    }

    pub async fn handle<M>(
        &self,
        bot: &Bot,
        messenger: &M,
        callback: &SelectionCallback,
    ) -> Result<CallbackOutcome, FeedbackBotError>
    where
        M: Messenger + ?Sized,
    {
        // Clears the client's loading indicator whatever happens next.
        if let Err(e) = messenger.answer_callback(&callback.callback_id).await {
            warn!(error = %e, bot_id = bot.id, "failed to answer callback (non-fatal)");
        }

        let Some(data) = callback.data.as_deref() else {
            debug!(bot_id = bot.id, "callback without data");
            return Ok(CallbackOutcome::Ignored);
        };
        let Some(group_id) = parse_selection(data) else {
            debug!(bot_id = bot.id, data, "callback data is not a group selection");
            return Ok(CallbackOutcome::Ignored);
        };

        let reply_chat_id = callback.chat_id.unwrap_or(callback.sender_id);

        let pending = match self.pending.take(callback.sender_id).await? {
            Some(pending) if pending.bot_id == bot.id => pending,
            other => {
                // A selection made on another bot's keyboard must not consume it.
                if let Some(foreign) = other {
                    self.pending.put(foreign).await?;
                }
                let lang = Language::detect(callback.language_code.as_deref());
                send_localized(messenger, reply_chat_id, MessageKey::SessionExpired, lang).await;
                return Ok(CallbackOutcome::SessionExpired);
            }
        };

        let group = self
            .store
            .get_group(group_id)
            .await?
            .filter(|group| group.bot_id == bot.id);
        let Some(group) = group else {
            debug!(bot_id = bot.id, group_id, "selected group not found");
            send_localized(
                messenger,
                reply_chat_id,
                MessageKey::GroupNotFound,
                pending.language,
            )
            .await;
            return Ok(CallbackOutcome::GroupNotFound);
        };

        let submission = self
            .pipeline
            .submit(
                messenger,
                &group,
                SubmissionRequest {
                    reply_chat_id,
                    telegram_user_id: callback.sender_id,
                    text: &pending.text,
                    admin_only: pending.admin_only,
                    language: pending.language,
                },
            )
            .await?;
        Ok(CallbackOutcome::Submitted(submission))
    }
}
