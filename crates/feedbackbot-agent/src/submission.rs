// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback submission pipeline.
//!
//! Persists the record (member resolution and insert in one transaction),
//! optionally republishes it into the group, then confirms to the sender.
//! A failed republish never undoes the record; a failed insert aborts
//! before anything is sent.

use std::sync::Arc;

use feedbackbot_core::types::{FeedbackRecord, Group, Language, NewFeedback};
use feedbackbot_core::{FeedbackBotError, FeedbackStore, Messenger};
use tracing::{error, info, warn};

use crate::i18n::MessageKey;
use crate::metrics;
use crate::reply::send_localized;

const REPUBLISH_HEADER: &str = "📬 Anonymous Feedback:";

/// Text posted into a group for a republished item.
pub fn republished_text(message: &str) -> String {
    format!("{REPUBLISH_HEADER}\n\n{message}")
}

/// One validated submission ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest<'a> {
    /// Chat that receives the confirmation.
    pub reply_chat_id: i64,
    pub telegram_user_id: i64,
    pub text: &'a str,
    pub admin_only: bool,
    pub language: Language,
}

/// Result of a completed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub record: FeedbackRecord,
    pub republished: bool,
}

pub struct FeedbackPipeline {
    store: Arc<dyn FeedbackStore>,
}

impl FeedbackPipeline {
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self { store }
    }

    pub async fn submit<M>(
        &self,
        messenger: &M,
        group: &Group,
        request: SubmissionRequest<'_>,
    ) -> Result<Submission, FeedbackBotError>
    where
        M: Messenger + ?Sized,
    {
        let record = self
            .store
            .record_feedback(NewFeedback {
                tenant_id: group.tenant_id,
                group_id: group.id,
                telegram_user_id: request.telegram_user_id,
                message: request.text.to_string(),
                admin_only: request.admin_only,
            })
            .await?;
        metrics::record_feedback(record.admin_only);
        info!(
            feedback_id = record.id,
            group_id = group.id,
            admin_only = record.admin_only,
            "feedback recorded"
        );

        let republished = if record.admin_only {
            false
        } else {
            self.republish(messenger, group, &record).await?
        };

        let confirmation = if record.admin_only {
            MessageKey::FeedbackSentAdminOnly
        } else {
            MessageKey::FeedbackSent
        };
        send_localized(messenger, request.reply_chat_id, confirmation, request.language).await;

        Ok(Submission {
            record,
            republished,
        })
    }

    /// Posts the record into its group when the group's config asks for it.
    async fn republish<M>(
        &self,
        messenger: &M,
        group: &Group,
        record: &FeedbackRecord,
    ) -> Result<bool, FeedbackBotError>
    where
        M: Messenger + ?Sized,
    {
        let Some(config) = self.store.feedback_config(group.id).await? else {
            return Ok(false);
        };
        if !config.post_to_group {
            return Ok(false);
        }

        let text = republished_text(&record.message);
        let delivery = match config.target_thread() {
            Some(thread_id) => messenger.send_to_thread(group.chat_id, thread_id, &text).await,
            None => messenger.send_text(group.chat_id, &text).await,
        };
        if let Err(e) = delivery {
            warn!(
                error = %e,
                feedback_id = record.id,
                chat_id = group.chat_id,
                "failed to republish feedback (non-fatal)"
            );
            return Ok(false);
        }

        if let Err(e) = self.store.mark_posted(record.id).await {
            error!(error = %e, feedback_id = record.id, "failed to mark feedback as posted");
            return Ok(false);
        }
        metrics::record_republished();
        Ok(true)
    }
}
