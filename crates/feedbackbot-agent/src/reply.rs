// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fire-and-forget outbound replies.

use feedbackbot_core::Messenger;
use feedbackbot_core::types::Language;
use tracing::warn;

use crate::i18n::{MessageKey, localize};

/// Sends a localized reply. Delivery failures are logged and swallowed.
pub async fn send_localized<M>(messenger: &M, chat_id: i64, key: MessageKey, lang: Language)
where
    M: Messenger + ?Sized,
{
    if let Err(e) = messenger.send_text(chat_id, localize(key, lang)).await {
        warn!(error = %e, chat_id, reply = ?key, "failed to send reply (non-fatal)");
    }
}
