// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for inbound events.

use feedbackbot_core::types::{
    ChatMessage, ChatType, InboundEvent, MemberStatus, MembershipChange, SelectionCallback,
};

/// The bot was added to a supergroup.
pub fn bot_added(chat_id: i64, title: &str) -> InboundEvent {
    membership(chat_id, title, ChatType::Supergroup, MemberStatus::Left, MemberStatus::Member)
}

/// The bot was removed from a supergroup.
pub fn bot_removed(chat_id: i64) -> InboundEvent {
    membership(chat_id, "", ChatType::Supergroup, MemberStatus::Member, MemberStatus::Kicked)
}

pub fn membership(
    chat_id: i64,
    title: &str,
    chat_type: ChatType,
    old_status: MemberStatus,
    new_status: MemberStatus,
) -> InboundEvent {
    InboundEvent::MembershipChanged(MembershipChange {
        chat_id,
        chat_title: (!title.is_empty()).then(|| title.to_string()),
        chat_type,
        changed_by: 1,
        old_status,
        new_status,
    })
}

/// A private text message; the private chat id equals the user id.
pub fn private_text(user_id: i64, text: &str) -> InboundEvent {
    private_text_in(user_id, text, None)
}

pub fn private_text_in(user_id: i64, text: &str, language_code: Option<&str>) -> InboundEvent {
    InboundEvent::Message(ChatMessage {
        chat_id: user_id,
        chat_type: ChatType::Private,
        sender_id: Some(user_id),
        language_code: language_code.map(str::to_string),
        text: Some(text.to_string()),
    })
}

/// A message posted inside a group chat.
pub fn group_text(chat_id: i64, user_id: i64, text: &str) -> InboundEvent {
    InboundEvent::Message(ChatMessage {
        chat_id,
        chat_type: ChatType::Supergroup,
        sender_id: Some(user_id),
        language_code: None,
        text: Some(text.to_string()),
    })
}

/// The user pressed an inline option carrying `data`.
pub fn selection(user_id: i64, data: &str) -> InboundEvent {
    InboundEvent::SelectionCallback(SelectionCallback {
        callback_id: format!("cb-{user_id}-{data}"),
        chat_id: Some(user_id),
        sender_id: user_id,
        language_code: None,
        data: Some(data.to_string()),
    })
}
