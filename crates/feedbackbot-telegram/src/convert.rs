// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of teloxide updates into [`InboundUpdate`]s.

use feedbackbot_core::types::{
    ChatMessage, ChatType, InboundEvent, InboundUpdate, MemberStatus, MembershipChange,
    SelectionCallback,
};
use teloxide::types::{
    CallbackQuery, Chat, ChatMember, ChatMemberStatus, ChatMemberUpdated, Message, Update,
    UpdateKind, User,
};
use tracing::debug;

/// Converts one Bot API update into the dispatcher's event union.
///
/// Kinds the pipeline does not handle become [`InboundEvent::Unsupported`]
/// so the poller still advances its cursor past them.
pub fn convert_update(update: Update) -> InboundUpdate {
    let update_id = i64::from(update.id.0);
    let event = match update.kind {
        UpdateKind::MyChatMember(change) => InboundEvent::MembershipChanged(membership(&change)),
        UpdateKind::Message(msg) => InboundEvent::Message(message(&msg)),
        UpdateKind::CallbackQuery(query) => InboundEvent::SelectionCallback(callback(&query)),
        _ => {
            debug!(update_id, "unsupported update kind");
            InboundEvent::Unsupported
        }
    };
    InboundUpdate { update_id, event }
}

pub fn chat_type(chat: &Chat) -> ChatType {
    if chat.is_private() {
        ChatType::Private
    } else if chat.is_supergroup() {
        ChatType::Supergroup
    } else if chat.is_group() {
        ChatType::Group
    } else {
        ChatType::Channel
    }
}

fn member_status(member: &ChatMember) -> MemberStatus {
    match member.kind.status() {
        ChatMemberStatus::Owner => MemberStatus::Owner,
        ChatMemberStatus::Administrator => MemberStatus::Administrator,
        ChatMemberStatus::Member => MemberStatus::Member,
        ChatMemberStatus::Restricted => MemberStatus::Restricted,
        ChatMemberStatus::Left => MemberStatus::Left,
        ChatMemberStatus::Banned => MemberStatus::Kicked,
    }
}

fn user_id(user: &User) -> i64 {
    // Bot API user ids fit in 52 bits.
    user.id.0 as i64
}

fn membership(change: &ChatMemberUpdated) -> MembershipChange {
    MembershipChange {
        chat_id: change.chat.id.0,
        chat_title: change.chat.title().map(str::to_owned),
        chat_type: chat_type(&change.chat),
        changed_by: user_id(&change.from),
        old_status: member_status(&change.old_chat_member),
        new_status: member_status(&change.new_chat_member),
    }
}

fn message(msg: &Message) -> ChatMessage {
    ChatMessage {
        chat_id: msg.chat.id.0,
        chat_type: chat_type(&msg.chat),
        sender_id: msg.from.as_ref().map(user_id),
        language_code: msg.from.as_ref().and_then(|u| u.language_code.clone()),
        text: msg.text().map(str::to_owned),
    }
}

fn callback(query: &CallbackQuery) -> SelectionCallback {
    SelectionCallback {
        callback_id: query.id.0.clone(),
        chat_id: query.message.as_ref().map(|m| m.chat().id.0),
        sender_id: user_id(&query.from),
        language_code: query.from.language_code.clone(),
        data: query.data.clone(),
    }
}
