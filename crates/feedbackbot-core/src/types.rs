// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model and inbound event types shared across FeedbackBot crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by an adapter's health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a [`crate::PluginAdapter`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Transport,
    Storage,
}

// --- Persisted model ---

/// A tenant organization owning one or more bots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A registered agent identity ("bot") belonging to exactly one tenant.
#[derive(Clone, PartialEq, Eq)]
pub struct Bot {
    pub id: i64,
    pub tenant_id: i64,
    pub token: String,
    pub username: String,
    pub name: String,
    pub verified: bool,
}

// The token is a credential; keep it out of logs.
impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("id", &self.id)
            .field("tenant_id", &self.tenant_id)
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("name", &self.name)
            .field("verified", &self.verified)
            .finish()
    }
}

/// Kind of chat as reported by the messaging provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
}

impl ChatType {
    /// Only plain groups and supergroups can host feedback.
    pub fn is_group_like(self) -> bool {
        matches!(self, Self::Group | Self::Supergroup)
    }
}

/// One chat the bot has been added to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub tenant_id: i64,
    pub bot_id: i64,
    pub chat_id: i64,
    pub title: String,
    pub chat_type: ChatType,
    pub is_active: bool,
}

/// Input for creating or reactivating a group on a membership-add event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGroup {
    pub tenant_id: i64,
    pub bot_id: i64,
    pub chat_id: i64,
    pub title: String,
    pub chat_type: ChatType,
}

/// Result of applying a membership-add to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupUpsert {
    /// A new group row and its default feedback config were inserted.
    Created(Group),
    /// An existing group was set active and its title/kind refreshed.
    Reactivated(Group),
}

impl GroupUpsert {
    pub fn group(&self) -> &Group {
        match self {
            Self::Created(g) | Self::Reactivated(g) => g,
        }
    }
}

/// Per-group republishing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackConfig {
    pub group_id: i64,
    pub post_to_group: bool,
    pub forum_topic_id: Option<i32>,
}

impl FeedbackConfig {
    /// The sub-thread to republish into, if one is configured and positive.
    pub fn target_thread(&self) -> Option<i32> {
        self.forum_topic_id.filter(|id| *id > 0)
    }
}

/// An end-user as seen inside one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    pub id: i64,
    pub tenant_id: i64,
    pub group_id: i64,
    pub telegram_user_id: i64,
}

/// One persisted feedback submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    pub id: i64,
    pub tenant_id: i64,
    pub group_id: i64,
    pub sender_id: i64,
    pub message: String,
    pub admin_only: bool,
    pub posted: bool,
    pub created_at: String,
}

/// Input for recording a feedback item. The sender is resolved to a
/// [`GroupMember`] inside the same transaction as the insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub tenant_id: i64,
    pub group_id: i64,
    pub telegram_user_id: i64,
    pub message: String,
    pub admin_only: bool,
}

/// An undecided multi-group submission awaiting the user's choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub telegram_user_id: i64,
    pub bot_id: i64,
    pub text: String,
    pub admin_only: bool,
    pub language: Language,
}

/// Languages with a reply catalog.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
    Uz,
}

impl Language {
    /// Maps a provider language code (`"ru"`, `"ru-RU"`, `"uz"`) to a catalog
    /// language, considering only the primary subtag.
    pub fn detect(code: Option<&str>) -> Self {
        let Some(code) = code else {
            return Self::En;
        };
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "ru" => Self::Ru,
            "uz" => Self::Uz,
            _ => Self::En,
        }
    }
}

// --- Inbound events ---

/// Membership status of the bot in a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MemberStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// Statuses that make a group usable for feedback.
    pub fn is_present(self) -> bool {
        matches!(self, Self::Member | Self::Administrator)
    }

    /// Statuses that retire a group.
    pub fn is_removed(self) -> bool {
        matches!(self, Self::Left | Self::Kicked)
    }
}

/// The bot's membership in a chat changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipChange {
    pub chat_id: i64,
    pub chat_title: Option<String>,
    pub chat_type: ChatType,
    pub changed_by: i64,
    pub old_status: MemberStatus,
    pub new_status: MemberStatus,
}

/// A text-bearing message received in some chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub chat_id: i64,
    pub chat_type: ChatType,
    pub sender_id: Option<i64>,
    pub language_code: Option<String>,
    pub text: Option<String>,
}

/// An end-user pressed an inline option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionCallback {
    pub callback_id: String,
    /// Chat of the message carrying the options, when the provider still has it.
    pub chat_id: Option<i64>,
    pub sender_id: i64,
    pub language_code: Option<String>,
    pub data: Option<String>,
}

/// Tagged union over the inbound event kinds the dispatcher understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    MembershipChanged(MembershipChange),
    Message(ChatMessage),
    SelectionCallback(SelectionCallback),
    /// Any other update kind; dropped by the dispatcher.
    Unsupported,
}

/// One event fetched from the provider, with its stream position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub event: InboundEvent,
}

/// One selectable option attached to an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineOption {
    pub label: String,
    pub data: String,
}
