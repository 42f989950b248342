// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for FeedbackBot.
//!
//! This crate provides the error type, the domain model and the adapter
//! traits that the storage, transport and agent crates implement or consume.

pub mod error;
pub mod traits;
pub mod types;

pub use error::FeedbackBotError;
pub use types::{
    AdapterType, Bot, ChatMessage, ChatType, FeedbackConfig, FeedbackRecord, Group, GroupMember,
    GroupUpsert, HealthStatus, InboundEvent, InboundUpdate, InlineOption, Language,
    MemberStatus, MembershipChange, NewFeedback, NewGroup, PendingSelection, SelectionCallback,
    Tenant,
};

pub use traits::{
    BotTransport, FeedbackStore, Messenger, PendingStore, PluginAdapter, RateLimiter,
    TransportFactory, UpdateSource,
};
