// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.

pub mod adapter;
pub mod pending;
pub mod ratelimit;
pub mod storage;
pub mod transport;

pub use adapter::PluginAdapter;
pub use pending::PendingStore;
pub use ratelimit::RateLimiter;
pub use storage::FeedbackStore;
pub use transport::{BotTransport, Messenger, TransportFactory, UpdateSource};
