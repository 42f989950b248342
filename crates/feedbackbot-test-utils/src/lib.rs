// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for FeedbackBot integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a live Bot API.
//!
//! # Components
//!
//! - [`MockTransport`] - Scripted inbound batches and captured outbound messages
//! - [`MockTransportFactory`] - One shared mock transport per bot
//! - [`TestHarness`] - Full pipeline over a temp SQLite database
//! - [`events`] - Inbound event builders

pub mod events;
pub mod harness;
pub mod mock_transport;

pub use harness::{FAST_POLLER, TestHarness};
pub use mock_transport::{MockTransport, MockTransportFactory, SentMessage};
