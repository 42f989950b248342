// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the FeedbackBot data model.

pub mod bots;
pub mod feedback;
pub mod groups;
pub mod members;
pub mod pending;
pub mod tenants;
