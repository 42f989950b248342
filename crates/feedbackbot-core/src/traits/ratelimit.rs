// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user submission budget.

/// Decides whether an end-user may submit another feedback item.
///
/// Shared by every poller in the process, so implementations must be safe
/// under concurrent calls for the same user.
pub trait RateLimiter: Send + Sync {
    /// Returns `true` and records the attempt when the user is within budget.
    /// A rejection leaves the user's history untouched.
    fn check_and_record(&self, telegram_user_id: i64) -> bool;
}
