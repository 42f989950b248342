// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Recorded through the metrics-rs facade; without an installed recorder
//! every call is a no-op.

use metrics::describe_counter;

/// Register all FeedbackBot metric descriptions.
pub fn register_metrics() {
    describe_counter!("feedbackbot_feedback_total", "Feedback items recorded");
    describe_counter!(
        "feedbackbot_feedback_republished_total",
        "Feedback items posted back into their group"
    );
    describe_counter!(
        "feedbackbot_poll_errors_total",
        "Failed or undecodable update fetches"
    );
    describe_counter!(
        "feedbackbot_event_failures_total",
        "Inbound events whose processing failed"
    );
}

/// Record a persisted feedback item.
pub fn record_feedback(admin_only: bool) {
    metrics::counter!("feedbackbot_feedback_total", "admin_only" => admin_only.to_string())
        .increment(1);
}

/// Record a successful republish.
pub fn record_republished() {
    metrics::counter!("feedbackbot_feedback_republished_total").increment(1);
}

/// Record a fetch failure for one bot's poller.
pub fn record_poll_error(bot_id: i64) {
    metrics::counter!("feedbackbot_poll_errors_total", "bot_id" => bot_id.to_string())
        .increment(1);
}

/// Record an event dropped by the dispatcher's error boundary.
pub fn record_event_failure() {
    metrics::counter!("feedbackbot_event_failures_total").increment(1);
}
