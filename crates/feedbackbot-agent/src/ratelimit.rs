// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide sliding-window submission limiter.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use feedbackbot_config::model::RateLimitConfig;
use feedbackbot_core::RateLimiter;

/// Per-user sliding window of accepted submission times.
///
/// One instance is shared by every poller, so the budget is global per
/// end-user rather than per bot or per group. Users whose window has fully
/// elapsed are dropped, at most once per window length.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    max: usize,
    window: Duration,
    state: Mutex<WindowState>,
}

#[derive(Debug, Default)]
struct WindowState {
    windows: HashMap<i64, VecDeque<Instant>>,
    last_sweep: Option<Instant>,
}

impl WindowState {
    /// Drops every user with no submission after `cutoff`.
    fn sweep(&mut self, cutoff: Instant, now: Instant) {
        self.windows
            .retain(|_, entries| entries.back().is_some_and(|t| *t > cutoff));
        self.last_sweep = Some(now);
    }

    fn sweep_due(&self, now: Instant, window: Duration) -> bool {
        self.last_sweep
            .is_none_or(|last| now.saturating_duration_since(last) >= window)
    }
}

impl SlidingWindowLimiter {
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max: max as usize,
            window,
            state: Mutex::new(WindowState::default()),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_per_window, Duration::from_secs(config.window_secs))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, WindowState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Check-and-record at an explicit instant.
    pub fn check_at(&self, telegram_user_id: i64, now: Instant) -> bool {
        let mut state = self.lock();

        // `checked_sub` fails only when the process is younger than the window.
        let cutoff = now.checked_sub(self.window);
        if let Some(cutoff) = cutoff {
            if state.sweep_due(now, self.window) {
                state.sweep(cutoff, now);
            }
        }

        let entries = state.windows.entry(telegram_user_id).or_default();
        if let Some(cutoff) = cutoff {
            while entries.front().is_some_and(|t| *t <= cutoff) {
                entries.pop_front();
            }
        }

        if entries.len() >= self.max {
            if entries.is_empty() {
                state.windows.remove(&telegram_user_id);
            }
            return false;
        }
        entries.push_back(now);
        true
    }

    /// Number of submissions currently counted for the user.
    pub fn recorded(&self, telegram_user_id: i64) -> usize {
        self.lock()
            .windows
            .get(&telegram_user_id)
            .map_or(0, VecDeque::len)
    }

    /// Number of users currently holding a window entry.
    pub fn tracked_users(&self) -> usize {
        self.lock().windows.len()
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn check_and_record(&self, telegram_user_id: i64) -> bool {
        self.check_at(telegram_user_id, Instant::now())
    }
}
