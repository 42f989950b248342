// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for FeedbackBot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level FeedbackBot configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackBotConfig {
    /// Process-level settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Telegram Bot API polling settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Message classification settings.
    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// Per-user submission budget.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Pending group-selection store.
    #[serde(default)]
    pub pending: PendingConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    "feedbackbot.db".to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Telegram Bot API polling configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Overrides the Bot API base URL (self-hosted API servers, tests).
    #[serde(default)]
    pub api_url: Option<String>,

    /// Server-side long-wait for `getUpdates`, in seconds.
    #[serde(default = "default_long_poll_timeout_secs")]
    pub long_poll_timeout_secs: u64,

    /// Wait after a failed fetch before retrying, in seconds.
    #[serde(default = "default_error_backoff_secs")]
    pub error_backoff_secs: u64,

    /// Wait after an empty batch before polling again, in seconds.
    #[serde(default = "default_idle_interval_secs")]
    pub idle_interval_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            long_poll_timeout_secs: default_long_poll_timeout_secs(),
            error_backoff_secs: default_error_backoff_secs(),
            idle_interval_secs: default_idle_interval_secs(),
        }
    }
}

fn default_long_poll_timeout_secs() -> u64 {
    30
}

fn default_error_backoff_secs() -> u64 {
    5
}

fn default_idle_interval_secs() -> u64 {
    1
}

/// Message classification configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackConfig {
    /// Command token marking a submission as admin-only.
    #[serde(default = "default_admin_only_command")]
    pub admin_only_command: String,

    /// Maximum feedback length in characters. `0` disables the check.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            admin_only_command: default_admin_only_command(),
            max_message_length: default_max_message_length(),
        }
    }
}

fn default_admin_only_command() -> String {
    "/adminOnly".to_string()
}

fn default_max_message_length() -> usize {
    4000
}

/// Sliding-window rate limit configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Maximum accepted submissions per user within one window.
    #[serde(default = "default_max_per_window")]
    pub max_per_window: u32,

    /// Window length in seconds.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: default_max_per_window(),
            window_secs: default_window_secs(),
        }
    }
}

fn default_max_per_window() -> u32 {
    10
}

fn default_window_secs() -> u64 {
    3600
}

/// Where undecided group selections are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PendingBackend {
    /// Process memory; lost on restart.
    Memory,
    /// The `pending_feedbacks` table; survives restarts.
    #[default]
    Sqlite,
}

/// Pending-selection store configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PendingConfig {
    #[serde(default)]
    pub backend: PendingBackend,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = FeedbackBotConfig::default();
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.storage.database_path, "feedbackbot.db");
        assert!(config.storage.wal_mode);
        assert!(config.telegram.api_url.is_none());
        assert_eq!(config.telegram.long_poll_timeout_secs, 30);
        assert_eq!(config.telegram.error_backoff_secs, 5);
        assert_eq!(config.telegram.idle_interval_secs, 1);
        assert_eq!(config.feedback.admin_only_command, "/adminOnly");
        assert_eq!(config.feedback.max_message_length, 4000);
        assert_eq!(config.rate_limit.max_per_window, 10);
        assert_eq!(config.rate_limit.window_secs, 3600);
        assert_eq!(config.pending.backend, PendingBackend::Sqlite);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: FeedbackBotConfig = toml::from_str("").unwrap();
        assert_eq!(config, FeedbackBotConfig::default());
    }

    #[test]
    fn pending_backend_parses_lowercase() {
        let config: FeedbackBotConfig = toml::from_str("[pending]\nbackend = \"memory\"\n").unwrap();
        assert_eq!(config.pending.backend, PendingBackend::Memory);
    }

    #[test]
    fn unknown_pending_backend_is_rejected() {
        let result = toml::from_str::<FeedbackBotConfig>("[pending]\nbackend = \"redis\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn sections_deny_unknown_fields() {
        let result = toml::from_str::<FeedbackBotConfig>("[rate_limit]\nmax_per_hour = 3\n");
        assert!(result.is_err());
    }
}
