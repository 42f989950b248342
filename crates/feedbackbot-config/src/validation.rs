// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::FeedbackBotConfig;

/// Upper bound the Bot API accepts for `getUpdates` timeouts.
const MAX_LONG_POLL_TIMEOUT_SECS: u64 = 50;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing on the first one.
pub fn validate_config(config: &FeedbackBotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.rate_limit.max_per_window == 0 {
        fail("rate_limit.max_per_window must be at least 1".to_string());
    }

    if config.rate_limit.window_secs == 0 {
        fail("rate_limit.window_secs must be at least 1".to_string());
    }

    let timeout = config.telegram.long_poll_timeout_secs;
    if timeout > MAX_LONG_POLL_TIMEOUT_SECS {
        fail(format!(
            "telegram.long_poll_timeout_secs must be at most {MAX_LONG_POLL_TIMEOUT_SECS}, got {timeout}"
        ));
    }

    if config.telegram.error_backoff_secs == 0 {
        fail("telegram.error_backoff_secs must be at least 1".to_string());
    }

    let command = &config.feedback.admin_only_command;
    if !command.starts_with('/') || command.len() < 2 {
        fail(format!(
            "feedback.admin_only_command must be a `/` command, got `{command}`"
        ));
    }
    if command.chars().any(char::is_whitespace) {
        fail(format!(
            "feedback.admin_only_command must not contain whitespace, got `{command}`"
        ));
    }

    if let Some(url) = &config.telegram.api_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        fail(format!(
            "telegram.api_url must start with http:// or https://, got `{url}`"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &FeedbackBotConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&FeedbackBotConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = FeedbackBotConfig::default();
        config.storage.database_path = "  ".to_string();
        assert!(messages(&config)[0].contains("database_path"));
    }

    #[test]
    fn zero_rate_limit_values_fail() {
        let mut config = FeedbackBotConfig::default();
        config.rate_limit.max_per_window = 0;
        config.rate_limit.window_secs = 0;
        let msgs = messages(&config);
        assert_eq!(msgs.len(), 2);
        assert!(msgs.iter().any(|m| m.contains("max_per_window")));
        assert!(msgs.iter().any(|m| m.contains("window_secs")));
    }

    #[test]
    fn long_poll_timeout_is_capped() {
        let mut config = FeedbackBotConfig::default();
        config.telegram.long_poll_timeout_secs = 50;
        assert!(validate_config(&config).is_ok());
        config.telegram.long_poll_timeout_secs = 51;
        assert!(messages(&config)[0].contains("long_poll_timeout_secs"));
    }

    #[test]
    fn zero_backoff_fails() {
        let mut config = FeedbackBotConfig::default();
        config.telegram.error_backoff_secs = 0;
        assert!(messages(&config)[0].contains("error_backoff_secs"));
    }

    #[test]
    fn admin_only_command_must_be_a_command() {
        let mut config = FeedbackBotConfig::default();
        config.feedback.admin_only_command = "adminOnly".to_string();
        assert!(messages(&config)[0].contains("admin_only_command"));

        config.feedback.admin_only_command = "/admin only".to_string();
        assert!(messages(&config)[0].contains("whitespace"));
    }

    #[test]
    fn api_url_needs_http_scheme() {
        let mut config = FeedbackBotConfig::default();
        config.telegram.api_url = Some("api.telegram.org".to_string());
        assert!(messages(&config)[0].contains("api_url"));

        config.telegram.api_url = Some("http://localhost:8081".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = FeedbackBotConfig::default();
        config.storage.database_path.clear();
        config.telegram.error_backoff_secs = 0;
        config.telegram.api_url = Some("ftp://x".to_string());
        assert_eq!(messages(&config).len(), 3);
    }
}
