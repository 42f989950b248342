// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the FeedbackBot configuration system.

use feedbackbot_config::diagnostic::ConfigError;
use feedbackbot_config::model::PendingBackend;
use feedbackbot_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use figment::Jail;
use serial_test::serial;

#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[agent]
log_level = "debug"

[storage]
database_path = "/tmp/feedback.db"
wal_mode = false

[telegram]
api_url = "http://localhost:8081"
long_poll_timeout_secs = 10
error_backoff_secs = 2
idle_interval_secs = 0

[feedback]
admin_only_command = "/private"
max_message_length = 0

[rate_limit]
max_per_window = 3
window_secs = 60

[pending]
backend = "memory"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/feedback.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(
        config.telegram.api_url.as_deref(),
        Some("http://localhost:8081")
    );
    assert_eq!(config.telegram.long_poll_timeout_secs, 10);
    assert_eq!(config.telegram.error_backoff_secs, 2);
    assert_eq!(config.telegram.idle_interval_secs, 0);
    assert_eq!(config.feedback.admin_only_command, "/private");
    assert_eq!(config.feedback.max_message_length, 0);
    assert_eq!(config.rate_limit.max_per_window, 3);
    assert_eq!(config.rate_limit.window_secs, 60);
    assert_eq!(config.pending.backend, PendingBackend::Memory);
}

#[test]
fn unknown_key_gets_suggestion() {
    let toml = r#"
[rate_limit]
max_per_windw = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let suggested = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion: Some(s), .. }
                if key == "max_per_windw" && s == "max_per_window"
        )
    });
    assert!(suggested, "expected a suggestion, got: {errors:?}");
}

#[test]
fn unknown_top_level_section_is_rejected() {
    let errors = load_and_validate_str("[anthropic]\napi_key = \"x\"\n")
        .expect_err("unknown section should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "anthropic"))
    );
}

#[test]
fn invalid_type_is_reported() {
    let errors = load_and_validate_str("[rate_limit]\nmax_per_window = \"ten\"\n")
        .expect_err("string where number expected");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. } | ConfigError::Other(_))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_runs_after_parsing() {
    let errors = load_and_validate_str("[telegram]\nlong_poll_timeout_secs = 90\n")
        .expect_err("timeout above the Bot API maximum");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("long_poll_timeout_secs"))
    }));
}

#[test]
fn unknown_key_renders_with_miette() {
    use miette::GraphicalReportHandler;

    let error = ConfigError::UnknownKey {
        key: "wal_mod".to_string(),
        suggestion: Some("wal_mode".to_string()),
        valid_keys: "database_path, wal_mode".to_string(),
        span: None,
        src: None,
    };

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("wal_mod"));
    assert!(buf.contains("did you mean `wal_mode`"));
}

#[test]
#[serial]
fn env_vars_override_files() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "feedbackbot.toml",
            r#"
[rate_limit]
max_per_window = 5

[pending]
backend = "memory"
"#,
        )?;
        jail.set_env("FEEDBACKBOT_RATE_LIMIT_MAX_PER_WINDOW", "2");
        jail.set_env("FEEDBACKBOT_FEEDBACK_ADMIN_ONLY_COMMAND", "/secret");

        let config = load_and_validate_path(std::path::Path::new("feedbackbot.toml"))
            .map_err(|errors| format!("{errors:?}"))?;
        assert_eq!(config.rate_limit.max_per_window, 2);
        assert_eq!(config.feedback.admin_only_command, "/secret");
        assert_eq!(config.pending.backend, PendingBackend::Memory);
        Ok(())
    });
}

#[test]
#[serial]
fn local_file_is_picked_up_by_default_loader() {
    Jail::expect_with(|jail| {
        jail.create_file("feedbackbot.toml", "[storage]\ndatabase_path = \"jail.db\"\n")?;
        let config = feedbackbot_config::load_and_validate()
            .map_err(|errors| format!("{errors:?}"))?;
        assert_eq!(config.storage.database_path, "jail.db");
        Ok(())
    });
}

#[test]
#[serial]
fn invalid_env_value_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("FEEDBACKBOT_TELEGRAM_ERROR_BACKOFF_SECS", "0");
        let errors = feedbackbot_config::load_and_validate()
            .expect_err("zero backoff must be rejected");
        assert!(errors.iter().any(|e| {
            matches!(e, ConfigError::Validation { message } if message.contains("error_backoff_secs"))
        }));
        Ok(())
    });
}
