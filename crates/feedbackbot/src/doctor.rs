// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `feedbackbot doctor` command implementation.
//!
//! Checks the configuration, the database and every verified bot token,
//! printing one line per check.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use feedbackbot_config::FeedbackBotConfig;
use feedbackbot_config::model::TelegramConfig;
use feedbackbot_core::types::{Bot, HealthStatus};
use feedbackbot_core::{FeedbackBotError, FeedbackStore, PluginAdapter};
use feedbackbot_storage::SqliteStore;
use feedbackbot_telegram::TelegramTransport;

/// Status of a diagnostic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: impl Into<String>, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `feedbackbot doctor` command. Returns the number of failed checks.
pub async fn run_doctor(
    config: &FeedbackBotConfig,
    config_path: Option<&Path>,
    plain: bool,
) -> Result<usize, FeedbackBotError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let mut results = vec![check_config(config_path)];

    let (database, store) = check_database(&config.storage.database_path).await;
    results.push(database);
    if let Some(store) = store {
        let (bots_check, bots) = check_verified_bots(&store).await;
        results.push(bots_check);
        for bot in &bots {
            results.push(check_bot_token(bot, &config.telegram).await);
        }
        store.shutdown().await?;
    }

    println!();
    println!("  feedbackbot doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", render_line(result, use_color));
    }
    println!();

    let failures = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    let warnings = results
        .iter()
        .filter(|r| r.status == CheckStatus::Warn)
        .count();
    match failures + warnings {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
    println!();

    Ok(failures)
}

fn render_line(result: &CheckResult, use_color: bool) -> String {
    let duration_ms = result.duration.as_millis();
    if !use_color {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => "[WARN]",
            CheckStatus::Fail => "[FAIL]",
        };
        return format!(
            "    {tag} {:<20} {} ({duration_ms}ms)",
            result.name, result.message
        );
    }

    use colored::Colorize;
    let (symbol, message) = match result.status {
        CheckStatus::Pass => ("✓".green(), result.message.normal()),
        CheckStatus::Warn => ("!".yellow(), result.message.yellow()),
        CheckStatus::Fail => ("✗".red(), result.message.red()),
    };
    format!(
        "    {symbol} {:<20} {message} ({duration_ms}ms)",
        result.name
    )
}

/// Check configuration loads without errors.
fn check_config(config_path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let loaded = match config_path {
        Some(path) => feedbackbot_config::load_and_validate_path(path),
        None => feedbackbot_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Check the database exists, opens, migrates and answers a query.
async fn check_database(db_path: &str) -> (CheckResult, Option<SqliteStore>) {
    let start = Instant::now();
    if !Path::new(db_path).exists() {
        return (
            CheckResult::new(
                "Database",
                CheckStatus::Warn,
                format!("not found: {db_path} (will be created on first run)"),
                start,
            ),
            None,
        );
    }

    let store = SqliteStore::new(feedbackbot_config::model::StorageConfig {
        database_path: db_path.to_string(),
        wal_mode: true,
    });
    if let Err(e) = store.initialize().await {
        return (
            CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start),
            None,
        );
    }

    let result = match store.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new("Database", CheckStatus::Pass, "connected", start),
        Ok(HealthStatus::Degraded(msg)) => CheckResult::new("Database", CheckStatus::Warn, msg, start),
        Ok(HealthStatus::Unhealthy(msg)) => CheckResult::new("Database", CheckStatus::Fail, msg, start),
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("query failed: {e}"), start),
    };
    (result, Some(store))
}

async fn check_verified_bots(store: &SqliteStore) -> (CheckResult, Vec<Bot>) {
    let start = Instant::now();
    match store.verified_bots().await {
        Ok(bots) if bots.is_empty() => (
            CheckResult::new("Verified bots", CheckStatus::Warn, "none registered", start),
            bots,
        ),
        Ok(bots) => (
            CheckResult::new(
                "Verified bots",
                CheckStatus::Pass,
                format!("{} registered", bots.len()),
                start,
            ),
            bots,
        ),
        Err(e) => (
            CheckResult::new("Verified bots", CheckStatus::Fail, format!("query failed: {e}"), start),
            Vec::new(),
        ),
    }
}

/// Calls `getMe` with the bot's token.
async fn check_bot_token(bot: &Bot, telegram: &TelegramConfig) -> CheckResult {
    let start = Instant::now();
    let name = format!("Bot @{}", bot.username);
    let transport = match TelegramTransport::new(bot, telegram) {
        Ok(transport) => transport,
        Err(e) => return CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    };
    match transport.health_check().await {
        Ok(HealthStatus::Healthy) => CheckResult::new(name, CheckStatus::Pass, "token valid", start),
        Ok(HealthStatus::Degraded(msg)) => CheckResult::new(name, CheckStatus::Warn, msg, start),
        Ok(HealthStatus::Unhealthy(msg)) => CheckResult::new(name, CheckStatus::Fail, msg, start),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}
