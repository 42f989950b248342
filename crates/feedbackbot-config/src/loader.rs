// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy: `./feedbackbot.toml` > `~/.config/feedbackbot/feedbackbot.toml`
//! > `/etc/feedbackbot/feedbackbot.toml`, with environment variable overrides via the
//! `FEEDBACKBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::FeedbackBotConfig;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "FEEDBACKBOT_";

pub(crate) const LOCAL_CONFIG: &str = "feedbackbot.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/feedbackbot/feedbackbot.toml";

/// Top-level sections, longest first where one is a prefix of another.
const SECTIONS: &[&str] = &[
    "rate_limit",
    "agent",
    "storage",
    "telegram",
    "feedback",
    "pending",
];

/// Path of the per-user config file, if the platform has a config dir.
pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("feedbackbot").join(LOCAL_CONFIG))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/feedbackbot/feedbackbot.toml` (system-wide)
/// 3. `~/.config/feedbackbot/feedbackbot.toml` (user XDG config)
/// 4. `./feedbackbot.toml` (local directory)
/// 5. `FEEDBACKBOT_*` environment variables
pub fn load_config() -> Result<FeedbackBotConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<FeedbackBotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FeedbackBotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<FeedbackBotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(FeedbackBotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(FeedbackBotConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Section names and keys both contain underscores, so `Env::split("_")`
/// cannot be used: `FEEDBACKBOT_RATE_LIMIT_MAX_PER_WINDOW` must become
/// `rate_limit.max_per_window`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| map_env_key(key.as_str()).into())
}

/// Maps a prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|field| format!("{section}.{field}"))
        })
        .unwrap_or(key)
}
