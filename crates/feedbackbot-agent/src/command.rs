// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classifies private-message text into an [`Intent`].
//!
//! Rules are a strict priority list; the first match wins:
//!
//! 1. `/start` or `/help` (exact) greets.
//! 2. The admin-only command (case-insensitive prefix) submits the
//!    remainder as admin-only feedback, or asks for content if it is empty.
//! 3. Any other `/...` text is an unknown command.
//! 4. Empty text is rejected.
//! 5. Text over the length limit is rejected.
//! 6. Everything else is regular feedback.

use feedbackbot_config::model::FeedbackConfig as FeedbackSettings;

const GREETING_COMMANDS: [&str; 2] = ["/start", "/help"];
const COMMAND_SIGIL: char = '/';

/// What the sender wants, decided from the text alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    EmptyAdminOnly,
    Feedback { text: String, admin_only: bool },
    UnknownCommand,
    EmptyMessage,
    TooLong,
}

/// Parser configured with the deployment's command token and length limit.
#[derive(Debug, Clone)]
pub struct CommandParser {
    admin_only_command: String,
    max_message_length: usize,
}

impl CommandParser {
    pub fn new(settings: &FeedbackSettings) -> Self {
        Self {
            admin_only_command: settings.admin_only_command.clone(),
            max_message_length: settings.max_message_length,
        }
    }

    pub fn parse(&self, raw: &str) -> Intent {
        let text = raw.trim();

        if GREETING_COMMANDS.contains(&text) {
            return Intent::Greeting;
        }

        if let Some(rest) = strip_prefix_ignore_case(text, &self.admin_only_command) {
            let rest = rest.trim();
            if rest.is_empty() {
                return Intent::EmptyAdminOnly;
            }
            return Intent::Feedback {
                text: rest.to_string(),
                admin_only: true,
            };
        }

        if text.starts_with(COMMAND_SIGIL) {
            return Intent::UnknownCommand;
        }

        if text.is_empty() {
            return Intent::EmptyMessage;
        }

        if self.max_message_length > 0 && text.chars().count() > self.max_message_length {
            return Intent::TooLong;
        }

        Intent::Feedback {
            text: text.to_string(),
            admin_only: false,
        }
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}
