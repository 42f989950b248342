// SPDX-FileCopyrightText: 2026 FeedbackBot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for FeedbackBot.

use thiserror::Error;

/// The primary error type used across all FeedbackBot adapter traits and core operations.
///
/// Domain rejections (rate limited, no active groups, expired selection, ...)
/// are not errors and never travel through this type.
#[derive(Debug, Error)]
pub enum FeedbackBotError {
    /// Configuration errors (invalid values, missing bot token, bad API URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Messaging transport errors (network failure, API rejection).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An inbound batch could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl FeedbackBotError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(source),
        }
    }

    /// Builds a transport error carrying the underlying cause.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether a poller should back off and retry after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Decode(_))
    }
}
