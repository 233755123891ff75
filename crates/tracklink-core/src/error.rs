// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Tracklink.

use thiserror::Error;

/// Top-level error type for all Tracklink operations.
#[derive(Debug, Error)]
pub enum TracklinkError {
    // -- Dispatch errors --
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("invalid arguments for {command}: {reason}")]
    InvalidArguments { command: String, reason: String },

    // -- Provider errors --
    #[error("{0}")]
    Provider(String),

    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Host I/O --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TracklinkError {
    /// Shorthand for an argument validation failure on `command`.
    pub fn invalid_args(command: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            command: command.to_string(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a failure reported by the tracking provider.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TracklinkError>;
