// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Platform;

/// Identifies the host framework to the provider on start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapperInfo {
    pub name: String,
    pub version: String,
    pub build_date: DateTime<Utc>,
}

impl WrapperInfo {
    /// JSON value forwarded as the `wrapper` advanced instruction.
    pub fn instruction_value(&self) -> String {
        serde_json::json!({
            "name": self.name,
            "version": self.version,
            "build_date": self.build_date.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        })
        .to_string()
    }
}

/// Persistent bridge settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Overrides the provider's reported platform when gating
    /// platform-specific commands.
    pub platform: Option<Platform>,
    /// Timeout in seconds used by `processDeeplink` (default 10).
    pub default_deeplink_timeout_secs: f64,
    /// Sent to the provider before `start` when present.
    pub wrapper: Option<WrapperInfo>,
    /// Optional host-side wait limit for pending commands. The dispatcher
    /// itself never times out a command.
    pub pending_timeout_secs: Option<u64>,
}

impl BridgeConfig {
    pub fn pending_timeout(&self) -> Option<Duration> {
        self.pending_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            platform: None,
            default_deeplink_timeout_secs: 10.0,
            wrapper: None,
            pending_timeout_secs: None,
        }
    }
}
