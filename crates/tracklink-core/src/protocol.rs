// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host-facing wire types: inbound commands, outcomes and response frames.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TracklinkError;
use crate::types::CommandId;

/// One invocation from the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostCommand {
    /// Key the host uses to match the response to its callback pair.
    #[serde(default)]
    pub id: CommandId,
    /// Command name, e.g. `sendEvent`.
    pub command: String,
    /// Positional arguments in host interchange form.
    #[serde(default)]
    pub args: Vec<Value>,
}

impl HostCommand {
    pub fn new(command: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            id: CommandId::new(),
            command: command.into(),
            args,
        }
    }
}

/// Failure classification delivered to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The command name is not part of the bridged surface.
    UnsupportedOperation,
    /// Arity or type mismatch against the command's signature.
    InvalidArguments,
    /// The tracking provider rejected an otherwise well-formed request.
    ProviderFailure,
}

/// Failure descriptor sent through the host's failure callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl From<&TracklinkError> for Failure {
    fn from(err: &TracklinkError) -> Self {
        let kind = match err {
            TracklinkError::UnsupportedOperation(_) => FailureKind::UnsupportedOperation,
            TracklinkError::InvalidArguments { .. } => FailureKind::InvalidArguments,
            TracklinkError::Provider(_)
            | TracklinkError::PlatformUnavailable
            | TracklinkError::Io(_)
            | TracklinkError::Serialization(_) => FailureKind::ProviderFailure,
        };
        Failure::new(kind, err.to_string())
    }
}

impl From<TracklinkError> for Failure {
    fn from(err: TracklinkError) -> Self {
        Failure::from(&err)
    }
}

/// Terminal result of a single command.
pub type Outcome = std::result::Result<Value, Failure>;

/// Response body, tagged by `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResponseBody {
    Success { payload: Value },
    Failure { error: Failure },
}

/// One response frame sent back to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostResponse {
    pub id: CommandId,
    #[serde(flatten)]
    pub body: ResponseBody,
}

impl HostResponse {
    pub fn from_outcome(id: CommandId, outcome: Outcome) -> Self {
        let body = match outcome {
            Ok(payload) => ResponseBody::Success { payload },
            Err(error) => ResponseBody::Failure { error },
        };
        Self { id, body }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.body, ResponseBody::Success { .. })
    }
}
