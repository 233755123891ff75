// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tracklink — Core types, host protocol and error definitions shared across
// all crates.

pub mod config;
pub mod error;
pub mod protocol;
pub mod types;

pub use config::BridgeConfig;
pub use error::TracklinkError;
pub use protocol::{Failure, FailureKind, HostCommand, HostResponse, Outcome};
pub use types::*;
