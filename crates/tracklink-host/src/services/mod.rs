// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: configuration, data directory and the stdin/stdout session
// that feeds host frames to the dispatcher.

pub mod config;
pub mod data_dir;
pub mod session;
