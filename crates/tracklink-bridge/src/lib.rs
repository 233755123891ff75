// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Tracklink bridge: host command dispatch onto a native tracking provider.
//!
//! The host sends named commands with positional JSON arguments. The
//! [`Dispatcher`] validates them, makes exactly one call on the shared
//! [`TrackingProvider`], and resolves exactly one of the host's callbacks.
//! Native SDK bindings implement the provider traits and are injected by the
//! embedding application; builds without one get the [`StubProvider`].

pub mod args;
pub mod command;
pub mod completion;
pub mod dispatcher;
pub mod event;
pub mod recording;
pub mod responder;
pub mod stub;
pub mod traits;

use std::sync::Arc;

use tracklink_core::types::Platform;

pub use command::{CommandName, Request};
pub use completion::Completion;
pub use dispatcher::{Dispatcher, WRAPPER_INSTRUCTION};
pub use event::EventPayload;
pub use recording::{CompletionMode, ParkedCompletion, ProviderCall, RecordingProvider};
pub use responder::{PendingCommand, Responder, Settled};
pub use stub::StubProvider;
pub use traits::TrackingProvider;

/// Provider used when the host supplies no native SDK binding.
pub fn platform_provider() -> Arc<dyn TrackingProvider> {
    Arc::new(StubProvider::new(Platform::current()))
}
