// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host callback pairs and awaitable pending commands.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use tracklink_core::protocol::{Failure, Outcome};
use tracklink_core::types::CommandId;

type Callback = Box<dyn FnOnce(Outcome) + Send + 'static>;

/// The host's success/failure callback pair for one command.
///
/// Consumed on resolution, so it can fire at most once.
pub struct Responder {
    callback: Callback,
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder").finish_non_exhaustive()
    }
}

impl Responder {
    /// Build from separate success and failure callbacks.
    pub fn new(
        on_success: impl FnOnce(Value) + Send + 'static,
        on_failure: impl FnOnce(Failure) + Send + 'static,
    ) -> Self {
        Self::from_fn(move |outcome| match outcome {
            Ok(payload) => on_success(payload),
            Err(failure) => on_failure(failure),
        })
    }

    /// Build from a single callback receiving the whole outcome.
    pub fn from_fn(callback: impl FnOnce(Outcome) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Responder that forwards its outcome into an awaitable handle.
    pub fn pending(id: CommandId) -> (Self, PendingCommand) {
        let (tx, rx) = oneshot::channel();
        let responder = Self::from_fn(move |outcome| {
            // Receiver gone means the host stopped waiting.
            let _ = tx.send(outcome);
        });
        (responder, PendingCommand { id, rx })
    }

    pub fn resolve(self, outcome: Outcome) {
        (self.callback)(outcome)
    }

    pub fn succeed(self, payload: Value) {
        self.resolve(Ok(payload))
    }

    pub fn fail(self, failure: Failure) {
        self.resolve(Err(failure))
    }
}

/// How waiting on a pending command ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Settled {
    /// Exactly one callback fired.
    Resolved(Outcome),
    /// The provider dropped its completion without firing it; the command
    /// can never resolve.
    Abandoned,
    /// The caller's wait limit elapsed first. The command may still resolve
    /// later, but this handle is gone.
    TimedOut,
}

/// Awaitable view of a dispatched command.
#[derive(Debug)]
pub struct PendingCommand {
    id: CommandId,
    rx: oneshot::Receiver<Outcome>,
}

impl PendingCommand {
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Non-blocking check; `None` while the command is still pending.
    pub fn try_outcome(&mut self) -> Option<Outcome> {
        self.rx.try_recv().ok()
    }

    /// Wait with no limit.
    pub async fn settle(self) -> Settled {
        match self.rx.await {
            Ok(outcome) => Settled::Resolved(outcome),
            Err(_) => Settled::Abandoned,
        }
    }

    /// Wait at most `limit`.
    pub async fn settle_within(self, limit: Duration) -> Settled {
        match tokio::time::timeout(limit, self.settle()).await {
            Ok(settled) => settled,
            Err(_) => Settled::TimedOut,
        }
    }
}
