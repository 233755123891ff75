// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-fire continuations handed to the provider for asynchronous
// operations.

use std::sync::{Arc, Mutex};

use tracing::warn;
use tracklink_core::error::{Result, TracklinkError};

type Continuation<T> = Box<dyn FnOnce(Result<T>) + Send + 'static>;

/// Completion handler for one asynchronous provider operation.
///
/// Clones share the same slot, so a provider may keep several handles (a
/// delegate and a timeout path, say) and whichever fires first wins. Later
/// fires are ignored and logged.
pub struct Completion<T> {
    operation: &'static str,
    slot: Arc<Mutex<Option<Continuation<T>>>>,
}

impl<T> Clone for Completion<T> {
    fn clone(&self) -> Self {
        Self {
            operation: self.operation,
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> std::fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("operation", &self.operation)
            .field("fired", &self.is_fired())
            .finish()
    }
}

impl<T> Completion<T> {
    /// Wrap `continuation` so it runs at most once.
    pub fn new(operation: &'static str, continuation: impl FnOnce(Result<T>) + Send + 'static) -> Self {
        Self {
            operation,
            slot: Arc::new(Mutex::new(Some(Box::new(continuation)))),
        }
    }

    /// Name of the operation this completion belongs to.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Deliver the provider's result. Returns `false` if this completion had
    /// already fired, in which case `result` is dropped.
    pub fn complete(&self, result: Result<T>) -> bool {
        // Take under the lock, run outside it.
        let continuation = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match continuation {
            Some(continuation) => {
                continuation(result);
                true
            }
            None => {
                warn!(operation = self.operation, "completion fired more than once, ignoring");
                false
            }
        }
    }

    pub fn succeed(&self, value: T) -> bool {
        self.complete(Ok(value))
    }

    pub fn fail(&self, message: impl Into<String>) -> bool {
        self.complete(Err(TracklinkError::provider(message)))
    }

    pub fn is_fired(&self) -> bool {
        match self.slot.lock() {
            Ok(slot) => slot.is_none(),
            Err(poisoned) => poisoned.into_inner().is_none(),
        }
    }
}
