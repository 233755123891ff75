// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overload resolution for the host's `sendEvent` family.

use serde_json::{Map, Value};
use tracklink_core::error::Result;
use tracklink_core::types::Event;

use crate::args::{Args, type_name};

/// The four argument shapes an event can arrive in.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// `sendEvent(name)`
    Name(String),
    /// `sendEvent(name, "…")`, the string is forwarded untouched.
    NameWithString { name: String, data: String },
    /// `sendEvent(name, { … })`
    NameWithMapping { name: String, data: Map<String, Value> },
    /// `sendEvent(event)` with a full event descriptor.
    Event(Event),
}

impl EventPayload {
    /// Pick the variant from arity and runtime types.
    pub fn resolve(args: &Args<'_>) -> Result<Self> {
        match args.values() {
            [Value::String(_)] => Self::name_only(args),
            [Value::Object(_)] => Self::event_object(args),
            [Value::String(_), Value::String(_)] => Self::with_string(args),
            [Value::String(_), Value::Object(_)] => Self::with_mapping(args),
            [] => Err(args.error("expected an event name or event object")),
            [first] => Err(args.error(format!(
                "argument 0 must be a string or an event object, got {}",
                type_name(first)
            ))),
            [Value::String(_), second] => Err(args.error(format!(
                "argument 1 must be a string or an object, got {}",
                type_name(second)
            ))),
            [first, _] => Err(args.error(format!(
                "argument 0 must be a string, got {}",
                type_name(first)
            ))),
            values => Err(args.error(format!(
                "expected 1 or 2 argument(s), got {}",
                values.len()
            ))),
        }
    }

    pub fn name_only(args: &Args<'_>) -> Result<Self> {
        args.expect_arity(1)?;
        Ok(Self::Name(event_name(args, args.string(0)?)?))
    }

    pub fn with_string(args: &Args<'_>) -> Result<Self> {
        args.expect_arity(2)?;
        Ok(Self::NameWithString {
            name: event_name(args, args.string(0)?)?,
            data: args.string(1)?.to_string(),
        })
    }

    pub fn with_mapping(args: &Args<'_>) -> Result<Self> {
        args.expect_arity(2)?;
        Ok(Self::NameWithMapping {
            name: event_name(args, args.string(0)?)?,
            data: args.object(1)?.clone(),
        })
    }

    pub fn event_object(args: &Args<'_>) -> Result<Self> {
        args.expect_arity(1)?;
        let descriptor = Value::Object(args.object(0)?.clone());
        let event: Event = serde_json::from_value(descriptor)
            .map_err(|e| args.error(format!("invalid event object: {e}")))?;
        event_name(args, &event.name)?;
        Ok(Self::Event(event))
    }

    /// Event name regardless of shape.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name)
            | Self::NameWithString { name, .. }
            | Self::NameWithMapping { name, .. } => name,
            Self::Event(event) => &event.name,
        }
    }
}

fn event_name(args: &Args<'_>, name: &str) -> Result<String> {
    if name.trim().is_empty() {
        return Err(args.error("event name must not be blank"));
    }
    Ok(name.to_string())
}
