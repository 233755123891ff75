// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Positional argument checking for host commands.

use serde_json::{Map, Value};
use tracklink_core::error::{Result, TracklinkError};

/// Type name used in validation messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Borrowed view over a command's argument list.
///
/// Every accessor fails with `InvalidArguments` naming the command, the
/// position and the expected type.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    command: &'a str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(command: &'a str, values: &'a [Value]) -> Self {
        Self { command, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }

    pub fn error(&self, reason: impl Into<String>) -> TracklinkError {
        TracklinkError::invalid_args(self.command, reason)
    }

    pub fn expect_arity(&self, expected: usize) -> Result<()> {
        if self.values.len() == expected {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {expected} argument(s), got {}",
                self.values.len()
            )))
        }
    }

    fn get(&self, index: usize) -> Result<&'a Value> {
        self.values
            .get(index)
            .ok_or_else(|| self.error(format!("missing argument {index}")))
    }

    fn mismatch(&self, index: usize, expected: &str, got: &Value) -> TracklinkError {
        self.error(format!(
            "argument {index} must be {expected}, got {}",
            type_name(got)
        ))
    }

    pub fn string(&self, index: usize) -> Result<&'a str> {
        match self.get(index)? {
            Value::String(s) => Ok(s),
            other => Err(self.mismatch(index, "a string", other)),
        }
    }

    /// String or null. Blank strings count as absent.
    pub fn optional_string(&self, index: usize) -> Result<Option<&'a str>> {
        match self.get(index)? {
            Value::Null => Ok(None),
            Value::String(s) if s.trim().is_empty() => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(self.mismatch(index, "a string or null", other)),
        }
    }

    pub fn bool(&self, index: usize) -> Result<bool> {
        match self.get(index)? {
            Value::Bool(b) => Ok(*b),
            other => Err(self.mismatch(index, "a bool", other)),
        }
    }

    pub fn number(&self, index: usize) -> Result<f64> {
        let value = self.get(index)?;
        value
            .as_f64()
            .ok_or_else(|| self.mismatch(index, "a number", value))
    }

    pub fn object(&self, index: usize) -> Result<&'a Map<String, Value>> {
        match self.get(index)? {
            Value::Object(map) => Ok(map),
            other => Err(self.mismatch(index, "an object", other)),
        }
    }

    pub fn string_array(&self, index: usize) -> Result<Vec<String>> {
        let items = match self.get(index)? {
            Value::Array(items) => items,
            other => return Err(self.mismatch(index, "an array of strings", other)),
        };
        items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(self.error(format!(
                    "argument {index}[{i}] must be a string, got {}",
                    type_name(other)
                ))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invalid_reason(err: TracklinkError) -> String {
        match err {
            TracklinkError::InvalidArguments { reason, .. } => reason,
            other => panic!("expected InvalidArguments, got {other:?}"),
        }
    }

    #[test]
    fn arity_mismatch_reports_counts() {
        let values = [json!("a")];
        let args = Args::new("registerIdentityLink", &values);
        let reason = invalid_reason(args.expect_arity(2).unwrap_err());
        assert_eq!(reason, "expected 2 argument(s), got 1");
    }

    #[test]
    fn typed_accessors() {
        let values = [json!("name"), json!(true), json!(2.5), json!({ "k": 1 }), json!(["a", "b"])];
        let args = Args::new("test", &values);
        assert_eq!(args.string(0).unwrap(), "name");
        assert!(args.bool(1).unwrap());
        assert_eq!(args.number(2).unwrap(), 2.5);
        assert_eq!(args.object(3).unwrap()["k"], json!(1));
        assert_eq!(args.string_array(4).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn number_where_string_expected() {
        let values = [json!(42)];
        let args = Args::new("sendEvent", &values);
        let reason = invalid_reason(args.string(0).unwrap_err());
        assert_eq!(reason, "argument 0 must be a string, got number");
    }

    #[test]
    fn optional_string_treats_null_and_blank_as_absent() {
        let values = [json!(null), json!("  "), json!("guid"), json!(1)];
        let args = Args::new("start", &values);
        assert_eq!(args.optional_string(0).unwrap(), None);
        assert_eq!(args.optional_string(1).unwrap(), None);
        assert_eq!(args.optional_string(2).unwrap(), Some("guid"));
        assert!(args.optional_string(3).is_err());
    }

    #[test]
    fn string_array_rejects_mixed_items() {
        let values = [json!(["email", 3])];
        let args = Args::new("registerPrivacyProfile", &values);
        let reason = invalid_reason(args.string_array(0).unwrap_err());
        assert_eq!(reason, "argument 0[1] must be a string, got number");
    }
}
