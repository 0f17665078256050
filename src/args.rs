//! Per-call invocation arguments.
//!
//! Arguments arrive as a free-form JSON object declared by the flow author.
//! Presence checks follow JavaScript truthiness, since flow authors leave
//! optional fields as `""`, `0`, `false` or `null` interchangeably.

use crate::error::ConnectorError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Argument key naming the destination slot for the result.
pub const STORE_ARG: &str = "store";

/// Argument key for the abort-vs-record error policy.
pub const STOP_ON_ERROR_ARG: &str = "stopOnError";

/// Returns `true` if the value would be truthy in a JavaScript condition.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Immutable argument map for a single connector call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationArgs(Map<String, Value>);

impl InvocationArgs {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Builds arguments from a JSON value. Non-objects yield an empty map.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.0.get(name).map_or(false, is_truthy)
    }

    /// Fails with a validation error naming the first missing argument.
    pub fn require(&self, names: &[&str]) -> Result<(), ConnectorError> {
        match names.iter().find(|name| !self.is_present(name)) {
            Some(missing) => Err(ConnectorError::MissingArgument(missing.to_string())),
            None => Ok(()),
        }
    }

    /// Required boolean: must be explicitly `true` or `false`.
    pub fn require_bool(&self, name: &str) -> Result<bool, ConnectorError> {
        match self.0.get(name) {
            None | Some(Value::Null) => Err(ConnectorError::MissingArgument(name.to_string())),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) if s == "true" => Ok(true),
            Some(Value::String(s)) if s == "false" => Ok(false),
            Some(_) => Err(ConnectorError::invalid_argument(name, "expected a boolean")),
        }
    }

    /// Truthy string argument, or `None`.
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn require_str(&self, name: &str) -> Result<&str, ConnectorError> {
        self.str(name)
            .ok_or_else(|| ConnectorError::MissingArgument(name.to_string()))
    }

    /// Truthy argument rendered as a string (numbers are common for limits).
    pub fn text(&self, name: &str) -> Option<String> {
        match self.0.get(name) {
            Some(value) if is_truthy(value) => match value {
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            },
            _ => None,
        }
    }

    /// JSON argument. Strings are parsed, other values pass through.
    pub fn json(&self, name: &str) -> Result<Value, ConnectorError> {
        match self.0.get(name) {
            Some(Value::String(s)) if !s.is_empty() => serde_json::from_str(s)
                .map_err(|e| ConnectorError::invalid_argument(name, e.to_string())),
            Some(value) if is_truthy(value) => Ok(value.clone()),
            _ => Err(ConnectorError::MissingArgument(name.to_string())),
        }
    }

    pub fn store(&self) -> Result<&str, ConnectorError> {
        self.require_str(STORE_ARG)
    }

    pub fn stop_on_error(&self) -> Result<bool, ConnectorError> {
        self.require_bool(STOP_ON_ERROR_ARG)
    }
}

impl From<Map<String, Value>> for InvocationArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
