//! Flow context collaborator.
//!
//! The flow engine owns the conversation session; connectors only see the
//! narrow [`FlowContext`] surface: a keyed write, the raw context and input
//! maps, and a log sink. [`MemoryContext`] is the in-process implementation
//! used by the host API and tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How `add_to_context` combines a value with what is already stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Overwrite the slot.
    #[default]
    Simple,
    /// Append to an array in the slot, creating it if needed.
    Array,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

pub trait FlowContext: Send {
    fn add_to_context(&mut self, key: &str, value: Value, mode: ContextMode);

    fn context_mut(&mut self) -> &mut Map<String, Value>;

    fn input_mut(&mut self) -> &mut Map<String, Value>;

    fn log(&mut self, level: LogLevel, message: &str);
}

/// A single log line emitted by a connector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Conversation state held in memory for the duration of one invocation.
#[derive(Clone, Debug, Default)]
pub struct MemoryContext {
    context: Map<String, Value>,
    input: Map<String, Value>,
    logs: Vec<LogEntry>,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(context: Map<String, Value>, input: Map<String, Value>) -> Self {
        Self {
            context,
            input,
            logs: Vec::new(),
        }
    }

    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    pub fn input(&self) -> &Map<String, Value> {
        &self.input
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    /// Consumes the context, returning `(context, input, logs)`.
    pub fn into_parts(self) -> (Map<String, Value>, Map<String, Value>, Vec<LogEntry>) {
        (self.context, self.input, self.logs)
    }
}

impl FlowContext for MemoryContext {
    fn add_to_context(&mut self, key: &str, value: Value, mode: ContextMode) {
        match mode {
            ContextMode::Simple => {
                self.context.insert(key.to_string(), value);
            }
            ContextMode::Array => match self.context.remove(key) {
                Some(Value::Array(mut items)) => {
                    items.push(value);
                    self.context.insert(key.to_string(), Value::Array(items));
                }
                Some(existing) => {
                    self.context
                        .insert(key.to_string(), Value::Array(vec![existing, value]));
                }
                None => {
                    self.context.insert(key.to_string(), Value::Array(vec![value]));
                }
            },
        }
    }

    fn context_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.context
    }

    fn input_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.input
    }

    fn log(&mut self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "flowlink::context", "{}", message),
            LogLevel::Info => tracing::info!(target: "flowlink::context", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "flowlink::context", "{}", message),
            LogLevel::Error => tracing::error!(target: "flowlink::context", "{}", message),
        }
        self.logs.push(LogEntry {
            level,
            message: message.to_string(),
            timestamp: Utc::now(),
        });
    }
}
