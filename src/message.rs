//! Structured request messages from the host
//!
//! A message is a JSON object of dynamically-typed fields. The typed
//! extractors here are the only way commands read fields out of it:
//! either the full typed value comes back or extraction fails, with no
//! partial state and no side effects on the message.

use serde_json::{Map, Value};

use crate::constants::FIELD_SUBJECT;
use crate::error::CommandError;

/// A structured message, read-only to the command layer
#[derive(Debug, Clone)]
pub struct Message {
    fields: Map<String, Value>,
}

impl Message {
    /// Wrap a parsed JSON value; only objects are valid messages
    pub fn from_value(value: Value) -> Result<Self, CommandError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(CommandError::type_mismatch("message", "object")
                .with_details(format!("got {}", type_name(&other)))),
        }
    }

    /// Parse a message out of raw JSON text
    pub fn parse(raw: &str) -> Result<Self, CommandError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| CommandError::invalid_argument(format!("Malformed JSON message: {}", e)))?;
        Self::from_value(value)
    }

    /// The dispatch key selecting the command variant
    pub fn subject(&self) -> Result<String, CommandError> {
        self.get_str(FIELD_SUBJECT)
    }

    /// Extract a required string field
    pub fn get_str(&self, name: &str) -> Result<String, CommandError> {
        match self.fields.get(name) {
            None => Err(CommandError::missing_field(name)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(CommandError::type_mismatch(name, "string")
                .with_details(format!("got {}", type_name(other)))),
        }
    }

    /// Extract a required integer field. Floats and bools do not qualify.
    pub fn get_i64(&self, name: &str) -> Result<i64, CommandError> {
        match self.fields.get(name) {
            None => Err(CommandError::missing_field(name)),
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                CommandError::type_mismatch(name, "integer").with_details("got non-integer number")
            }),
            Some(other) => Err(CommandError::type_mismatch(name, "integer")
                .with_details(format!("got {}", type_name(other)))),
        }
    }

    /// Extract an optional integer field.
    /// Absence is `Ok(None)`; a present field with the wrong type is still an error.
    pub fn get_i64_opt(&self, name: &str) -> Result<Option<i64>, CommandError> {
        if !self.fields.contains_key(name) {
            return Ok(None);
        }
        self.get_i64(name).map(Some)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
