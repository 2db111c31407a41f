use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One decoded input line.
///
/// Only JSON objects become records; the parser rejects every other JSON value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

/// Shape of a pino-serialized error (`err` field).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializedError {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub message: Option<String>,
    pub stack: Option<String>,
}

impl SerializedError {
    /// Read the error shape out of an `err` value. Non-object values yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// A record split into the fields the dispatcher interprets and everything else.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordParts {
    /// Raw `level` value, `Null` when absent.
    pub level: Value,
    pub msg: Option<String>,
    pub category: Option<String>,
    /// Raw `err` value, kept verbatim for pass-through.
    pub err: Option<Value>,
    pub tags: Map<String, Value>,
    /// Every field not listed above.
    pub extra: Map<String, Value>,
}

impl RawRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_parts(mut self) -> RecordParts {
        let level = self.fields.remove("level").unwrap_or(Value::Null);
        let msg = self.fields.remove("msg").and_then(scalar_text);
        let category = self.fields.remove("category").and_then(scalar_text);
        let err = self.fields.remove("err").filter(|value| !value.is_null());
        let tags = match self.fields.remove("tags") {
            Some(Value::Object(tags)) => tags,
            _ => Map::new(),
        };

        RecordParts {
            level,
            msg,
            category,
            err,
            tags,
            extra: self.fields,
        }
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    }
}
