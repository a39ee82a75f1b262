//! Caller-visible results of a dispatch.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::BatchKey;

/// Decoded response body: `{"ok": .., "result": .., "description": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ResponseParameters>,
}

/// Extra hints attached to some failed responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrate_to_chat_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

impl ApiEnvelope {
    /// Decode a response body. Only a JSON object is an envelope; serde would
    /// otherwise fill the fields positionally from an array.
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str::<Value>(body)? {
            object @ Value::Object(_) => Self::deserialize(object),
            _ => Err(serde_json::Error::custom("response body is not a JSON object")),
        }
    }

    /// The `result` payload when the call succeeded with a non-empty result.
    #[must_use]
    pub fn successful_result(self) -> Option<Value> {
        if !self.ok {
            return None;
        }
        self.result.filter(|value| !is_empty_value(value))
    }
}

/// Values that count as "no result": `null`, `false`, `0`, `""`, `[]`, `{}`.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// A `result` payload accessed as an object with named members.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiObject(Value);

impl ApiObject {
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Decode into a caller-defined type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.0)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// Outcome of one element of a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Empty body, undecodable body, or failed API call.
    Failed,
    /// Background process was spawned; its outcome is not observed.
    Launched,
    Raw(String),
    Map(Value),
    Envelope(ApiEnvelope),
    Object(ApiObject),
}

impl Resolved {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// JSON rendering: `false` for failures, `true` for launched processes.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Failed => Value::Bool(false),
            Self::Launched => Value::Bool(true),
            Self::Raw(body) => Value::String(body.clone()),
            Self::Map(value) => value.clone(),
            Self::Envelope(envelope) => {
                serde_json::to_value(envelope).unwrap_or(Value::Bool(false))
            }
            Self::Object(object) => object.as_value().clone(),
        }
    }
}

/// Result of a dispatch, mirroring the shape of its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    Single(Resolved),
    Batch(Vec<(BatchKey, Resolved)>),
}

impl DispatchResult {
    #[must_use]
    pub fn single(&self) -> Option<&Resolved> {
        match self {
            Self::Single(resolved) => Some(resolved),
            Self::Batch(_) => None,
        }
    }

    #[must_use]
    pub fn into_single(self) -> Option<Resolved> {
        match self {
            Self::Single(resolved) => Some(resolved),
            Self::Batch(_) => None,
        }
    }

    #[must_use]
    pub fn get(&self, key: &BatchKey) -> Option<&Resolved> {
        match self {
            Self::Single(_) => None,
            Self::Batch(entries) => entries
                .iter()
                .find(|(existing, _)| existing == key)
                .map(|(_, resolved)| resolved),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(entries) => entries.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn keys(&self) -> Vec<&BatchKey> {
        match self {
            Self::Single(_) => Vec::new(),
            Self::Batch(entries) => entries.iter().map(|(key, _)| key).collect(),
        }
    }

    /// JSON rendering; batches become an object keyed by element key.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Single(resolved) => resolved.to_json(),
            Self::Batch(entries) => {
                let map: Map<String, Value> = entries
                    .iter()
                    .map(|(key, resolved)| (key.to_string(), resolved.to_json()))
                    .collect();
                Value::Object(map)
            }
        }
    }
}
