//! Invocation parameter sets and shape classification.
//!
//! Typed callers build an [`InvocationSpec`] directly. Dynamic callers (JSON
//! files, CLI input) go through [`InvocationSpec::from_json`], which classifies
//! the value with [`ParamShape::classify`] first.
//!
//! Classification looks at the first element only: `{..}` of scalars is one
//! invocation, `[{..}, ..]` or `{"key": {..}, ..}` is a batch. Elements past the
//! first are not inspected for depth; converting them still requires each to be
//! a mapping.

use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::Fields;

/// Whether a parameter set holds one invocation or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamShape {
    Flat,
    Batched,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("parameter set has depth {0}; expected 1 (one invocation) or 2 (a batch)")]
    Depth(usize),
    #[error("parameter set must be a mapping")]
    NotAMapping,
    #[error("batch element {0} is not a mapping")]
    ElementNotAMapping(BatchKey),
}

impl ParamShape {
    /// An empty array is an empty batch; an empty mapping is one call with no
    /// parameters.
    pub fn classify(value: &Value) -> Result<Self, ShapeError> {
        if matches!(value, Value::Array(items) if items.is_empty()) {
            return Ok(Self::Batched);
        }
        match depth(value) {
            1 => Ok(Self::Flat),
            2 => Ok(Self::Batched),
            other => Err(ShapeError::Depth(other)),
        }
    }
}

fn depth(value: &Value) -> usize {
    match value {
        Value::Object(map) => 1 + map.values().next().map_or(0, depth),
        Value::Array(items) => 1 + items.first().map_or(0, depth),
        _ => 0,
    }
}

/// Key of one element in a batch: its position, or its name in a keyed batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BatchKey {
    Index(usize),
    Name(String),
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for BatchKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for BatchKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

/// Parameters for one dispatch: a single field set or an ordered batch.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationSpec {
    Flat(Fields),
    Batched(Vec<(BatchKey, Fields)>),
}

impl InvocationSpec {
    /// Positional batch; keys are `0..n`.
    #[must_use]
    pub fn batch(items: impl IntoIterator<Item = Fields>) -> Self {
        Self::Batched(
            items
                .into_iter()
                .enumerate()
                .map(|(index, fields)| (BatchKey::Index(index), fields))
                .collect(),
        )
    }

    /// Batch keyed by caller-chosen names.
    #[must_use]
    pub fn keyed<K: Into<String>>(items: impl IntoIterator<Item = (K, Fields)>) -> Self {
        Self::Batched(
            items
                .into_iter()
                .map(|(name, fields)| (BatchKey::Name(name.into()), fields))
                .collect(),
        )
    }

    #[must_use]
    pub fn shape(&self) -> ParamShape {
        match self {
            Self::Flat(_) => ParamShape::Flat,
            Self::Batched(_) => ParamShape::Batched,
        }
    }

    /// Number of POSTs this parameter set expands to.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(_) => 1,
            Self::Batched(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Field sets in dispatch order.
    #[must_use]
    pub fn elements(&self) -> Vec<&Fields> {
        match self {
            Self::Flat(fields) => vec![fields],
            Self::Batched(items) => items.iter().map(|(_, fields)| fields).collect(),
        }
    }

    pub fn from_json(value: Value) -> Result<Self, ShapeError> {
        match ParamShape::classify(&value)? {
            ParamShape::Flat => match value {
                Value::Object(map) => Ok(Self::Flat(Fields::from_json_map(map))),
                _ => Err(ShapeError::NotAMapping),
            },
            ParamShape::Batched => match value {
                Value::Array(items) => items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| element(BatchKey::Index(index), item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Batched),
                Value::Object(map) => map
                    .into_iter()
                    .map(|(name, item)| element(BatchKey::Name(name), item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Self::Batched),
                _ => Err(ShapeError::NotAMapping),
            },
        }
    }
}

fn element(key: BatchKey, item: Value) -> Result<(BatchKey, Fields), ShapeError> {
    match item {
        Value::Object(map) => Ok((key, Fields::from_json_map(map))),
        _ => Err(ShapeError::ElementNotAMapping(key)),
    }
}

impl From<Fields> for InvocationSpec {
    fn from(fields: Fields) -> Self {
        Self::Flat(fields)
    }
}

impl From<Vec<Fields>> for InvocationSpec {
    fn from(items: Vec<Fields>) -> Self {
        Self::batch(items)
    }
}

impl From<Map<String, Value>> for InvocationSpec {
    fn from(map: Map<String, Value>) -> Self {
        Self::Flat(Fields::from_json_map(map))
    }
}
