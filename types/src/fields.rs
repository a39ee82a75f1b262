//! Parameter fields for a single remote invocation.
//!
//! A [`Fields`] value is the body of one POST: an insertion-ordered mapping of
//! field name to [`FieldValue`]. Order is kept so request bodies and diagnostics
//! read the same way the caller built them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::ChatId;

/// A local file sent as a multipart part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    path: PathBuf,
    file_name: Option<String>,
}

impl InputFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_name: None,
        }
    }

    /// Override the file name announced in the multipart part.
    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name sent with the upload: explicit override, else the path's final component.
    #[must_use]
    pub fn upload_name(&self) -> String {
        if let Some(name) = &self.file_name {
            return name.clone();
        }
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string())
    }
}

/// Value kinds a field may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Text,
    File,
    Json,
}

impl FieldKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Text => "text",
            Self::File => "file",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field value.
///
/// `Json` holds structured values (arrays, objects). Foreground requests send
/// them JSON-encoded; background requests reject them.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    File(InputFile),
    Json(Value),
}

impl FieldValue {
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::Int(_) => FieldKind::Int,
            Self::Float(_) => FieldKind::Float,
            Self::Text(_) => FieldKind::Text,
            Self::File(_) => FieldKind::File,
            Self::Json(_) => FieldKind::Json,
        }
    }

    #[must_use]
    pub const fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Text form used in URL-encoded and multipart bodies. `None` for files.
    #[must_use]
    pub fn form_text(&self) -> Option<String> {
        match self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Int(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Text(value) => Some(value.clone()),
            Self::Json(value) => Some(value.to_string()),
            Self::File(_) => None,
        }
    }

    /// Convert a decoded JSON value. Returns `None` for `null`.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(value) => Some(Self::Bool(value)),
            Value::Number(number) => Some(
                number
                    .as_i64()
                    .map(Self::Int)
                    .unwrap_or_else(|| Self::Float(number.as_f64().unwrap_or_default())),
            ),
            Value::String(text) => Some(Self::Text(text)),
            structured @ (Value::Array(_) | Value::Object(_)) => Some(Self::Json(structured)),
        }
    }

    /// JSON rendering for diagnostics. Files render as their path.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(value) => Value::Bool(*value),
            Self::Int(value) => Value::from(*value),
            Self::Float(value) => Value::from(*value),
            Self::Text(value) => Value::String(value.clone()),
            Self::File(file) => serde_json::json!({ "file": file.path().display().to_string() }),
            Self::Json(value) => value.clone(),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<InputFile> for FieldValue {
    fn from(value: InputFile) -> Self {
        Self::File(value)
    }
}

impl From<ChatId> for FieldValue {
    fn from(value: ChatId) -> Self {
        match value {
            ChatId::Id(id) => Self::Int(id),
            ChatId::Username(name) => Self::Text(name),
        }
    }
}

/// Ordered field mapping for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(Vec<(String, FieldValue)>);

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field. Replacement keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn has_files(&self) -> bool {
        self.0.iter().any(|(_, value)| value.is_file())
    }

    /// Build from a decoded JSON object. `null` members are omitted.
    #[must_use]
    pub fn from_json_map(map: Map<String, Value>) -> Self {
        let mut fields = Self::new();
        for (name, value) in map {
            if let Some(value) = FieldValue::from_json(value) {
                fields.0.push((name, value));
            }
        }
        fields
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}
