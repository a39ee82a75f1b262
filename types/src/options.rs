//! Per-call dispatch options and their resolution against client defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Shape in which a resolved response is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// `result` field as a generic JSON value.
    #[default]
    ResultMap,
    /// `result` field as an [`ApiObject`](crate::ApiObject).
    ResultObject,
    /// Body text as received.
    RawResponse,
    /// Whole body as a generic JSON value.
    RawResponseMap,
    /// Whole body as an [`ApiEnvelope`](crate::ApiEnvelope).
    RawResponseObject,
}

impl OutputMode {
    pub const ALL: [Self; 5] = [
        Self::ResultMap,
        Self::ResultObject,
        Self::RawResponse,
        Self::RawResponseMap,
        Self::RawResponseObject,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ResultMap => "result_map",
            Self::ResultObject => "result_object",
            Self::RawResponse => "raw_response",
            Self::RawResponseMap => "raw_response_map",
            Self::RawResponseObject => "raw_response_object",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = OptionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == raw)
            .ok_or_else(|| {
                OptionError(format!(
                    "unknown return mode {raw:?}; expected one of {}",
                    Self::ALL.map(Self::as_str).join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid option: {0}")]
pub struct OptionError(String);

/// Effective options for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub send_error: bool,
    pub run_in_background: bool,
    pub output: OutputMode,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            send_error: true,
            run_in_background: false,
            output: OutputMode::default(),
        }
    }
}

/// Caller-supplied overrides. Unset fields fall back to the client defaults.
///
/// The serde form is the wire/CLI vocabulary: `send_error`,
/// `run_in_background`, `return`. Any other key is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionOverrides {
    pub send_error: Option<bool>,
    pub run_in_background: Option<bool>,
    #[serde(rename = "return")]
    pub output: Option<OutputMode>,
}

impl OptionOverrides {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn send_error(mut self, enabled: bool) -> Self {
        self.send_error = Some(enabled);
        self
    }

    #[must_use]
    pub fn run_in_background(mut self, enabled: bool) -> Self {
        self.run_in_background = Some(enabled);
        self
    }

    #[must_use]
    pub fn output(mut self, mode: OutputMode) -> Self {
        self.output = Some(mode);
        self
    }

    /// Validate an untyped override set.
    ///
    /// `null` is not a way to unset an option: it is rejected like any other
    /// value outside the option's domain.
    pub fn from_json(value: &Value) -> Result<Self, OptionError> {
        let Value::Object(map) = value else {
            return Err(OptionError(format!("expected a mapping, got {value}")));
        };
        if let Some((key, _)) = map.iter().find(|(_, member)| member.is_null()) {
            return Err(OptionError(format!("{key:?} must not be null")));
        }
        Self::deserialize(value).map_err(|e| OptionError(e.to_string()))
    }

    #[must_use]
    pub fn resolve(&self, defaults: &Options) -> Options {
        Options {
            send_error: self.send_error.unwrap_or(defaults.send_error),
            run_in_background: self
                .run_in_background
                .unwrap_or(defaults.run_in_background),
            output: self.output.unwrap_or(defaults.output),
        }
    }
}
