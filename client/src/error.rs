use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::{MethodNameError, OptionError, ShapeError};

/// Errors that reject a dispatch before any request is sent.
///
/// Remote failures never surface here: they resolve the affected element to
/// [`Resolved::Failed`](crate::Resolved::Failed).
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    InvalidMethod(#[from] MethodNameError),
    #[error(transparent)]
    InvalidShape(#[from] ShapeError),
    #[error(transparent)]
    InvalidOption(#[from] OptionError),
}

/// Why a transport produced no usable body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransportErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    /// The server answered with a zero-length body.
    EmptyBody,
    /// An upload file could not be read.
    File,
}

impl TransportErrorKind {
    pub(crate) fn from_reqwest(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::Connect
        } else if error.is_body() || error.is_decode() {
            Self::Body
        } else {
            Self::Request
        }
    }

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::EmptyBody => "empty_body",
            Self::File => "file",
        }
    }
}

/// Per-element remote failure. Drives logging and escalation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ElementFailure {
    EmptyResponse {
        kind: TransportErrorKind,
        status: Option<StatusCode>,
    },
    Api {
        status: StatusCode,
        description: Option<String>,
    },
}

impl fmt::Display for ElementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyResponse { kind, status } => {
                write!(f, "empty response ({})", kind.as_str())?;
                if let Some(status) = status {
                    write!(f, ", HTTP {status}")?;
                }
                Ok(())
            }
            Self::Api {
                status,
                description,
            } => {
                write!(f, "API error, HTTP {status}")?;
                if let Some(description) = description {
                    write!(f, ": {description}")?;
                }
                Ok(())
            }
        }
    }
}
