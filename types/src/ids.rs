use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Target chat: a numeric id or a public `@username`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChatId {
    Id(i64),
    Username(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("chat id must be an integer or an @username, got {0:?}")]
pub struct ChatIdParseError(String);

impl FromStr for ChatId {
    type Err = ChatIdParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Ok(id) = trimmed.parse::<i64>() {
            return Ok(Self::Id(id));
        }
        match trimmed.strip_prefix('@') {
            Some(name) if !name.is_empty() && !name.contains(char::is_whitespace) => {
                Ok(Self::Username(trimmed.to_string()))
            }
            _ => Err(ChatIdParseError(raw.to_string())),
        }
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Username(name) => f.write_str(name),
        }
    }
}

/// Bot authentication token.
///
/// `Debug` is redacted; the value only leaves through [`BotToken::expose_secret`].
#[derive(Clone, PartialEq, Eq)]
pub struct BotToken(String);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("bot token must not be empty")]
    Empty,
    #[error("bot token contains characters that are not allowed in a URL path")]
    InvalidCharacters,
}

impl BotToken {
    pub fn new(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into();
        let token = raw.trim();
        if token.is_empty() {
            return Err(TokenError::Empty);
        }
        if !token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-'))
        {
            return Err(TokenError::InvalidCharacters);
        }
        Ok(Self(token.to_string()))
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(<redacted>)")
    }
}

/// Remote method name, e.g. `sendMessage`.
///
/// Names are opaque to the client; validation only keeps them safe as a URL
/// path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodName(String);

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("method name must be non-empty ASCII letters, digits or '_', got {0:?}")]
pub struct MethodNameError(String);

impl MethodName {
    pub fn new(raw: &str) -> Result<Self, MethodNameError> {
        if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(MethodNameError(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
