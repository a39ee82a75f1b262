//! Client configuration.
//!
//! Built in code with the `with_*` methods, or read from the environment with
//! [`ClientConfig::from_env`]. There is no configuration file.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::{BotToken, ChatId, ChatIdParseError, Options, TokenError};

/// Public API host.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
/// Program that performs background POSTs.
pub const DEFAULT_LAUNCHER: &str = "curl";

pub const ENV_TOKEN: &str = "BOTLINE_TOKEN";
pub const ENV_DIAGNOSTIC_CHAT: &str = "BOTLINE_DIAGNOSTIC_CHAT";
pub const ENV_TIMEOUT_SECS: &str = "BOTLINE_TIMEOUT_SECS";
pub const ENV_API_BASE: &str = "BOTLINE_API_BASE";
pub const ENV_MAX_CONCURRENCY: &str = "BOTLINE_MAX_CONCURRENCY";
pub const ENV_LAUNCHER: &str = "BOTLINE_LAUNCHER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BOTLINE_TOKEN is not set")]
    MissingToken,
    #[error(transparent)]
    InvalidToken(#[from] TokenError),
    #[error("invalid diagnostic chat: {0}")]
    InvalidChat(#[from] ChatIdParseError),
    #[error("invalid timeout {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),
    #[error("invalid max concurrency {0:?}: expected a positive integer")]
    InvalidConcurrency(String),
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidApiBase { url: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    token: BotToken,
    api_base: String,
    timeout: Duration,
    diagnostic_chat: Option<ChatId>,
    defaults: Options,
    max_concurrency: NonZeroUsize,
    launcher: PathBuf,
}

impl ClientConfig {
    #[must_use]
    pub fn new(token: BotToken) -> Self {
        Self {
            token,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            diagnostic_chat: None,
            defaults: Options::default(),
            max_concurrency: NonZeroUsize::new(DEFAULT_MAX_CONCURRENCY)
                .unwrap_or(NonZeroUsize::MIN),
            launcher: PathBuf::from(DEFAULT_LAUNCHER),
        }
    }

    /// Read configuration from `BOTLINE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token = get(ENV_TOKEN).ok_or(ConfigError::MissingToken)?;
        let mut config = Self::new(BotToken::new(token)?);

        if let Some(base) = get(ENV_API_BASE) {
            config = config.with_api_base(&base)?;
        }
        if let Some(chat) = get(ENV_DIAGNOSTIC_CHAT) {
            config = config.with_diagnostic_chat(chat.parse::<ChatId>()?);
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(raw) = get(ENV_MAX_CONCURRENCY) {
            let limit = raw
                .trim()
                .parse::<NonZeroUsize>()
                .map_err(|_| ConfigError::InvalidConcurrency(raw))?;
            config = config.with_max_concurrency(limit);
        }
        if let Some(launcher) = get(ENV_LAUNCHER) {
            config = config.with_launcher(launcher);
        }
        Ok(config)
    }

    /// Point the client at another API host (a local server, a mock).
    pub fn with_api_base(mut self, base: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base).map_err(|e| ConfigError::InvalidApiBase {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiBase {
                url: base.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }
        self.api_base = base.trim_end_matches('/').to_string();
        Ok(self)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_diagnostic_chat(mut self, chat: ChatId) -> Self {
        self.diagnostic_chat = Some(chat);
        self
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: Options) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn with_max_concurrency(mut self, limit: NonZeroUsize) -> Self {
        self.max_concurrency = limit;
        self
    }

    #[must_use]
    pub fn with_launcher(mut self, program: impl Into<PathBuf>) -> Self {
        self.launcher = program.into();
        self
    }

    #[must_use]
    pub fn token(&self) -> &BotToken {
        &self.token
    }

    #[must_use]
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn diagnostic_chat(&self) -> Option<&ChatId> {
        self.diagnostic_chat.as_ref()
    }

    #[must_use]
    pub fn defaults(&self) -> Options {
        self.defaults
    }

    #[must_use]
    pub fn max_concurrency(&self) -> NonZeroUsize {
        self.max_concurrency
    }

    #[must_use]
    pub fn launcher(&self) -> &Path {
        &self.launcher
    }
}
