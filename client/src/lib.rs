//! Dispatch engine for the bot HTTP API.
//!
//! # Architecture
//!
//! One [`Client::dispatch`] call runs these stages in order:
//!
//! - parameter shape: a typed [`InvocationSpec`], or one inferred from JSON by
//!   [`Client::call_json`]
//! - options: per-call [`OptionOverrides`] layered over the client defaults
//! - execution: a concurrent foreground episode over the shared
//!   `reqwest::Client`, or one detached launcher process per element
//! - resolution: each raw response is shaped per [`OutputMode`]
//! - escalation: failed elements are reported with a `sendMessage` when
//!   `send_error` is set
//!
//! # Error Handling
//!
//! Only malformed input returns `Err` ([`DispatchError`]), and it does so
//! before any request is sent. Remote failures resolve the affected element
//! to [`Resolved::Failed`] without touching its siblings.
//!
//! # Concurrency
//!
//! Foreground episodes on one client are serialized. The gate covers the
//! start/collect phase only, so escalation, which runs its own episode, takes
//! the gate after the failing episode has released it.

mod background;
mod config;
mod dispatcher;
mod error;
mod escalation;
mod methods;
mod resolve;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::Mutex;

pub use botline_types;
pub use botline_types::{
    BatchKey, BotToken, ChatId, ChatIdParseError, DispatchResult, FieldKind, FieldValue, Fields,
    InputFile, InvocationSpec, MethodName, MethodNameError, OptionError, OptionOverrides, Options,
    OutputMode, Resolved, ShapeError, TokenError, UpdateContext,
};
pub use config::{
    ClientConfig, ConfigError, DEFAULT_API_BASE, DEFAULT_LAUNCHER, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_TIMEOUT_SECS, ENV_API_BASE, ENV_DIAGNOSTIC_CHAT, ENV_LAUNCHER, ENV_MAX_CONCURRENCY,
    ENV_TIMEOUT_SECS, ENV_TOKEN,
};
pub use error::DispatchError;
pub use methods::METHOD_NAMES;

pub(crate) use botline_types::{ApiEnvelope, ApiObject};

use dispatcher::RawResponse;

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_MAX_IDLE_PER_HOST: usize = 32;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

const NOTIFY_METHOD: &str = "sendMessage";

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
}

fn http_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder().timeout(timeout).build()
}

/// One dispatch: method, parameters, and optional per-call settings.
#[derive(Debug, Clone)]
pub struct DispatchRequest<'a> {
    method: &'a str,
    params: InvocationSpec,
    overrides: OptionOverrides,
    context: Option<&'a UpdateContext>,
}

impl<'a> DispatchRequest<'a> {
    #[must_use]
    pub fn new(method: &'a str, params: impl Into<InvocationSpec>) -> Self {
        Self {
            method,
            params: params.into(),
            overrides: OptionOverrides::default(),
            context: None,
        }
    }

    #[must_use]
    pub fn with_overrides(mut self, overrides: OptionOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Direct failure reports to the chat this update came from.
    #[must_use]
    pub fn with_context(mut self, context: &'a UpdateContext) -> Self {
        self.context = Some(context);
        self
    }
}

#[derive(Debug)]
pub struct Client {
    token: BotToken,
    api_base: String,
    timeout: Duration,
    diagnostic_chat: Option<ChatId>,
    defaults: Options,
    max_concurrency: NonZeroUsize,
    launcher: PathBuf,
    http: reqwest::Client,
    episode_gate: Mutex<()>,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let http = http_client_with_timeout(config.timeout()).map_err(ConfigError::HttpClient)?;
        Ok(Self {
            token: config.token().clone(),
            api_base: config.api_base().to_string(),
            timeout: config.timeout(),
            diagnostic_chat: config.diagnostic_chat().cloned(),
            defaults: config.defaults(),
            max_concurrency: config.max_concurrency(),
            launcher: config.launcher().to_path_buf(),
            http,
            episode_gate: Mutex::new(()),
        })
    }

    /// Build a client from `BOTLINE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env()?)
    }

    #[must_use]
    pub fn defaults(&self) -> Options {
        self.defaults
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn diagnostic_chat(&self) -> Option<&ChatId> {
        self.diagnostic_chat.as_ref()
    }

    /// Invoke `method` with client defaults.
    pub async fn call(
        &self,
        method: &str,
        params: impl Into<InvocationSpec>,
    ) -> Result<DispatchResult, DispatchError> {
        self.dispatch(DispatchRequest::new(method, params)).await
    }

    /// Invoke `method` with untyped parameters and options.
    ///
    /// `params` is classified as one invocation or a batch; `options` must be
    /// a mapping over `send_error`, `run_in_background` and `return`. Both are
    /// validated before anything is sent.
    pub async fn call_json(
        &self,
        method: &str,
        params: Value,
        options: &Value,
    ) -> Result<DispatchResult, DispatchError> {
        let params = InvocationSpec::from_json(params)?;
        let overrides = OptionOverrides::from_json(options)?;
        self.dispatch(DispatchRequest::new(method, params).with_overrides(overrides))
            .await
    }

    pub async fn dispatch(
        &self,
        request: DispatchRequest<'_>,
    ) -> Result<DispatchResult, DispatchError> {
        let DispatchRequest {
            method,
            params,
            overrides,
            context,
        } = request;
        let method = MethodName::new(method)?;
        let options = overrides.resolve(&self.defaults);
        let url = self.method_url(&method);

        let resolved = {
            let elements = params.elements();
            if options.run_in_background {
                tracing::debug!(%method, elements = elements.len(), "Launching background requests");
                background::launch_all(&self.launcher, &url, &elements, self.timeout)
            } else {
                let raw = self.run_episode(&url, &elements).await;
                let mut resolved = Vec::with_capacity(raw.len());
                for (index, (fields, raw)) in elements.iter().zip(&raw).enumerate() {
                    if let Some(failure) = raw.failure() {
                        tracing::warn!(%method, element = index, %failure, "Request failed");
                        if options.send_error {
                            escalation::report(self, &method, fields, &failure, context).await;
                        }
                    }
                    resolved.push(resolve::resolve(raw, options.output));
                }
                resolved
            }
        };

        Ok(assemble(params, resolved))
    }

    /// Send a diagnostic message. Never escalates; failures are dropped.
    pub(crate) async fn notify(&self, chat: &ChatId, text: &str) {
        let fields = Fields::new()
            .with("chat_id", chat.clone())
            .with("text", text);
        let url = format!(
            "{}/bot{}/{NOTIFY_METHOD}",
            self.api_base,
            self.token.expose_secret()
        );
        let raw = self.run_episode(&url, &[&fields]).await;
        if let Some(failure) = raw.first().and_then(RawResponse::failure) {
            tracing::debug!(%chat, %failure, "Failure report not delivered");
        }
    }

    fn method_url(&self, method: &MethodName) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base,
            self.token.expose_secret()
        )
    }

    async fn run_episode(&self, url: &str, elements: &[&Fields]) -> Vec<RawResponse> {
        let _gate = self.episode_gate.lock().await;
        dispatcher::fetch_all(&self.http, url, elements, self.max_concurrency).await
    }
}

fn assemble(params: InvocationSpec, resolved: Vec<Resolved>) -> DispatchResult {
    match params {
        InvocationSpec::Flat(_) => {
            DispatchResult::Single(resolved.into_iter().next().unwrap_or(Resolved::Failed))
        }
        InvocationSpec::Batched(entries) => DispatchResult::Batch(
            entries
                .into_iter()
                .map(|(key, _)| key)
                .zip(resolved)
                .collect(),
        ),
    }
}
