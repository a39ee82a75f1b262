//! Botline CLI - call bot API methods from the shell.
//!
//! # Commands
//!
//! ```text
//! botline call <method> [-p key=value]... [--file key=path]... [--batch FILE]
//! botline parse-update [FILE]
//! botline check-ip <addr>
//! ```
//!
//! `call` reads its client settings from `BOTLINE_*` environment variables;
//! flags override them. Results are printed to stdout as JSON; logs go to
//! stderr. A call exits non-zero when any element resolved to `false`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

use botline_client::botline_types::{Update, verify_source};
use botline_client::{
    ChatId, Client, ClientConfig, DispatchRequest, DispatchResult, FieldValue, Fields, InputFile,
    InvocationSpec, OptionOverrides, OutputMode, UpdateContext,
};

#[derive(Debug, Parser)]
#[command(name = "botline", version, about = "Call bot API methods from the shell")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Invoke one method, once or for every element of a batch.
    Call(CallArgs),
    /// Parse an update (file or stdin) and print its sender and chat.
    ParseUpdate {
        file: Option<PathBuf>,
    },
    /// Exit non-zero unless the address is inside the webhook source ranges.
    CheckIp {
        addr: String,
    },
}

#[derive(Debug, Args)]
struct CallArgs {
    method: String,

    /// Scalar parameter; numbers and booleans are sent as such.
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// File to upload as a multipart part.
    #[arg(long = "file", value_name = "KEY=PATH")]
    files: Vec<String>,

    /// JSON parameter set: an object for one call, an array or object of objects for a batch.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["params", "files"])]
    batch: Option<PathBuf>,

    /// Launch detached requests and return without waiting for them.
    #[arg(long)]
    background: bool,

    #[arg(long = "return", value_name = "MODE")]
    output: Option<OutputMode>,

    /// Do not report failures to the diagnostic chat.
    #[arg(long)]
    no_send_error: bool,

    /// Update JSON whose chat should receive failure reports.
    #[arg(long, value_name = "FILE")]
    update: Option<PathBuf>,

    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    #[arg(long, value_name = "CHAT")]
    diagnostic_chat: Option<ChatId>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    match Cli::parse().command {
        Command::Call(args) => call(args).await,
        Command::ParseUpdate { file } => parse_update(file).await,
        Command::CheckIp { addr } => {
            let addr = verify_source(&addr)?;
            println!("{addr} is trusted");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn call(args: CallArgs) -> Result<ExitCode> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base) = &args.api_base {
        config = config.with_api_base(base)?;
    }
    if let Some(secs) = args.timeout {
        if secs == 0 {
            bail!("--timeout must be at least 1 second");
        }
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(chat) = args.diagnostic_chat.clone() {
        config = config.with_diagnostic_chat(chat);
    }
    let client = Client::new(config)?;

    let params = match &args.batch {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let value: Value = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            InvocationSpec::from_json(value)?
        }
        None => InvocationSpec::Flat(fields_from_args(&args.params, &args.files)?),
    };

    let mut overrides = OptionOverrides::new();
    if args.background {
        overrides = overrides.run_in_background(true);
    }
    if args.no_send_error {
        overrides = overrides.send_error(false);
    }
    if let Some(mode) = args.output {
        overrides = overrides.output(mode);
    }

    let context = match &args.update {
        Some(path) => Some(read_update(Some(path)).await?.context()),
        None => None,
    };

    let mut request = DispatchRequest::new(&args.method, params).with_overrides(overrides);
    if let Some(context) = &context {
        request = request.with_context(context);
    }
    let result = client.dispatch(request).await?;

    println!("{}", serde_json::to_string_pretty(&result.to_json())?);
    Ok(if any_failed(&result) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn any_failed(result: &DispatchResult) -> bool {
    match result {
        DispatchResult::Single(resolved) => resolved.is_failed(),
        DispatchResult::Batch(entries) => entries.iter().any(|(_, resolved)| resolved.is_failed()),
    }
}

fn fields_from_args(params: &[String], files: &[String]) -> Result<Fields> {
    let mut fields = Fields::new();
    for raw in params {
        let (name, value) = split_pair(raw)?;
        fields.insert(name, scalar_value(value));
    }
    for raw in files {
        let (name, path) = split_pair(raw)?;
        fields.insert(name, InputFile::new(path));
    }
    Ok(fields)
}

fn split_pair(raw: &str) -> Result<(&str, &str)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name, value)),
        _ => bail!("expected KEY=VALUE, got {raw:?}"),
    }
}

/// `123` is an integer and `true` a boolean; anything else is sent as text.
fn scalar_value(raw: &str) -> FieldValue {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Bool(_) | Value::Number(_))) => {
            FieldValue::from_json(value).unwrap_or_else(|| FieldValue::from(raw))
        }
        _ => FieldValue::from(raw),
    }
}

async fn read_update(file: Option<&PathBuf>) -> Result<Update> {
    let body = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut body = String::new();
            tokio::io::stdin().read_to_string(&mut body).await?;
            body
        }
    };
    Ok(Update::parse(&body)?)
}

async fn parse_update(file: Option<PathBuf>) -> Result<ExitCode> {
    let update = read_update(file.as_ref()).await?;
    let UpdateContext { from, from_chat } = update.context();
    let summary = json!({
        "kind": update.kind().key(),
        "update_id": update.update_id(),
        "from": from.as_ref().map(chat_json),
        "from_chat": from_chat.as_ref().map(chat_json),
        "message_id": update.message_id(),
        "text": update.text(),
        "query_id": update.query_id(),
        "username": update.username(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::SUCCESS)
}

fn chat_json(chat: &ChatId) -> Value {
    match chat {
        ChatId::Id(id) => json!(id),
        ChatId::Username(name) => json!(name),
    }
}
