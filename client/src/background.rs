//! Fire-and-forget dispatch through an external HTTP program.
//!
//! Each element becomes one detached process (`curl` by default) with stdio
//! discarded. The caller gets `Launched` as soon as the process is spawned;
//! the tokio runtime reaps it once it exits. Nothing about the remote outcome
//! is observed.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;

use crate::{FieldKind, FieldValue, Fields, Resolved};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("field {field:?} has kind {kind}, which cannot be sent in the background")]
pub(crate) struct UnsupportedField {
    field: String,
    kind: FieldKind,
}

/// Arguments for the launcher program: one POST of `fields` to `url`.
///
/// With any file present every field goes out as a multipart part (`-F` for
/// files, `--form-string` for scalars); otherwise the body is URL-encoded.
pub(crate) fn command_args(
    url: &str,
    fields: &Fields,
    timeout: Duration,
) -> Result<Vec<OsString>, UnsupportedField> {
    let multipart = fields.has_files();
    let mut args: Vec<OsString> = vec![
        "--silent".into(),
        "--max-time".into(),
        timeout.as_secs().max(1).to_string().into(),
    ];

    for (name, value) in fields.iter() {
        match value {
            FieldValue::File(file) => {
                let Some(path) = file.path().to_str() else {
                    return Err(UnsupportedField {
                        field: name.to_string(),
                        kind: value.kind(),
                    });
                };
                args.push("-F".into());
                args.push(
                    format!(
                        "{name}=@{};filename={}",
                        quoted(path),
                        quoted(&file.upload_name())
                    )
                    .into(),
                );
            }
            FieldValue::Bool(_) | FieldValue::Int(_) | FieldValue::Float(_) | FieldValue::Text(_) => {
                let text = value.form_text().unwrap_or_default();
                let flag = if multipart { "--form-string" } else { "--data-urlencode" };
                args.push(flag.into());
                args.push(format!("{name}={text}").into());
            }
            FieldValue::Json(_) => {
                return Err(UnsupportedField {
                    field: name.to_string(),
                    kind: value.kind(),
                });
            }
        }
    }

    if fields.is_empty() {
        args.push("--request".into());
        args.push("POST".into());
    }
    args.push(url.into());
    Ok(args)
}

/// Double-quote a `-F` part value so `;` and `,` in it stay literal.
fn quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Launch one detached process per element.
pub(crate) fn launch_all(
    program: &Path,
    url: &str,
    elements: &[&Fields],
    timeout: Duration,
) -> Vec<Resolved> {
    elements
        .iter()
        .map(|fields| launch(program, url, fields, timeout))
        .collect()
}

fn launch(program: &Path, url: &str, fields: &Fields, timeout: Duration) -> Resolved {
    let args = match command_args(url, fields, timeout) {
        Ok(args) => args,
        Err(e) => {
            tracing::warn!(%e, "Background request not launched");
            return Resolved::Failed;
        }
    };

    let spawned = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false)
        .spawn();

    match spawned {
        Ok(child) => {
            tracing::debug!(pid = child.id(), "Background request launched");
            Resolved::Launched
        }
        Err(e) => {
            tracing::warn!(%e, program = %program.display(), "Failed to spawn background request");
            Resolved::Failed
        }
    }
}
