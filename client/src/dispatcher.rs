//! Concurrent foreground dispatch.
//!
//! One episode POSTs every element of an invocation to the same URL with at
//! most `limit` requests in flight. Completions arrive in any order; each is
//! tagged with its element index and written back into its slot, so the
//! returned vector lines up with the input.

use std::num::NonZeroUsize;
use std::time::Instant;

use futures_util::StreamExt;
use futures_util::stream;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};

use crate::error::{ElementFailure, TransportErrorKind};
use crate::{FieldValue, Fields};

/// What the transport handed back for one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawResponse {
    Body { status: StatusCode, text: String },
    Empty {
        kind: TransportErrorKind,
        status: Option<StatusCode>,
    },
}

impl RawResponse {
    const fn empty(kind: TransportErrorKind) -> Self {
        Self::Empty { kind, status: None }
    }

    /// The failure to report for this element, if any.
    ///
    /// A non-empty body with a success status is never a transport failure,
    /// even when the API says `ok: false`.
    pub(crate) fn failure(&self) -> Option<ElementFailure> {
        match self {
            Self::Empty { kind, status } => Some(ElementFailure::EmptyResponse {
                kind: *kind,
                status: *status,
            }),
            Self::Body { status, .. } if status.is_success() => None,
            Self::Body { status, text } => Some(ElementFailure::Api {
                status: *status,
                description: serde_json::from_str::<serde_json::Value>(text)
                    .ok()
                    .and_then(|body| {
                        body.get("description")
                            .and_then(serde_json::Value::as_str)
                            .map(str::to_string)
                    }),
            }),
        }
    }
}

/// Run one episode: POST every element, return raw responses in input order.
pub(crate) async fn fetch_all(
    http: &reqwest::Client,
    url: &str,
    elements: &[&Fields],
    limit: NonZeroUsize,
) -> Vec<RawResponse> {
    let started = Instant::now();
    let mut slots: Vec<Option<RawResponse>> = vec![None; elements.len()];

    let mut completions = stream::iter(elements.iter().copied().enumerate())
        .map(move |(index, fields)| async move { (index, post_fields(http, url, fields).await) })
        .buffer_unordered(limit.get());

    while let Some((index, raw)) = completions.next().await {
        slots[index] = Some(raw);
    }

    tracing::debug!(
        requests = elements.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "Dispatch episode complete"
    );

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or(RawResponse::empty(TransportErrorKind::Request)))
        .collect()
}

/// POST one field set. URL-encoded unless a field is a file.
pub(crate) async fn post_fields(http: &reqwest::Client, url: &str, fields: &Fields) -> RawResponse {
    let request = http.post(url);
    let request = if fields.has_files() {
        match multipart_form(fields).await {
            Ok(form) => request.multipart(form),
            Err(e) => {
                tracing::warn!(%e, "Failed to read upload file");
                return RawResponse::empty(TransportErrorKind::File);
            }
        }
    } else {
        request.form(&form_pairs(fields))
    };

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            let kind = TransportErrorKind::from_reqwest(&e);
            tracing::debug!(error = %e.without_url(), kind = kind.as_str(), "Request failed");
            return RawResponse::empty(kind);
        }
    };

    let status = response.status();
    match response.text().await {
        Ok(text) if !text.is_empty() => RawResponse::Body { status, text },
        Ok(_) => RawResponse::Empty {
            kind: TransportErrorKind::EmptyBody,
            status: Some(status),
        },
        Err(e) => RawResponse::Empty {
            kind: TransportErrorKind::from_reqwest(&e),
            status: Some(status),
        },
    }
}

fn form_pairs(fields: &Fields) -> Vec<(&str, String)> {
    fields
        .iter()
        .filter_map(|(name, value)| value.form_text().map(|text| (name, text)))
        .collect()
}

async fn multipart_form(fields: &Fields) -> std::io::Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields.iter() {
        form = match value {
            FieldValue::File(file) => {
                let bytes = tokio::fs::read(file.path()).await?;
                form.part(
                    name.to_string(),
                    Part::bytes(bytes).file_name(file.upload_name()),
                )
            }
            other => match other.form_text() {
                Some(text) => form.text(name.to_string(), text),
                None => form,
            },
        };
    }
    Ok(form)
}
