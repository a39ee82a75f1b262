//! Diagnostic reports for failed elements.
//!
//! A report is a plain `sendMessage` issued through [`Client::notify`], which
//! takes no options and has no escalation stage of its own. A failure while
//! reporting therefore ends here.

use crate::error::ElementFailure;
use crate::{ChatId, Client, Fields, MethodName, UpdateContext};

/// Message length accepted by `sendMessage`, in characters.
const MAX_MESSAGE_CHARS: usize = 4096;

/// Report one failed element to every distinct target.
pub(crate) async fn report(
    client: &Client,
    method: &MethodName,
    fields: &Fields,
    failure: &ElementFailure,
    context: Option<&UpdateContext>,
) {
    let text = diagnostic_text(method, failure, fields);
    for chat in targets(context, client.diagnostic_chat()) {
        client.notify(&chat, &text).await;
    }
}

/// The update's chat (or sender) first, then the diagnostic chat if different.
fn targets(context: Option<&UpdateContext>, diagnostic: Option<&ChatId>) -> Vec<ChatId> {
    let mut targets = Vec::with_capacity(2);
    if let Some(chat) = context.and_then(UpdateContext::report_target) {
        targets.push(chat.clone());
    }
    if let Some(chat) = diagnostic
        && !targets.contains(chat)
    {
        targets.push(chat.clone());
    }
    targets
}

fn diagnostic_text(method: &MethodName, failure: &ElementFailure, fields: &Fields) -> String {
    let params = serde_json::to_string_pretty(&fields.to_json()).unwrap_or_default();
    let text = format!("{method} failed: {failure}\n\nParameters:\n{params}");
    truncate_chars(text, MAX_MESSAGE_CHARS)
}

fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((cut, _)) = text.char_indices().nth(max) {
        text.truncate(cut);
    }
    text
}
