//! Raw response to caller-visible value.

use serde_json::Value;

use crate::dispatcher::RawResponse;
use crate::{ApiEnvelope, ApiObject, OutputMode, Resolved};

/// Resolve one raw response in the requested mode.
///
/// Empty responses are `Failed` in every mode. Decoding problems and
/// unsuccessful API calls are `Failed` in the decoding modes; `RawResponse`
/// mode returns any non-empty body verbatim.
pub(crate) fn resolve(raw: &RawResponse, mode: OutputMode) -> Resolved {
    let RawResponse::Body { text, .. } = raw else {
        return Resolved::Failed;
    };

    match mode {
        OutputMode::RawResponse => Resolved::Raw(text.clone()),
        OutputMode::RawResponseMap => serde_json::from_str::<Value>(text)
            .ok()
            .filter(|value| value.is_object() || value.is_array())
            .map_or(Resolved::Failed, Resolved::Map),
        OutputMode::RawResponseObject => {
            ApiEnvelope::parse(text).map_or(Resolved::Failed, Resolved::Envelope)
        }
        OutputMode::ResultMap => successful_result(text).map_or(Resolved::Failed, Resolved::Map),
        OutputMode::ResultObject => successful_result(text)
            .map_or(Resolved::Failed, |value| Resolved::Object(ApiObject::new(value))),
    }
}

fn successful_result(text: &str) -> Option<Value> {
    ApiEnvelope::parse(text).ok()?.successful_result()
}
