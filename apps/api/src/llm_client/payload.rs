//! Structured payload extraction from loosely formatted model replies.
//!
//! Models wrap JSON in code fences or add commentary despite being told not to.
//! The candidate payload is the inclusive span from the first `{` to the last `}`;
//! everything outside it is ignored. No schema validation happens here.

use serde_json::{Map, Value};
use thiserror::Error;

/// The reply could not be decoded into a JSON object, or failed label validation
/// in a classifier. Carries the original text for diagnostics.
#[derive(Debug, Clone, Error)]
#[error("Malformed model payload ({reason}): {raw}")]
pub struct MalformedPayload {
    pub raw: String,
    pub reason: String,
}

impl MalformedPayload {
    pub fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Decoded key/value payload.
pub type Payload = Map<String, Value>;

/// Extracts and decodes the JSON object embedded in `raw`.
pub fn parse_payload(raw: &str) -> Result<Payload, MalformedPayload> {
    let candidate = extract_object_span(raw)
        .ok_or_else(|| MalformedPayload::new(raw, "no JSON object found"))?;

    serde_json::from_str::<Payload>(candidate).map_err(|e| MalformedPayload::new(raw, e.to_string()))
}

/// Returns the inclusive substring between the first `{` and the last `}`.
fn extract_object_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Reads a string field from a decoded payload.
///
/// Absent and null both read as `None`. A present value of any other type is
/// malformed rather than missing.
pub fn string_field(
    payload: &Payload,
    key: &str,
    raw: &str,
) -> Result<Option<String>, MalformedPayload> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(MalformedPayload::new(
            raw,
            format!("field `{key}` is not a string: {other}"),
        )),
    }
}
