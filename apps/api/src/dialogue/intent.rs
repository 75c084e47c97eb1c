//! Intent results — one closed label set per classifier.
//!
//! Labels are decoded with serde from the payload's `intent` field, so any
//! label outside the enumerated set is rejected instead of falling through
//! to a default.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::llm_client::payload::{string_field, MalformedPayload, Payload};

/// Routing decision for a plain text turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum TextRoutingIntent {
    CareerGuidance,
    /// `query` is whatever the classifier returned; `None` when it sent null or nothing.
    JobSearch { query: Option<String> },
    Other,
}

impl TextRoutingIntent {
    pub fn label(&self) -> &'static str {
        match self {
            TextRoutingIntent::CareerGuidance => "career_guidance",
            TextRoutingIntent::JobSearch { .. } => "job_search",
            TextRoutingIntent::Other => "other",
        }
    }
}

/// Decides whether the text accompanying an upload asks for image analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaRoutingIntent {
    ImageAnalysis,
    Greeting,
    Other,
}

/// What the uploaded image itself is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageTypeIntent {
    Resume,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TextLabel {
    CareerGuidance,
    JobSearch,
    Other,
}

/// Decodes the `intent` field of `payload` into the closed label set `L`.
fn decode_label<L: DeserializeOwned>(payload: &Payload, raw: &str) -> Result<L, MalformedPayload> {
    let value = payload
        .get("intent")
        .cloned()
        .ok_or_else(|| MalformedPayload::new(raw, "missing `intent` field"))?;

    serde_json::from_value::<L>(value.clone())
        .map_err(|_| MalformedPayload::new(raw, format!("unrecognized intent label {value}")))
}

impl TextRoutingIntent {
    pub fn from_payload(payload: &Payload, raw: &str) -> Result<Self, MalformedPayload> {
        Ok(match decode_label::<TextLabel>(payload, raw)? {
            TextLabel::CareerGuidance => TextRoutingIntent::CareerGuidance,
            TextLabel::JobSearch => TextRoutingIntent::JobSearch {
                query: string_field(payload, "query", raw)?,
            },
            TextLabel::Other => TextRoutingIntent::Other,
        })
    }
}

impl MediaRoutingIntent {
    pub fn from_payload(payload: &Payload, raw: &str) -> Result<Self, MalformedPayload> {
        decode_label(payload, raw)
    }
}

impl ImageTypeIntent {
    pub fn from_payload(payload: &Payload, raw: &str) -> Result<Self, MalformedPayload> {
        decode_label(payload, raw)
    }
}
