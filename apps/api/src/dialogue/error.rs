use thiserror::Error;

use crate::llm_client::payload::MalformedPayload;
use crate::llm_client::GenerationError;

/// Turn-level failure. Never defaulted into a reply; the caller decides how to render it.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    MalformedPayload(#[from] MalformedPayload),

    #[error("Model reply is missing required field `{field}`")]
    MissingField { field: &'static str },

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
}

impl TurnError {
    pub fn code(&self) -> &'static str {
        match self {
            TurnError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            TurnError::MissingField { .. } => "MISSING_FIELD",
            TurnError::Generation(_) => "GENERATION_ERROR",
        }
    }
}
