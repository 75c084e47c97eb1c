// Cross-cutting prompt fragments shared by every structured-output prompt.
// Feature-specific templates live in each feature's own prompts.rs.

/// Appended to every prompt that expects a JSON object back.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond only with valid JSON. \
    There should be no text or backticks before or after the JSON.";
