//! Intent classifiers: fixed instruction template → model call → payload parse → label check.

use crate::dialogue::error::TurnError;
use crate::dialogue::intent::{ImageTypeIntent, MediaRoutingIntent, TextRoutingIntent};
use crate::dialogue::prompts::{IMAGE_INTENT_TEMPLATE, MEDIA_INTENT_TEMPLATE, TEXT_INTENT_TEMPLATE};
use crate::llm_client::payload::parse_payload;
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{ImageBytes, ModelGateway};

/// career_guidance / job_search / other
pub async fn classify_text(
    model: &dyn ModelGateway,
    prompt: &str,
) -> Result<TextRoutingIntent, TurnError> {
    let instruction = TEXT_INTENT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{prompt}", prompt);
    let raw = model.generate(&instruction).await?;
    let payload = parse_payload(&raw)?;
    Ok(TextRoutingIntent::from_payload(&payload, &raw)?)
}

/// image_analysis / greeting / other, judged from the text sent with an upload.
pub async fn classify_media_text(
    model: &dyn ModelGateway,
    prompt: &str,
) -> Result<MediaRoutingIntent, TurnError> {
    let instruction = MEDIA_INTENT_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{prompt}", prompt);
    let raw = model.generate(&instruction).await?;
    let payload = parse_payload(&raw)?;
    Ok(MediaRoutingIntent::from_payload(&payload, &raw)?)
}

/// resume / other, judged from the image itself.
pub async fn classify_image(
    model: &dyn ModelGateway,
    image: &ImageBytes,
) -> Result<ImageTypeIntent, TurnError> {
    let instruction = IMAGE_INTENT_TEMPLATE.replace("{json_only}", JSON_ONLY_INSTRUCTION);
    let raw = model.analyze(image, &instruction).await?;
    let payload = parse_payload(&raw)?;
    Ok(ImageTypeIntent::from_payload(&payload, &raw)?)
}
