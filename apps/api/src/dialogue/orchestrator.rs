//! Dialogue Orchestrator — classify, dispatch to a strategy, record the exchange.
//!
//! Text flow:  classify_text → {advice | job search + summary | pass-through} → append
//! Image flow: classify_media_text → {greeting | upload hint | classify_image → resume feedback} → append
//!
//! Each turn is a straight-line decision tree: no re-classification and no retries.
//! A failed turn appends nothing to the conversation context.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::dialogue::classifier::{classify_image, classify_media_text, classify_text};
use crate::dialogue::context::{ConversationContext, Turn};
use crate::dialogue::error::TurnError;
use crate::dialogue::intent::{ImageTypeIntent, MediaRoutingIntent, TextRoutingIntent};
use crate::dialogue::prompts::{
    ADVICE_TEMPLATE, GREETING_REPLY, JOB_SUGGESTIONS_TEMPLATE, RESUME_FEEDBACK_TEMPLATE,
    UNSUPPORTED_IMAGE_REPLY, UPLOAD_RESUME_REPLY,
};
use crate::job_search::{search_or_degrade, JobSearchGateway};
use crate::llm_client::payload::{parse_payload, string_field};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{ImageBytes, ModelGateway};

/// Outcome of a text turn: the reply plus the intent it was routed by.
#[derive(Debug, Clone, Serialize)]
pub struct TextTurn {
    pub response: String,
    pub intent: TextRoutingIntent,
}

#[derive(Clone)]
pub struct DialogueOrchestrator {
    model: Arc<dyn ModelGateway>,
    jobs: Arc<dyn JobSearchGateway>,
}

impl DialogueOrchestrator {
    pub fn new(model: Arc<dyn ModelGateway>, jobs: Arc<dyn JobSearchGateway>) -> Self {
        Self { model, jobs }
    }

    /// Processes one text message against `ctx`.
    pub async fn handle_text(
        &self,
        ctx: &ConversationContext,
        prompt: &str,
    ) -> Result<TextTurn, TurnError> {
        let intent = classify_text(self.model.as_ref(), prompt).await?;
        info!("Text turn routed as {}", intent.label());

        let response = match &intent {
            TextRoutingIntent::CareerGuidance => {
                let contextual = ctx.contextualize(prompt).await;
                self.career_advice(&contextual).await?
            }
            TextRoutingIntent::JobSearch { query } => {
                let query = query
                    .as_deref()
                    .filter(|q| !q.trim().is_empty())
                    .ok_or(TurnError::MissingField { field: "query" })?;
                self.job_suggestions(query).await?
            }
            TextRoutingIntent::Other => {
                let contextual = ctx.contextualize(prompt).await;
                self.model.generate(&contextual).await?
            }
        };

        ctx.append_exchange(Turn::user(prompt), Turn::assistant(response.clone()))
            .await;

        Ok(TextTurn { response, intent })
    }

    /// Processes one image upload with its accompanying text against `ctx`.
    pub async fn handle_image(
        &self,
        ctx: &ConversationContext,
        image: &ImageBytes,
        prompt: &str,
    ) -> Result<String, TurnError> {
        let media_intent = classify_media_text(self.model.as_ref(), prompt).await?;
        info!("Image turn routed as {media_intent:?}");

        let response = match media_intent {
            MediaRoutingIntent::Greeting => GREETING_REPLY.to_string(),
            MediaRoutingIntent::Other => UPLOAD_RESUME_REPLY.to_string(),
            MediaRoutingIntent::ImageAnalysis => {
                match classify_image(self.model.as_ref(), image).await? {
                    ImageTypeIntent::Resume => {
                        let contextual = ctx.contextualize(prompt).await;
                        let instruction = RESUME_FEEDBACK_TEMPLATE.replace("{prompt}", &contextual);
                        self.model.analyze(image, &instruction).await?
                    }
                    ImageTypeIntent::Other => UNSUPPORTED_IMAGE_REPLY.to_string(),
                }
            }
        };

        ctx.append_exchange(Turn::user(prompt), Turn::assistant(response.clone()))
            .await;

        Ok(response)
    }

    async fn career_advice(&self, prompt: &str) -> Result<String, TurnError> {
        let instruction = ADVICE_TEMPLATE
            .replace("{json_only}", JSON_ONLY_INSTRUCTION)
            .replace("{prompt}", prompt);
        self.structured_field(&instruction, "advice").await
    }

    async fn job_suggestions(&self, query: &str) -> Result<String, TurnError> {
        let listings = search_or_degrade(self.jobs.as_ref(), query).await;
        let instruction = JOB_SUGGESTIONS_TEMPLATE
            .replace("{json_only}", JSON_ONLY_INSTRUCTION)
            .replace("{query}", query)
            .replace("{jobs}", &listings);
        self.structured_field(&instruction, "job_suggestions").await
    }

    /// Generates, parses, and pulls a single string field out of the reply.
    async fn structured_field(
        &self,
        instruction: &str,
        field: &'static str,
    ) -> Result<String, TurnError> {
        let raw = self.model.generate(instruction).await?;
        let payload = parse_payload(&raw)?;
        string_field(&payload, field, &raw)?.ok_or(TurnError::MissingField { field })
    }
}
