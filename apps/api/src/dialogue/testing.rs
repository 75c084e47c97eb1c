//! Scripted gateway stubs shared by the dialogue tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::job_search::{JobSearchGateway, SearchUnavailable};
use crate::llm_client::{GenerationError, ImageBytes, ModelGateway};

/// Replays canned replies in order, recording every prompt it receives.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    generate_prompts: Mutex<Vec<String>>,
    analyze_prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Every call fails with an upstream error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn generate_prompts(&self) -> Vec<String> {
        self.generate_prompts.lock().unwrap().clone()
    }

    pub fn analyze_prompts(&self) -> Vec<String> {
        self.analyze_prompts.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Result<String, GenerationError> {
        if self.fail {
            return Err(GenerationError::Api {
                status: 503,
                message: "upstream unavailable".to_string(),
            });
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedModel ran out of replies"))
    }
}

#[async_trait]
impl ModelGateway for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.generate_prompts.lock().unwrap().push(prompt.to_string());
        self.next_reply()
    }

    async fn analyze(&self, _image: &ImageBytes, prompt: &str) -> Result<String, GenerationError> {
        self.analyze_prompts.lock().unwrap().push(prompt.to_string());
        self.next_reply()
    }
}

/// Returns a fixed listing text (or a transport failure) and records queries.
#[derive(Default)]
pub struct StubJobs {
    listings: Option<String>,
    queries: Mutex<Vec<String>>,
}

impl StubJobs {
    pub fn returning(listings: impl Into<String>) -> Self {
        Self {
            listings: Some(listings.into()),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobSearchGateway for StubJobs {
    async fn search(&self, query: &str) -> Result<String, SearchUnavailable> {
        self.queries.lock().unwrap().push(query.to_string());
        self.listings.clone().ok_or_else(|| SearchUnavailable {
            cause: "connection refused".to_string(),
        })
    }
}
