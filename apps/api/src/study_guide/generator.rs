//! Study Guide Generation: the generator capability and its LLM-backed implementation.
//!
//! Flow: resolved params → system + user prompt → one completion call →
//!       section-header normalization → `StudyGuideDocument`.
//!
//! `AppState` holds an `Arc<dyn StudyGuideGenerator>`, chosen once at startup
//! by `build_generator` (mock or live).

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::llm_client::{ChatMessage, ChatRequest, CompletionClient, LlmClient, LlmError};
use crate::study_guide::mock::MockStudyGuideGenerator;
use crate::study_guide::models::{StudyGuideDocument, StudyGuideParams};
use crate::study_guide::prompts::{system_prompt, user_prompt, SECTION_NAMES};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 4000;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Error generating study guide: {0}")]
    Provider(#[from] LlmError),
}

/// Produces a study guide from resolved request parameters.
///
/// Implement this to swap backends without touching the handler.
#[async_trait]
pub trait StudyGuideGenerator: Send + Sync {
    async fn generate(&self, params: &StudyGuideParams)
        -> Result<StudyGuideDocument, GenerationError>;

    /// Short backend name reported by the health probe: "llm" | "mock".
    fn backend(&self) -> &'static str;
}

/// Generator backed by the completion provider.
pub struct LlmStudyGuideGenerator {
    client: Option<Arc<dyn CompletionClient>>,
}

impl LlmStudyGuideGenerator {
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// A generator with no provider credential. Every call fails with
    /// `LlmError::MissingApiKey` and makes no network request.
    pub fn without_credentials() -> Self {
        Self { client: None }
    }
}

#[async_trait]
impl StudyGuideGenerator for LlmStudyGuideGenerator {
    async fn generate(
        &self,
        params: &StudyGuideParams,
    ) -> Result<StudyGuideDocument, GenerationError> {
        let client = self.client.as_ref().ok_or(LlmError::MissingApiKey)?;

        let text = client.complete(&build_chat_request(params)).await?;
        let guide = ensure_section_header(text, params);

        let present = guide.section_names();
        let missing: Vec<&str> = SECTION_NAMES
            .iter()
            .copied()
            .filter(|name| !present.contains(name))
            .collect();
        if !missing.is_empty() {
            warn!(
                "Study guide for {} / {} is missing sections: {}",
                params.class,
                params.unit,
                missing.join(", ")
            );
        }

        Ok(guide)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

/// Two-message exchange (system, then user) with fixed sampling settings.
pub fn build_chat_request(params: &StudyGuideParams) -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system(system_prompt()),
            ChatMessage::user(user_prompt(params)),
        ],
        temperature: Some(TEMPERATURE),
        max_tokens: Some(MAX_TOKENS),
    }
}

/// Passes text that already opens with a section marker through untouched;
/// otherwise prepends a `STUDY GUIDE FOR {CLASS} - {UNIT}` title marker.
pub fn ensure_section_header(text: String, params: &StudyGuideParams) -> StudyGuideDocument {
    let guide = StudyGuideDocument::new(text);
    if guide.has_section_header() {
        return guide;
    }

    StudyGuideDocument::new(format!("{}\n\n{}", params.title_marker(), guide.as_str()))
}

/// Picks the generator implementation once, at startup.
///
/// A missing credential is not fatal: the live generator is installed without
/// a client and reports the configuration error on every request.
pub fn build_generator(config: &Config) -> Result<Arc<dyn StudyGuideGenerator>, LlmError> {
    if config.use_mock_api {
        info!("USE_MOCK_API is set, using mock study guide generator");
        return Ok(Arc::new(MockStudyGuideGenerator));
    }

    match LlmClient::new(&config.provider) {
        Ok(llm) => {
            info!(
                "LLM client initialized (model: {}, base_url: {})",
                llm.model(),
                config.provider.base_url
            );
            Ok(Arc::new(LlmStudyGuideGenerator::new(Arc::new(llm))))
        }
        Err(LlmError::MissingApiKey) => {
            warn!("DEEPSEEK_API_KEY is not set, study guide generation will fail until it is configured");
            Ok(Arc::new(LlmStudyGuideGenerator::without_credentials()))
        }
        Err(e) => Err(e),
    }
}
