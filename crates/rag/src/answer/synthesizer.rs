//! Answer synthesis via the language model.

use crate::store::ScoredRecord;
use grounded_core::config::LlmSettings;
use grounded_core::AppResult;
use grounded_llm::{LlmClient, LlmRequest};
use grounded_prompt::{build_prompt, PromptDefinition};
use std::sync::Arc;

/// Separator placed between chunk texts in the prompt context.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Model parameters for answer generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl From<&LlmSettings> for GenerationSettings {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        }
    }
}

/// Join retrieved chunk texts, best match first, separated by a blank line.
pub fn build_context(hits: &[ScoredRecord]) -> String {
    hits.iter()
        .map(|h| h.text.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Generates answers grounded on retrieved chunks.
pub struct AnswerSynthesizer {
    llm: Arc<dyn LlmClient>,
    prompt: PromptDefinition,
    generation: GenerationSettings,
}

impl AnswerSynthesizer {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        prompt: PromptDefinition,
        generation: GenerationSettings,
    ) -> Self {
        Self {
            llm,
            prompt,
            generation,
        }
    }

    /// Answer `question` from `hits`.
    ///
    /// With no hits the context is empty and the template's decline
    /// instruction is left to the model.
    pub async fn synthesize(&self, question: &str, hits: &[ScoredRecord]) -> AppResult<String> {
        let context = build_context(hits);
        let built = build_prompt(&self.prompt, &context, question)?;

        let mut request = LlmRequest::new(built.user, self.generation.model.clone())
            .with_temperature(self.generation.temperature);
        if let Some(max_tokens) = self.generation.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        tracing::debug!(
            provider = self.llm.provider_name(),
            model = %self.generation.model,
            prompt_id = %built.metadata.source_prompt_id,
            chunks = hits.len(),
            "Generating answer"
        );

        let response = self.llm.complete(&request).await?;

        tracing::debug!(
            completion_tokens = response.usage.completion_tokens,
            "Answer generated"
        );

        Ok(response.content)
    }
}
