//! Prompt loader for built-in and file-based prompt definitions.

use crate::builder::{CONTEXT_VAR, QUESTION_VAR};
use crate::types::PromptDefinition;
use grounded_core::config::PromptSettings;
use grounded_core::{AppError, AppResult};
use std::path::Path;

const KOREAN_TEMPLATE: &str = "당신은 한국어를 이해하는 AI 어시스턴트입니다. 주어진 문맥을 바탕으로 질문에 답변해주세요.

문맥:
{{context}}

질문: {{question}}

답변은 한국어로 제공하며, 문맥에 없는 내용은 추측하지 말고 \"주어진 정보로는 답변할 수 없습니다\"라고 말해주세요.

답변:";

const ENGLISH_TEMPLATE: &str = "You are an AI assistant. Answer the question using only the context below.

Context:
{{context}}

Question: {{question}}

Answer in English. Do not guess at anything the context does not contain; instead say \"I cannot answer with the given information.\"

Answer:";

/// Get a built-in prompt by language code.
pub fn builtin_prompt(language: &str) -> AppResult<PromptDefinition> {
    let (template, title) = match language {
        "ko" => (KOREAN_TEMPLATE, "Korean grounded answer"),
        "en" => (ENGLISH_TEMPLATE, "English grounded answer"),
        other => {
            return Err(AppError::Prompt(format!(
                "No built-in prompt for language: {}",
                other
            )))
        }
    };

    Ok(PromptDefinition {
        id: format!("rag.answer.{}", language),
        title: title.to_string(),
        language: language.to_string(),
        system: None,
        template: template.to_string(),
    })
}

/// Load a prompt definition from a YAML file.
///
/// # Example
/// ```no_run
/// use grounded_prompt::load_prompt_file;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt_file(Path::new("prompts/answer.yaml"))?;
/// println!("Loaded prompt: {}", prompt.id);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt_file(path: &Path) -> AppResult<PromptDefinition> {
    tracing::debug!("Loading prompt from: {:?}", path);

    if !path.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            path
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse prompt YAML {:?}: {}", path, e))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.language);

    Ok(definition)
}

/// Resolve the prompt a deployment should use: the custom template file if
/// configured, the built-in template for the configured language otherwise.
pub fn resolve_prompt(settings: &PromptSettings) -> AppResult<PromptDefinition> {
    match &settings.template_file {
        Some(path) => load_prompt_file(path),
        None => builtin_prompt(&settings.language),
    }
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.trim().is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    for var in [CONTEXT_VAR, QUESTION_VAR] {
        let placeholder = format!("{{{{{}}}}}", var);
        if !def.template.contains(&placeholder) {
            return Err(AppError::Prompt(format!(
                "Prompt template {} must reference {}",
                def.id, placeholder
            )));
        }
    }

    Ok(())
}
