//! Prompt builder for rendering the grounding template.

use crate::types::{BuiltPrompt, PromptDefinition};
use grounded_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Template variable holding the retrieved context.
pub const CONTEXT_VAR: &str = "context";

/// Template variable holding the user question.
pub const QUESTION_VAR: &str = "question";

/// Build the grounding prompt from a definition, the retrieved context and
/// the raw question.
///
/// # Example
/// ```
/// use grounded_prompt::{build_prompt, builtin_prompt};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt("en")?;
/// let built = build_prompt(&def, "Paris is the capital of France.", "What is the capital of France?")?;
/// assert!(built.user.contains("Paris is the capital of France."));
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    context: &str,
    question: &str,
) -> AppResult<BuiltPrompt> {
    tracing::debug!(
        prompt_id = %definition.id,
        context_len = context.chars().count(),
        "Building prompt"
    );

    let mut variables = HashMap::new();
    variables.insert(CONTEXT_VAR.to_string(), context.to_string());
    variables.insert(QUESTION_VAR.to_string(), question.to_string());

    let rendered = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        definition.system.clone(),
        rendered,
        definition,
        variables,
    ))
}

/// Render a Handlebars template with variables.
///
/// Strict mode is on, so a template referring to a variable that was not
/// supplied fails instead of rendering an empty string.
pub(crate) fn render_template(
    template: &str,
    variables: &HashMap<String, String>,
) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Plain text prompts, no HTML escaping
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.set_strict_mode(true);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    let rendered = handlebars
        .render("prompt", &variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::builtin_prompt;

    #[test]
    fn test_render_simple_template() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "Hello, world!".to_string());

        let result = render_template("Question: {{question}}", &vars).unwrap();
        assert_eq!(result, "Question: Hello, world!");
    }

    #[test]
    fn test_render_template_missing_variable_fails() {
        let vars = HashMap::new();
        let err = render_template("Question: {{missing}}", &vars).unwrap_err();
        assert!(matches!(err, AppError::Prompt(_)));
    }

    #[test]
    fn test_no_html_escaping() {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "a < b && \"c\"".to_string());

        let result = render_template("{{question}}", &vars).unwrap();
        assert_eq!(result, "a < b && \"c\"");
    }

    #[test]
    fn test_build_korean_prompt() {
        let def = builtin_prompt("ko").unwrap();
        let built = build_prompt(&def, "파리는 프랑스의 수도입니다.", "프랑스의 수도는?").unwrap();

        assert!(built.user.contains("문맥:\n파리는 프랑스의 수도입니다."));
        assert!(built.user.contains("질문: 프랑스의 수도는?"));
        assert!(built.user.contains("주어진 정보로는 답변할 수 없습니다"));
        assert_eq!(built.metadata.language, "ko");
        assert_eq!(
            built.metadata.resolved_variables.get(QUESTION_VAR).map(String::as_str),
            Some("프랑스의 수도는?")
        );
    }

    #[test]
    fn test_build_prompt_with_empty_context() {
        let def = builtin_prompt("en").unwrap();
        let built = build_prompt(&def, "", "Who won?").unwrap();
        assert!(built.user.contains("Question: Who won?"));
        assert!(built.system.is_none());
    }

    #[test]
    fn test_system_message_passed_through() {
        let mut def = builtin_prompt("en").unwrap();
        def.system = Some("Cite {{nothing}} literally.".to_string());

        let built = build_prompt(&def, "ctx", "q").unwrap();
        assert_eq!(built.system.as_deref(), Some("Cite {{nothing}} literally."));
    }
}
