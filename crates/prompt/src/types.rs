//! Prompt types for grounded.
//!
//! This module defines the domain entities for the grounding prompt.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt definition, either built in or loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// Language code the template answers in ("ko", "en", ...)
    #[serde(default = "default_language")]
    pub language: String,

    /// System message sent ahead of the rendered template, used verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Template string with Handlebars syntax. Must reference
    /// `{{context}}` and `{{question}}`.
    pub template: String,
}

fn default_language() -> String {
    "ko".to_string()
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Language of the source prompt
    pub language: String,

    /// Template variables that were resolved
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: HashMap<String, String>,
}

impl BuiltPrompt {
    /// Create a new built prompt.
    pub fn new(
        system: Option<String>,
        user: String,
        definition: &PromptDefinition,
        resolved_variables: HashMap<String, String>,
    ) -> Self {
        Self {
            system,
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id: definition.id.clone(),
                language: definition.language.clone(),
                resolved_variables,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: rag.answer.custom
title: Custom answer prompt
language: en
template: "Context: {{context}} Q: {{question}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "rag.answer.custom");
        assert_eq!(def.language, "en");
        assert!(def.template.contains("{{question}}"));
    }

    #[test]
    fn test_language_defaults_to_korean() {
        let yaml = "id: x\ntemplate: \"{{context}} {{question}}\"\n";
        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.language, "ko");
        assert!(def.title.is_empty());
        assert!(def.system.is_none());
    }

    #[test]
    fn test_built_prompt_creation() {
        let def = PromptDefinition {
            id: "rag.answer.en".to_string(),
            title: String::new(),
            language: "en".to_string(),
            system: None,
            template: "{{context}}{{question}}".to_string(),
        };
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "test".to_string());

        let built = BuiltPrompt::new(None, "User message".to_string(), &def, vars);

        assert_eq!(built.system, None);
        assert_eq!(built.user, "User message");
        assert_eq!(built.metadata.source_prompt_id, "rag.answer.en");
        assert_eq!(built.metadata.language, "en");
    }
}
