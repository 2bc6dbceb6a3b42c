//! Prompt system for grounded.
//!
//! This crate provides the grounding prompt used for answer synthesis:
//! - Built-in Korean and English templates
//! - YAML-based custom prompt definitions
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{builtin_prompt, load_prompt_file, resolve_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition};
