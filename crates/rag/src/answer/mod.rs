//! Grounded answering.
//!
//! Turns retrieved chunks into a natural language answer via a single LLM
//! call with the deployment's grounding prompt.

pub mod synthesizer;
pub mod types;

pub use synthesizer::{build_context, AnswerSynthesizer, GenerationSettings};
pub use types::{QueryResult, SourceRef};
