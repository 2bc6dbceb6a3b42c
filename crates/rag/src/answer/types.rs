//! Query response types.

use crate::store::ScoredRecord;
use crate::types::Metadata;
use serde::{Deserialize, Serialize};

/// A retrieved chunk returned alongside the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Chunk text as stored
    pub content: String,

    /// Stored metadata, including `document_id` and `chunk_index`
    pub metadata: Metadata,
}

impl From<ScoredRecord> for SourceRef {
    fn from(record: ScoredRecord) -> Self {
        Self {
            content: record.text,
            metadata: record.metadata,
        }
    }
}

/// Response to a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Answer synthesized by the LLM
    pub answer: String,

    /// Chunks the answer was grounded on, in retrieval-rank order
    pub sources: Vec<SourceRef>,

    /// Internal: score of the best hit as reported by the store.
    /// Logged, never shown to callers.
    #[serde(skip)]
    pub top_score: Option<f32>,
}

impl QueryResult {
    pub fn new(answer: String, hits: Vec<ScoredRecord>) -> Self {
        let top_score = hits.first().map(|h| h.score);
        Self {
            answer,
            sources: hits.into_iter().map(SourceRef::from).collect(),
            top_score,
        }
    }
}
