//! Shared pipeline types.

use serde::{Deserialize, Serialize};

/// Open metadata mapping attached to documents and chunks.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Reserved metadata key holding the owning document id.
pub const DOCUMENT_ID_KEY: &str = "document_id";

/// Reserved metadata key holding the chunk position within its document.
pub const CHUNK_INDEX_KEY: &str = "chunk_index";

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 3;

/// Largest accepted `top_k`.
pub const MAX_TOP_K: usize = 10;

/// A chunk of an uploaded document, ready to be embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Owning document id
    pub document_id: String,

    /// Position in the document (0-indexed, contiguous)
    pub index: usize,

    /// Chunk text
    pub text: String,

    /// Caller metadata merged with the reserved keys
    pub metadata: Metadata,
}

impl Chunk {
    /// Create a chunk, merging caller metadata with `document_id` and
    /// `chunk_index`. Reserved keys overwrite caller keys of the same name.
    pub fn new(document_id: &str, index: usize, text: String, base: &Metadata) -> Self {
        let mut metadata = base.clone();
        metadata.insert(
            DOCUMENT_ID_KEY.to_string(),
            serde_json::Value::String(document_id.to_string()),
        );
        metadata.insert(CHUNK_INDEX_KEY.to_string(), serde_json::Value::from(index));

        Self {
            document_id: document_id.to_string(),
            index,
            text,
            metadata,
        }
    }
}

/// Outcome of a document upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// Generated document id
    pub document_id: String,

    /// Number of chunks written
    pub chunk_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reserved_keys_overwrite_caller_keys() {
        let mut base = Metadata::new();
        base.insert("source".to_string(), json!("wiki"));
        base.insert("document_id".to_string(), json!("spoofed"));
        base.insert("chunk_index".to_string(), json!(99));

        let chunk = Chunk::new("doc-1", 2, "text".to_string(), &base);

        assert_eq!(chunk.metadata["source"], json!("wiki"));
        assert_eq!(chunk.metadata["document_id"], json!("doc-1"));
        assert_eq!(chunk.metadata["chunk_index"], json!(2));
        assert_eq!(chunk.metadata.len(), 3);
    }

    #[test]
    fn test_empty_base_metadata() {
        let chunk = Chunk::new("doc-1", 0, "text".to_string(), &Metadata::new());
        assert_eq!(chunk.metadata.len(), 2);
    }
}
