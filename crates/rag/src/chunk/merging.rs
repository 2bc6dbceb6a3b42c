//! Greedy merging of split pieces into overlapping chunks.

use super::{char_len, ChunkConfig};
use std::collections::VecDeque;

/// Merge consecutive small pieces into chunks of at most `chunk_size`
/// characters, carrying up to `chunk_overlap` characters into the next chunk.
///
/// Pieces are concatenated as-is since they already carry their separator.
pub(crate) fn merge_splits(splits: &[String], config: &ChunkConfig) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for piece in splits {
        let len = char_len(piece);

        if total + len > config.chunk_size {
            if total > config.chunk_size {
                tracing::warn!(
                    "Created a chunk of size {}, which is longer than the specified {}",
                    total,
                    config.chunk_size
                );
            }

            if !window.is_empty() {
                if let Some(chunk) = join_window(&window) {
                    chunks.push(chunk);
                }

                // Keep at most `chunk_overlap` characters, and make room for the next piece
                while total > config.chunk_overlap
                    || (total + len > config.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some(front) => total -= char_len(front),
                        None => break,
                    }
                }
            }
        }

        window.push_back(piece);
        total += len;
    }

    if let Some(chunk) = join_window(&window) {
        chunks.push(chunk);
    }

    chunks
}

fn join_window(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
