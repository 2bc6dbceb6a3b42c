//! Recursive character splitter.

use super::merging::merge_splits;
use super::{char_len, ChunkConfig};

/// Separators in priority order. The empty separator is a raw character cut.
pub const DEFAULT_SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Splits text on the highest-priority separator present, recursing into
/// oversized pieces with the remaining separators.
#[derive(Debug, Clone)]
pub struct RecursiveCharacterSplitter {
    config: ChunkConfig,
    separators: Vec<String>,
}

impl RecursiveCharacterSplitter {
    /// Create a splitter with the default separators.
    pub fn new(config: ChunkConfig) -> Self {
        Self::with_separators(config, DEFAULT_SEPARATORS.iter().map(|s| s.to_string()))
    }

    /// Splitter with custom separators, highest priority first.
    fn with_separators(
        config: ChunkConfig,
        separators: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            config,
            separators: separators.into_iter().collect(),
        }
    }

    /// Split text into ordered chunks. Empty input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let chunks = self.split_recursive(text, &self.separators);

        tracing::debug!(
            chunks = chunks.len(),
            chars = char_len(text),
            "Split text into chunks"
        );

        chunks
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, remaining) = pick_separator(text, separators);
        let splits = split_keep_separator(text, separator);

        let mut chunks = Vec::new();
        let mut good: Vec<String> = Vec::new();

        for piece in splits {
            if char_len(&piece) < self.config.chunk_size {
                good.push(piece);
                continue;
            }

            if !good.is_empty() {
                chunks.extend(merge_splits(&good, &self.config));
                good.clear();
            }

            if remaining.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_recursive(&piece, remaining));
            }
        }

        if !good.is_empty() {
            chunks.extend(merge_splits(&good, &self.config));
        }

        chunks
    }
}

/// Pick the first separator present in `text` and the separators left to
/// recurse with. The empty separator always matches and ends recursion.
fn pick_separator<'a>(text: &str, separators: &'a [String]) -> (&'a str, &'a [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator, &separators[i + 1..]);
        }
    }

    let last = separators.last().map(String::as_str).unwrap_or("");
    (last, &[])
}

/// Split on `separator`, attaching each separator to the start of the piece
/// that follows it. Empty pieces are dropped.
fn split_keep_separator(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        return text.chars().map(String::from).collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(text[start..idx].to_string());
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(text[start..].to_string());
    }

    pieces
}
