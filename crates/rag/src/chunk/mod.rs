//! Recursive character chunking.
//!
//! Splits document text into overlapping chunks of bounded length:
//! - Lengths are counted in characters, so Korean and ASCII text are measured alike
//! - Separators are tried in priority order, falling back to a hard character cut
//! - Small pieces are greedily merged back up to the chunk size with overlap

mod merging;
mod splitter;

pub use splitter::{RecursiveCharacterSplitter, DEFAULT_SEPARATORS};

use grounded_core::config::ChunkingSettings;
use grounded_core::{AppError, AppResult};

/// Configuration for the chunker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkConfig {
    /// Create a validated configuration.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        let config = Self {
            chunk_size,
            chunk_overlap,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that the sizes are usable.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::Validation(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Validation(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }

        Ok(())
    }
}

impl TryFrom<&ChunkingSettings> for ChunkConfig {
    type Error = AppError;

    fn try_from(settings: &ChunkingSettings) -> AppResult<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }
}

/// Character length used for every size comparison.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChunkConfig::default();
        assert_eq!(config.chunk_size, 1000);
        assert_eq!(config.chunk_overlap, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_size() {
        let err = ChunkConfig::new(100, 100).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(ChunkConfig::new(0, 0).is_err());
    }

    #[test]
    fn test_from_settings() {
        let settings = ChunkingSettings {
            chunk_size: 500,
            chunk_overlap: 50,
        };
        let config = ChunkConfig::try_from(&settings).unwrap();
        assert_eq!(config, ChunkConfig::new(500, 50).unwrap());
    }

    #[test]
    fn test_char_len_counts_characters() {
        assert_eq!(char_len("한국어"), 3);
        assert_eq!("한국어".len(), 9);
    }
}
