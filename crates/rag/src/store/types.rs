//! Vector store data types.

use crate::types::Metadata;
use grounded_core::config::{IndexSettings, VectorStoreSettings};
use grounded_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum primary key length accepted by the collection schema.
pub const MAX_ID_LENGTH: usize = 100;

/// Maximum text field length accepted by the collection schema.
pub const MAX_TEXT_LENGTH: usize = 65535;

/// Distance metric a collection is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance, lower is better
    L2,
    /// Cosine similarity, higher is better
    Cosine,
    /// Inner product, higher is better
    Ip,
}

impl DistanceMetric {
    /// Parse a metric name ("l2", "cosine", "ip").
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "l2" | "euclidean" => Ok(Self::L2),
            "cosine" => Ok(Self::Cosine),
            "ip" | "dot" => Ok(Self::Ip),
            other => Err(AppError::Config(format!("Unknown distance metric: {}", other))),
        }
    }

    /// Whether larger scores mean closer vectors.
    pub fn higher_is_better(&self) -> bool {
        !matches!(self, Self::L2)
    }

    /// Name used by the cluster backend.
    pub fn as_milvus(&self) -> &'static str {
        match self {
            Self::L2 => "L2",
            Self::Cosine => "COSINE",
            Self::Ip => "IP",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::L2 => "l2",
            Self::Cosine => "cosine",
            Self::Ip => "ip",
        };
        f.write_str(name)
    }
}

/// Approximate nearest-neighbour index built by backends that need one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnIndex {
    /// Inverted file index; `nprobe` clusters are scanned per search
    IvfFlat { nlist: u32, nprobe: u32 },
    /// Graph index; `ef` is the search candidate list size
    Hnsw { m: u32, ef_construction: u32, ef: u32 },
}

impl AnnIndex {
    /// Build from index settings.
    pub fn from_settings(settings: &IndexSettings) -> AppResult<Self> {
        match settings.index_type.to_uppercase().as_str() {
            "IVF_FLAT" => Ok(Self::IvfFlat {
                nlist: settings.nlist,
                nprobe: settings.nprobe,
            }),
            "HNSW" => Ok(Self::Hnsw {
                m: settings.m,
                ef_construction: settings.ef_construction,
                ef: settings.ef,
            }),
            other => Err(AppError::Config(format!("Unknown index type: {}", other))),
        }
    }

    /// Index type name used by the cluster backend.
    pub fn index_type(&self) -> &'static str {
        match self {
            Self::IvfFlat { .. } => "IVF_FLAT",
            Self::Hnsw { .. } => "HNSW",
        }
    }
}

impl Default for AnnIndex {
    fn default() -> Self {
        Self::IvfFlat {
            nlist: 1024,
            nprobe: 16,
        }
    }
}

/// Fixed schema of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSchema {
    pub name: String,
    pub dimension: usize,
    pub metric: DistanceMetric,
    pub index: AnnIndex,
}

impl CollectionSchema {
    /// Build the schema described by the vector store settings.
    pub fn from_settings(settings: &VectorStoreSettings, dimension: usize) -> AppResult<Self> {
        Ok(Self {
            name: settings.collection.clone(),
            dimension,
            metric: DistanceMetric::parse(&settings.distance)?,
            index: AnnIndex::from_settings(&settings.index)?,
        })
    }
}

/// A record written to a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Primary key
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
}

impl StoreRecord {
    /// Check the record against the schema's field limits.
    pub fn validate(&self, dimension: usize) -> AppResult<()> {
        if self.id.is_empty() || self.id.len() > MAX_ID_LENGTH {
            return Err(AppError::Store(format!(
                "Record id must be 1..={} bytes, got {}",
                MAX_ID_LENGTH,
                self.id.len()
            )));
        }

        if self.text.len() > MAX_TEXT_LENGTH {
            return Err(AppError::Store(format!(
                "Record {} text is {} bytes, limit is {}",
                self.id,
                self.text.len(),
                MAX_TEXT_LENGTH
            )));
        }

        if self.vector.len() != dimension {
            return Err(AppError::Store(format!(
                "Record {} has dimension {}, collection expects {}",
                self.id,
                self.vector.len(),
                dimension
            )));
        }

        Ok(())
    }
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    /// Similarity (cosine, ip) or distance (l2), as reported by the backend
    pub score: f32,
}

/// Vector store backend selected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Milvus,
    Qdrant,
    Memory,
}

impl StoreBackend {
    /// Parse a backend name.
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "milvus" => Ok(Self::Milvus),
            "qdrant" => Ok(Self::Qdrant),
            "memory" => Ok(Self::Memory),
            other => Err(AppError::Config(format!(
                "Unknown vector store backend: '{}'. Supported backends: milvus, qdrant, memory",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Milvus => "milvus",
            Self::Qdrant => "qdrant",
            Self::Memory => "memory",
        }
    }

    /// Port used when the configuration leaves it unset.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Self::Milvus => Some(19530),
            Self::Qdrant => Some(6334),
            Self::Memory => None,
        }
    }

    /// Whether stored chunks outlive the process.
    pub fn is_persistent(&self) -> bool {
        !matches!(self, Self::Memory)
    }
}
