//! In-process vector store with exact search.

use super::{CollectionSchema, DistanceMetric, ScoredRecord, StoreRecord, VectorStore};
use grounded_core::{AppError, AppResult};
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct MemCollection {
    dimension: usize,
    records: Vec<StoreRecord>,
}

/// Vector store keeping every collection in memory.
///
/// Search is a brute-force scan, which is exact. Used for local development
/// and as the store in pipeline tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, MemCollection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection, if it exists.
    pub async fn count(&self, collection: &str) -> Option<usize> {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|c| c.records.len())
    }
}

/// Score `candidate` against `query` under `metric`.
pub(crate) fn score(metric: DistanceMetric, query: &[f32], candidate: &[f32]) -> f32 {
    match metric {
        DistanceMetric::Ip => dot(query, candidate),
        DistanceMetric::Cosine => {
            let denom = norm(query) * norm(candidate);
            if denom == 0.0 {
                0.0
            } else {
                dot(query, candidate) / denom
            }
        }
        DistanceMetric::L2 => query
            .iter()
            .zip(candidate)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f32>()
            .sqrt(),
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(v: &[f32]) -> f32 {
    dot(v, v).sqrt()
}

#[async_trait::async_trait]
impl VectorStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn ensure_collection(&self, schema: &CollectionSchema) -> AppResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(schema.name.clone())
            .or_insert_with(|| {
                tracing::debug!(collection = %schema.name, dimension = schema.dimension, "Created in-memory collection");
                MemCollection {
                    dimension: schema.dimension,
                    records: Vec::new(),
                }
            });
        Ok(())
    }

    async fn upsert(&self, collection: &str, records: Vec<StoreRecord>) -> AppResult<usize> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| AppError::Store(format!("Collection not found: {}", collection)))?;

        for record in &records {
            record.validate(target.dimension)?;
        }

        let count = records.len();
        target.records.extend(records);
        Ok(count)
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
        metric: DistanceMetric,
    ) -> AppResult<Vec<ScoredRecord>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let collections = self.collections.read().await;
        let target = collections
            .get(collection)
            .ok_or_else(|| AppError::Store(format!("Collection not found: {}", collection)))?;

        if query.len() != target.dimension {
            return Err(AppError::Store(format!(
                "Query has dimension {}, collection expects {}",
                query.len(),
                target.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = target
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, score(metric, query, &r.vector)))
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| {
            let ord = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
            if metric.higher_is_better() {
                ord.reverse()
            } else {
                ord
            }
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(i, score)| {
                let record = &target.records[i];
                ScoredRecord {
                    id: record.id.clone(),
                    text: record.text.clone(),
                    metadata: record.metadata.clone(),
                    score,
                }
            })
            .collect())
    }

    async fn drop_collection(&self, collection: &str) -> AppResult<()> {
        if self.collections.write().await.remove(collection).is_some() {
            tracing::debug!(collection, "Dropped in-memory collection");
        }
        Ok(())
    }
}
