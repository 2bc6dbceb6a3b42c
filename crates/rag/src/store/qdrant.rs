//! Qdrant vector store backend.
//!
//! Uses [qdrant-client](https://docs.rs/qdrant-client) over gRPC. Collections
//! only declare their vector size and distance; Qdrant manages indexing.
//! Chunk text and metadata travel as point payload.

use super::{CollectionSchema, DistanceMetric, ScoredRecord, StoreRecord, VectorStore};
use crate::types::Metadata;
use async_trait::async_trait;
use grounded_core::{AppError, AppResult};
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

const TEXT_KEY: &str = "text";
const METADATA_KEY: &str = "metadata";

/// A [`VectorStore`] backed by [Qdrant](https://qdrant.tech/).
pub struct QdrantStore {
    client: Qdrant,
}

impl QdrantStore {
    /// Connect to the Qdrant gRPC endpoint at `url`.
    pub fn new(url: &str, api_key: Option<&str>) -> AppResult<Self> {
        // Version probing would dial the server before the first real call
        let mut builder = Qdrant::from_url(url).skip_compatibility_check();
        if let Some(key) = api_key {
            builder = builder.api_key(key);
        }
        let client = builder.build().map_err(map_err)?;
        Ok(Self { client })
    }
}

fn map_err(e: QdrantError) -> AppError {
    AppError::Store(format!("Qdrant error: {}", e))
}

fn to_distance(metric: DistanceMetric) -> Distance {
    match metric {
        DistanceMetric::L2 => Distance::Euclid,
        DistanceMetric::Cosine => Distance::Cosine,
        DistanceMetric::Ip => Distance::Dot,
    }
}

/// Convert a payload value back into JSON.
fn to_json(value: &QdrantValue) -> Value {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(*b),
        Some(Kind::IntegerValue(i)) => Value::from(*i),
        Some(Kind::DoubleValue(d)) => Value::from(*d),
        Some(Kind::StringValue(s)) => Value::String(s.clone()),
        Some(Kind::ListValue(list)) => Value::Array(list.values.iter().map(to_json).collect()),
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

fn from_payload(payload: &HashMap<String, QdrantValue>) -> (String, Metadata) {
    let text = match payload.get(TEXT_KEY).map(to_json) {
        Some(Value::String(s)) => s,
        _ => String::new(),
    };
    let metadata = match payload.get(METADATA_KEY).map(to_json) {
        Some(Value::Object(map)) => map,
        _ => Metadata::new(),
    };
    (text, metadata)
}

fn point_id_string(options: Option<&PointIdOptions>) -> String {
    match options {
        Some(PointIdOptions::Uuid(s)) => s.clone(),
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    fn backend_name(&self) -> &str {
        "qdrant"
    }

    async fn ensure_collection(&self, schema: &CollectionSchema) -> AppResult<()> {
        if self
            .client
            .collection_exists(&schema.name)
            .await
            .map_err(map_err)?
        {
            debug!(collection = %schema.name, "Qdrant collection already exists");
            return Ok(());
        }

        let result = self
            .client
            .create_collection(
                CreateCollectionBuilder::new(&schema.name).vectors_config(VectorParamsBuilder::new(
                    schema.dimension as u64,
                    to_distance(schema.metric),
                )),
            )
            .await;

        match result {
            Ok(_) => {
                info!(collection = %schema.name, dimension = schema.dimension, "Created Qdrant collection");
                Ok(())
            }
            Err(e) if e.to_string().contains("already exists") => {
                debug!(collection = %schema.name, "Qdrant collection created concurrently");
                Ok(())
            }
            Err(e) => Err(map_err(e)),
        }
    }

    async fn upsert(&self, collection: &str, records: Vec<StoreRecord>) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let count = records.len();
        let points = records
            .into_iter()
            .map(|record| {
                let mut payload = serde_json::Map::new();
                payload.insert(TEXT_KEY.to_string(), Value::String(record.text));
                payload.insert(METADATA_KEY.to_string(), Value::Object(record.metadata));
                let payload = Payload::try_from(Value::Object(payload)).map_err(map_err)?;
                Ok(PointStruct::new(record.id, record.vector, payload))
            })
            .collect::<AppResult<Vec<PointStruct>>>()?;

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(map_err)?;

        debug!(collection, count, "Upserted points to Qdrant");
        Ok(count)
    }

    async fn search(
        &self,
        collection: &str,
        query: &[f32],
        top_k: usize,
        _metric: DistanceMetric,
    ) -> AppResult<Vec<ScoredRecord>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        // The collection's distance was fixed at creation; Qdrant applies it
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(collection, query.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(map_err)?;

        Ok(response
            .result
            .into_iter()
            .map(|point| {
                let (text, metadata) = from_payload(&point.payload);
                ScoredRecord {
                    id: point_id_string(
                        point.id.as_ref().and_then(|id| id.point_id_options.as_ref()),
                    ),
                    text,
                    metadata,
                    score: point.score,
                }
            })
            .collect())
    }

    async fn drop_collection(&self, collection: &str) -> AppResult<()> {
        if !self
            .client
            .collection_exists(collection)
            .await
            .map_err(map_err)?
        {
            return Ok(());
        }

        self.client
            .delete_collection(collection)
            .await
            .map_err(map_err)?;
        info!(collection, "Dropped Qdrant collection");
        Ok(())
    }
}
