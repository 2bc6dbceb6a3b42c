//! Milvus vector store backend.
//!
//! Talks to the Milvus RESTful API (v2) with `reqwest`. Every response is an
//! envelope `{code, data, message}`; a non-zero `code` is a failure even when
//! the HTTP status is 200.
//!
//! Collections are created with an explicit schema (`pk`, `text`, `vector`,
//! `metadata`) and an ANN index, which Milvus loads before returning.

use super::types::{MAX_ID_LENGTH, MAX_TEXT_LENGTH};
use super::{AnnIndex, CollectionSchema, DistanceMetric, ScoredRecord, StoreRecord, VectorStore};
use crate::types::Metadata;
use grounded_core::{AppError, AppResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument};

const PRIMARY_FIELD: &str = "pk";
const TEXT_FIELD: &str = "text";
const VECTOR_FIELD: &str = "vector";
const METADATA_FIELD: &str = "metadata";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HasCollection {
    has: bool,
}

#[derive(Debug, Deserialize)]
struct InsertResult {
    #[serde(rename = "insertCount", default)]
    insert_count: usize,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    pk: String,
    distance: f32,
    #[serde(default)]
    text: String,
    #[serde(default)]
    metadata: Option<Value>,
}

/// Vector store backed by a Milvus cluster.
pub struct MilvusStore {
    client: Client,
    base_url: String,
    token: Option<String>,
    /// Index whose search parameters (`nprobe` / `ef`) every search uses
    search_index: AnnIndex,
}

impl MilvusStore {
    /// Create a store for the Milvus server at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        token: Option<&str>,
        search_index: AnnIndex,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Store(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.map(str::to_string),
            search_index,
        })
    }

    /// POST to a v2 endpoint and unwrap the response envelope.
    async fn call(&self, endpoint: &str, body: Value) -> AppResult<Option<Value>> {
        let url = format!("{}/v2/vectordb/{}", self.base_url, endpoint);
        debug!(%url, "Milvus request");

        let mut request = self.client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Store(format!("Failed to reach Milvus at {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Store(format!(
                "Milvus HTTP error ({}) on {}: {}",
                status, endpoint, text
            )));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| AppError::Store(format!("Failed to parse Milvus response: {}", e)))?;

        if envelope.code != 0 {
            return Err(AppError::Store(format!(
                "Milvus {} failed (code {}): {}",
                endpoint,
                envelope.code,
                envelope.message.unwrap_or_default()
            )));
        }

        Ok(envelope.data)
    }

    async fn call_for<T: DeserializeOwned>(&self, endpoint: &str, body: Value) -> AppResult<T> {
        let data = self.call(endpoint, body).await?.unwrap_or(Value::Null);
        serde_json::from_value(data).map_err(|e| {
            AppError::Store(format!("Unexpected Milvus {} response: {}", endpoint, e))
        })
    }

    async fn has_collection(&self, collection: &str) -> AppResult<bool> {
        let has: HasCollection = self
            .call_for("collections/has", json!({ "collectionName": collection }))
            .await?;
        Ok(has.has)
    }

    fn create_body(schema: &CollectionSchema) -> Value {
        let index_params = match schema.index {
            AnnIndex::IvfFlat { nlist, .. } => json!({ "nlist": nlist }),
            AnnIndex::Hnsw {
                m, ef_construction, ..
            } => json!({ "M": m, "efConstruction": ef_construction }),
        };

        json!({
            "collectionName": schema.name,
            "schema": {
                "autoId": false,
                "enableDynamicField": false,
                "fields": [
                    {
                        "fieldName": PRIMARY_FIELD,
                        "dataType": "VarChar",
                        "isPrimary": true,
                        "elementTypeParams": { "max_length": MAX_ID_LENGTH }
                    },
                    {
                        "fieldName": TEXT_FIELD,
                        "dataType": "VarChar",
                        "elementTypeParams": { "max_length": MAX_TEXT_LENGTH }
                    },
                    {
                        "fieldName": VECTOR_FIELD,
                        "dataType": "FloatVector",
                        "elementTypeParams": { "dim": schema.dimension }
                    },
                    {
                        "fieldName": METADATA_FIELD,
                        "dataType": "JSON"
                    }
                ]
            },
            "indexParams": [
                {
                    "fieldName": VECTOR_FIELD,
                    "indexName": "vector_index",
                    "metricType": schema.metric.as_milvus(),
                    "indexType": schema.index.index_type(),
                    "params": index_params
                }
            ]
        })
    }

    fn search_params(&self, metric: DistanceMetric) -> Value {
        let params = match self.search_index {
            AnnIndex::IvfFlat { nprobe, .. } => json!({ "nprobe": nprobe }),
            AnnIndex::Hnsw { ef, .. } => json!({ "ef": ef }),
        };
        json!({ "metricType": metric.as_milvus(), "params": params })
    }
}

fn to_metadata(value: Option<Value>) -> Metadata {
    match value {
        Some(Value::Object(map)) => map,
        // Some server versions return JSON fields as encoded strings
        Some(Value::String(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
        _ => Metadata::new(),
    }
}

#[async_trait::async_trait]
impl VectorStore for MilvusStore {
    fn backend_name(&self) -> &str {
        "milvus"
    }

    #[instrument(skip(self, schema), fields(collection = %schema.name))]
    async fn ensure_collection(&self, schema: &CollectionSchema) -> AppResult<()> {
        if self.has_collection(&schema.name).await? {
            debug!("Milvus collection already exists");
            return Ok(());
        }

        match self
            .call("collections/create", Self::create_body(schema))
            .await
        {
            Ok(_) => {
                info!(
                    dimension = schema.dimension,
                    metric = %schema.metric,
                    index = schema.index.index_type(),
                    "Created Milvus collection"
                );
                Ok(())
            }
            // Lost a race with another creator
            Err(AppError::Store(msg)) if msg.contains("already exist") => {
                debug!("Milvus collection created concurrently");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, collection: &str, records: Vec<StoreRecord>) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let rows: Vec<Value> = records
            .into_iter()
            .map(|r| {
                json!({
                    PRIMARY_FIELD: r.id,
                    TEXT_FIELD: r.text,
                    VECTOR_FIELD: r.vector,
                    METADATA_FIELD: Value::Object(r.metadata),
                })
            })
            .collect();
        let expected = rows.len();

        let result: InsertResult = self
            .call_for(
                "entities/insert",
                json!({ "collectionName": collection, "data": rows }),
            )
            .await?;

        if result.insert_count != expected {
            return Err(AppError::Store(format!(
                "Milvus inserted {} of {} records",
                result.insert_count, expected
            )));
        }

        debug!(collection, count = expected, "Inserted records into Milvus");
        Ok(expected)
    }

    #[instrument(skip(self, query))]
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

        let hits: Vec<SearchHit> = self
            .call_for(
                "entities/search",
                json!({
                    "collectionName": collection,
                    "data": [query],
                    "annsField": VECTOR_FIELD,
                    "limit": top_k,
                    "outputFields": [TEXT_FIELD, METADATA_FIELD],
                    "searchParams": self.search_params(metric),
                }),
            )
            .await?;

        debug!(hits = hits.len(), "Milvus search complete");

        Ok(hits
            .into_iter()
            .map(|hit| ScoredRecord {
                id: hit.pk,
                text: hit.text,
                metadata: to_metadata(hit.metadata),
                score: hit.distance,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn drop_collection(&self, collection: &str) -> AppResult<()> {
        if !self.has_collection(collection).await? {
            debug!("Milvus collection absent, nothing to drop");
            return Ok(());
        }

        self.call("collections/drop", json!({ "collectionName": collection }))
            .await?;
        info!("Dropped Milvus collection");
        Ok(())
    }
}
