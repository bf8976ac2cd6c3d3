//! In-memory document store
//!
//! The in-process reference implementation of [`DocumentStore`], used by the
//! test suite and the CLI demo. Concurrency tokens are fresh v4 UUIDs per
//! write; request charges are fixed synthetic values so cost aggregation is
//! testable.

use super::types::{DocumentStore, ItemResponse, QueryResponse, QuerySpec, WriteCondition};
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Synthetic request charge for a point read
pub const READ_CHARGE: f64 = 1.0;
/// Synthetic request charge for a write
pub const WRITE_CHARGE: f64 = 5.0;
/// Synthetic request charge for a delete
pub const DELETE_CHARGE: f64 = 5.0;
/// Synthetic base charge for a query
pub const QUERY_BASE_CHARGE: f64 = 2.0;
/// Synthetic per-item charge for a query
pub const QUERY_ITEM_CHARGE: f64 = 0.5;

#[derive(Debug, Clone)]
struct StoredDocument {
    document: JsonObject,
    etag: String,
}

/// An in-memory container keyed by (partition key, id)
#[derive(Debug, Clone)]
pub struct MemoryStore {
    name: String,
    id_field: String,
    partition_key_field: String,
    etag_field: String,
    items: Arc<RwLock<BTreeMap<(String, String), StoredDocument>>>,
}

impl MemoryStore {
    /// Create an empty container with default field names (`id`, `pk`,
    /// `_etag`)
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_field: "id".to_string(),
            partition_key_field: "pk".to_string(),
            etag_field: "_etag".to_string(),
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Set the partition key field name
    #[must_use]
    pub fn with_partition_key_field(mut self, field: impl Into<String>) -> Self {
        self.partition_key_field = field.into();
        self
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    /// Whether the container is empty
    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    /// Seed the container with documents, bypassing conditions.
    /// Convenience for tests and the CLI demo.
    pub async fn seed(&self, documents: Vec<JsonValue>) -> Result<()> {
        for document in documents {
            let object = document
                .as_object()
                .cloned()
                .ok_or_else(|| Error::validation("seed", "document", "not an object"))?;
            self.write(object, WriteCondition::Unconditional).await?;
        }
        Ok(())
    }

    fn keys_of(&self, document: &JsonObject) -> Result<(String, String)> {
        let id = document
            .get(&self.id_field)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                Error::validation("write", &self.id_field, "document is missing its id")
            })?;
        let partition_key = document
            .get(&self.partition_key_field)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                Error::validation(
                    "write",
                    &self.partition_key_field,
                    "document is missing its partition key",
                )
            })?;
        Ok((partition_key.to_string(), id.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn container_name(&self) -> &str {
        &self.name
    }

    async fn read(&self, id: &str, partition_key: &str) -> Result<ItemResponse> {
        let items = self.items.read().await;
        let stored = items
            .get(&(partition_key.to_string(), id.to_string()))
            .ok_or_else(|| Error::not_found(id, &self.name))?;
        Ok(ItemResponse {
            document: stored.document.clone(),
            etag: stored.etag.clone(),
            request_charge: READ_CHARGE,
        })
    }

    async fn write(&self, document: JsonObject, condition: WriteCondition) -> Result<ItemResponse> {
        let key = self.keys_of(&document)?;
        let mut items = self.items.write().await;

        match (&condition, items.get(&key)) {
            (WriteCondition::IfAbsent, Some(_)) => {
                return Err(Error::already_exists(key.1));
            }
            (WriteCondition::IfMatch(_), None) => {
                return Err(Error::not_found(key.1, &self.name));
            }
            (WriteCondition::IfMatch(token), Some(stored)) if stored.etag != *token => {
                return Err(Error::concurrency_conflict(key.1, token, &stored.etag));
            }
            _ => {}
        }

        let etag = Uuid::new_v4().to_string();
        let mut document = document;
        document.insert(self.etag_field.clone(), JsonValue::String(etag.clone()));
        items.insert(
            key,
            StoredDocument {
                document: document.clone(),
                etag: etag.clone(),
            },
        );

        Ok(ItemResponse {
            document,
            etag,
            request_charge: WRITE_CHARGE,
        })
    }

    async fn delete(&self, id: &str, partition_key: &str, if_match: Option<&str>) -> Result<f64> {
        let key = (partition_key.to_string(), id.to_string());
        let mut items = self.items.write().await;

        let stored = items
            .get(&key)
            .ok_or_else(|| Error::not_found(id, &self.name))?;
        if let Some(token) = if_match {
            if stored.etag != token {
                return Err(Error::concurrency_conflict(id, token, &stored.etag));
            }
        }

        items.remove(&key);
        Ok(DELETE_CHARGE)
    }

    async fn query(&self, spec: &QuerySpec) -> Result<QueryResponse> {
        let items = self.items.read().await;
        let limit = spec.max_items.unwrap_or(usize::MAX);
        let matched: Vec<JsonValue> = items
            .values()
            .take(limit)
            .map(|stored| JsonValue::Object(stored.document.clone()))
            .collect();

        let request_charge = QUERY_BASE_CHARGE + QUERY_ITEM_CHARGE * matched.len() as f64;
        Ok(QueryResponse {
            items: matched,
            request_charge,
        })
    }
}
