//! Resolver payload types and the resolver map
//!
//! Payloads are the result shapes of mutations, distinct from the inputs
//! that initiate them. All serialize to the camelCase wire form the
//! generated payload SDL describes.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use futures::future::BoxFuture;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Payload of a data-bearing single-item operation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPayload {
    /// The resulting document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,

    /// Concurrency token after the operation
    #[serde(rename = "_etag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Cost of the operation in request units
    pub request_charge: f64,
}

/// Payload of an upsert, reporting whether the target previously existed
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPayload {
    /// The resulting document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,

    /// Concurrency token after the write
    #[serde(rename = "_etag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Whether the write created the document
    pub was_created: bool,

    /// Cost of the operation in request units
    pub request_charge: f64,
}

/// Payload of a hard or soft delete
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePayload {
    /// Whether the operation took effect (or was already in effect)
    pub success: bool,

    /// Identifier of the affected document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_id: Option<String>,

    /// Concurrency token after a soft delete; absent for hard deletes
    #[serde(rename = "_etag", skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Cost of the operation in request units
    pub request_charge: f64,
}

/// Payload of an increment/decrement
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterPayload {
    /// Field value before the adjustment
    pub previous_value: f64,

    /// Field value after the adjustment
    pub new_value: f64,

    /// Cost of the operation in request units
    pub request_charge: f64,
}

/// One failed item of a batch operation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    /// Position of the item in the submitted batch
    pub index: usize,

    /// Identifying key of the item, when one could be determined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Why the item failed
    pub error: String,
}

/// Payload of a batch operation. Partial completion is a first-class
/// outcome: failures are enumerated, never raised.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    /// Results of the items that succeeded
    pub succeeded: Vec<JsonValue>,

    /// Structured records of the items that failed
    pub failed: Vec<BatchFailure>,

    /// Aggregate cost across all item attempts
    pub total_request_charge: f64,
}

// ============================================================================
// Resolver Map
// ============================================================================

/// An executable resolver: `(parent, args) -> payload`
pub type ResolverFn =
    Arc<dyn Fn(JsonValue, JsonValue) -> BoxFuture<'static, Result<JsonValue>> + Send + Sync>;

/// Mapping from operation name to executable resolver, consumed by an
/// external request-serving layer.
#[derive(Clone, Default)]
pub struct ResolverMap {
    resolvers: HashMap<String, ResolverFn>,
}

impl ResolverMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver under an operation name
    pub fn insert(&mut self, name: impl Into<String>, resolver: ResolverFn) {
        self.resolvers.insert(name.into(), resolver);
    }

    /// Look up a resolver
    pub fn get(&self, name: &str) -> Option<&ResolverFn> {
        self.resolvers.get(name)
    }

    /// Invoke a resolver by operation name
    pub async fn call(&self, name: &str, parent: JsonValue, args: JsonValue) -> Result<JsonValue> {
        let resolver = self.get(name).ok_or_else(|| {
            Error::validation("resolve", name, "no resolver registered for this operation")
        })?;
        resolver(parent, args).await
    }

    /// Registered operation names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered resolvers
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl std::fmt::Debug for ResolverMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverMap")
            .field("operations", &self.names())
            .finish()
    }
}
