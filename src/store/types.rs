//! Document store types and trait
//!
//! The toolkit never assumes a specific transport; it only requires the four
//! capabilities below, each reporting a per-call request-charge metric.

use crate::error::Result;
use crate::types::{JsonObject, JsonValue};
use async_trait::async_trait;

/// A document returned from the store, with its concurrency token and the
/// cost of the call
#[derive(Debug, Clone)]
pub struct ItemResponse {
    /// The stored document
    pub document: JsonObject,
    /// Opaque concurrency token; compared, never parsed
    pub etag: String,
    /// Cost of this call in request units
    pub request_charge: f64,
}

/// Condition attached to a write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteCondition {
    /// Create-or-replace, no condition
    Unconditional,
    /// Write only if no document with this id exists
    IfAbsent,
    /// Write only if the stored token matches
    IfMatch(String),
}

/// A query against a container
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    /// Maximum items to return; `None` returns everything
    pub max_items: Option<usize>,
}

impl QuerySpec {
    /// A sampling query returning at most `max_items` documents
    pub fn sample(max_items: usize) -> Self {
        Self {
            max_items: Some(max_items),
        }
    }
}

/// Items matched by a query, with the aggregate cost
#[derive(Debug, Clone)]
pub struct QueryResponse {
    /// Matched documents
    pub items: Vec<JsonValue>,
    /// Cost of the query in request units
    pub request_charge: f64,
}

/// The container capability set consumed by inference sampling and the
/// mutation executor.
///
/// Implementations decide transport, cancellation, and timeouts; their
/// failures propagate through unmasked.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Name of the backing container, used in diagnostics
    fn container_name(&self) -> &str;

    /// Point-read one document
    async fn read(&self, id: &str, partition_key: &str) -> Result<ItemResponse>;

    /// Write one document under the given condition
    async fn write(&self, document: JsonObject, condition: WriteCondition) -> Result<ItemResponse>;

    /// Remove one document, optionally conditioned on a token.
    /// Returns the request charge.
    async fn delete(&self, id: &str, partition_key: &str, if_match: Option<&str>) -> Result<f64>;

    /// Run a query
    async fn query(&self, spec: &QuerySpec) -> Result<QueryResponse>;
}
