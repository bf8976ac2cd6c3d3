//! Concurrency-controlled mutation execution
//!
//! Each operation is a small state machine over one document: validate,
//! read where needed, transform, conditional write. Optimistic concurrency
//! only: a supplied token that no longer matches fails the call without
//! writing, and this layer never retries.

use super::types::{
    BatchFailure, BatchPayload, CounterPayload, DeletePayload, ItemPayload, UpsertPayload,
};
use crate::array_ops::{apply_array_operation, ArrayOperation};
use crate::config::SystemFields;
use crate::error::{Error, Result};
use crate::schema::InferredSchema;
use crate::store::{DocumentStore, WriteCondition};
use crate::types::{JsonObject, JsonValue};
use chrono::{SecondsFormat, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Executes mutations for one output type against one container
pub struct MutationExecutor {
    store: Arc<dyn DocumentStore>,
    type_name: String,
    fields: SystemFields,
    array_fields: HashSet<String>,
}

impl MutationExecutor {
    /// Create an executor with an explicit array-field set
    pub fn new(
        store: Arc<dyn DocumentStore>,
        type_name: impl Into<String>,
        fields: SystemFields,
        array_fields: HashSet<String>,
    ) -> Self {
        Self {
            store,
            type_name: type_name.into(),
            fields,
            array_fields,
        }
    }

    /// Create an executor wired to an inferred schema's root type
    pub fn from_schema(
        store: Arc<dyn DocumentStore>,
        schema: &InferredSchema,
        fields: SystemFields,
    ) -> Self {
        Self::new(
            store,
            schema.root_name(),
            fields,
            schema.array_fields(),
        )
    }

    /// The output type this executor serves
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn validate_identifier(operation: &str, field: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(Error::validation(
                operation,
                field,
                "must not be empty or whitespace",
            ));
        }
        Ok(())
    }

    /// Validate id and partition key before any I/O
    fn validate_keys(&self, operation: &str, id: &str, partition_key: &str) -> Result<()> {
        Self::validate_identifier(operation, &self.fields.id, id)?;
        Self::validate_identifier(operation, &self.fields.partition_key, partition_key)?;
        Ok(())
    }

    /// Ensure the document carries a non-empty id, generating one if absent.
    /// Returns (id, partition key) after validation.
    fn prepare_keys(&self, operation: &str, document: &mut JsonObject) -> Result<(String, String)> {
        let id = match document.get(&self.fields.id).and_then(JsonValue::as_str) {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => {
                let generated = Uuid::new_v4().to_string();
                document.insert(
                    self.fields.id.clone(),
                    JsonValue::String(generated.clone()),
                );
                generated
            }
        };
        let partition_key = document
            .get(&self.fields.partition_key)
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        self.validate_keys(operation, &id, &partition_key)?;
        Ok((id, partition_key))
    }

    fn is_soft_deleted(&self, document: &JsonObject) -> bool {
        document
            .get(&self.fields.deleted)
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }

    // ========================================================================
    // Single-item operations
    // ========================================================================

    /// Write-if-absent. Stamps creation and modification timestamps.
    pub async fn create(&self, input: JsonObject) -> Result<ItemPayload> {
        let mut document = input;
        self.prepare_keys("create", &mut document)?;

        let now = Self::now();
        document.insert(self.fields.created_at.clone(), JsonValue::String(now.clone()));
        document.insert(self.fields.updated_at.clone(), JsonValue::String(now));

        let response = self
            .store
            .write(document, WriteCondition::IfAbsent)
            .await?;
        Ok(ItemPayload {
            data: Some(JsonValue::Object(response.document)),
            etag: Some(response.etag),
            request_charge: response.request_charge,
        })
    }

    /// Point-read. Soft-deleted documents read as absent unless
    /// `include_deleted` is set.
    pub async fn read(
        &self,
        id: &str,
        partition_key: &str,
        include_deleted: bool,
    ) -> Result<ItemPayload> {
        self.validate_keys("read", id, partition_key)?;
        let response = self.store.read(id, partition_key).await?;

        if !include_deleted && self.is_soft_deleted(&response.document) {
            return Err(Error::not_found(id, self.store.container_name()));
        }

        Ok(ItemPayload {
            data: Some(JsonValue::Object(response.document)),
            etag: Some(response.etag),
            request_charge: response.request_charge,
        })
    }

    /// Read-modify-write of the supplied fields. Array fields take
    /// operation descriptors, applied before the write.
    pub async fn update(
        &self,
        id: &str,
        partition_key: &str,
        input: JsonObject,
        if_match: Option<String>,
    ) -> Result<ItemPayload> {
        self.validate_keys("update", id, partition_key)?;

        let current = self.store.read(id, partition_key).await?;
        if let Some(token) = &if_match {
            if *token != current.etag {
                return Err(Error::concurrency_conflict(id, token, &current.etag));
            }
        }

        let mut document = current.document;
        self.apply_input("update", &mut document, input)?;
        document.insert(
            self.fields.updated_at.clone(),
            JsonValue::String(Self::now()),
        );

        let condition = match if_match {
            Some(token) => WriteCondition::IfMatch(token),
            None => WriteCondition::Unconditional,
        };
        let response = self.store.write(document, condition).await?;
        Ok(ItemPayload {
            data: Some(JsonValue::Object(response.document)),
            etag: Some(response.etag),
            request_charge: current.request_charge + response.request_charge,
        })
    }

    /// Full replacement: fields not supplied are dropped, store-managed
    /// fields are preserved from the current document.
    pub async fn replace(
        &self,
        id: &str,
        partition_key: &str,
        input: JsonObject,
        if_match: Option<String>,
    ) -> Result<ItemPayload> {
        self.validate_keys("replace", id, partition_key)?;

        let current = self.store.read(id, partition_key).await?;
        if let Some(token) = &if_match {
            if *token != current.etag {
                return Err(Error::concurrency_conflict(id, token, &current.etag));
            }
        }

        // start from the preserved fields only; unsupplied fields are dropped
        let mut document = JsonObject::new();
        for name in self.fields.managed() {
            if let Some(value) = current.document.get(&name) {
                document.insert(name, value.clone());
            }
        }
        // array descriptors resolve against the document's current values
        for name in &self.array_fields {
            if input.contains_key(name) {
                if let Some(value) = current.document.get(name) {
                    document.insert(name.clone(), value.clone());
                }
            }
        }
        self.apply_input("replace", &mut document, input)?;
        document.insert(
            self.fields.updated_at.clone(),
            JsonValue::String(Self::now()),
        );

        let condition = match if_match {
            Some(token) => WriteCondition::IfMatch(token),
            None => WriteCondition::Unconditional,
        };
        let response = self.store.write(document, condition).await?;
        Ok(ItemPayload {
            data: Some(JsonValue::Object(response.document)),
            etag: Some(response.etag),
            request_charge: current.request_charge + response.request_charge,
        })
    }

    /// Create-or-replace, reporting whether the target previously existed.
    pub async fn upsert(&self, input: JsonObject) -> Result<UpsertPayload> {
        let mut document = input;
        let (id, partition_key) = self.prepare_keys("upsert", &mut document)?;

        let mut request_charge = 0.0;
        let existing = match self.store.read(&id, &partition_key).await {
            Ok(response) => {
                request_charge += response.request_charge;
                Some(response)
            }
            Err(Error::NotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        let now = Self::now();
        match &existing {
            Some(response) => {
                if let Some(created) = response.document.get(&self.fields.created_at) {
                    document.insert(self.fields.created_at.clone(), created.clone());
                }
            }
            None => {
                document.insert(
                    self.fields.created_at.clone(),
                    JsonValue::String(now.clone()),
                );
            }
        }
        document.insert(self.fields.updated_at.clone(), JsonValue::String(now));

        let response = self
            .store
            .write(document, WriteCondition::Unconditional)
            .await?;
        request_charge += response.request_charge;

        Ok(UpsertPayload {
            data: Some(JsonValue::Object(response.document)),
            etag: Some(response.etag),
            was_created: existing.is_none(),
            request_charge,
        })
    }

    /// Hard delete. Not-found targets fail; an optional token is honored.
    pub async fn delete(
        &self,
        id: &str,
        partition_key: &str,
        if_match: Option<String>,
    ) -> Result<DeletePayload> {
        self.validate_keys("delete", id, partition_key)?;
        let request_charge = self
            .store
            .delete(id, partition_key, if_match.as_deref())
            .await?;
        Ok(DeletePayload {
            success: true,
            deleted_id: Some(id.to_string()),
            etag: None,
            request_charge,
        })
    }

    /// Set the deletion marker. Idempotent: an already-deleted target
    /// succeeds with its original deletion metadata and zero cost.
    pub async fn soft_delete(
        &self,
        id: &str,
        partition_key: &str,
        reason: Option<String>,
        deleted_by: Option<String>,
    ) -> Result<DeletePayload> {
        self.validate_keys("softDelete", id, partition_key)?;

        let current = self.store.read(id, partition_key).await?;
        if self.is_soft_deleted(&current.document) {
            debug!(%id, "soft delete is a no-op, marker already set");
            return Ok(DeletePayload {
                success: true,
                deleted_id: Some(id.to_string()),
                etag: Some(current.etag),
                request_charge: 0.0,
            });
        }

        let now = Self::now();
        let mut document = current.document;
        document.insert(self.fields.deleted.clone(), JsonValue::Bool(true));
        document.insert(
            self.fields.deleted_at.clone(),
            JsonValue::String(now.clone()),
        );
        if let Some(reason) = reason {
            document.insert(self.fields.delete_reason.clone(), JsonValue::String(reason));
        }
        if let Some(actor) = deleted_by {
            document.insert(self.fields.deleted_by.clone(), JsonValue::String(actor));
        }
        document.insert(self.fields.updated_at.clone(), JsonValue::String(now));

        let response = self
            .store
            .write(document, WriteCondition::IfMatch(current.etag))
            .await?;
        Ok(DeletePayload {
            success: true,
            deleted_id: Some(id.to_string()),
            etag: Some(response.etag),
            request_charge: current.request_charge + response.request_charge,
        })
    }

    /// Clear the deletion marker and stamp a restoration timestamp.
    pub async fn restore(&self, id: &str, partition_key: &str) -> Result<ItemPayload> {
        self.validate_keys("restore", id, partition_key)?;

        let current = self.store.read(id, partition_key).await?;
        let now = Self::now();
        let mut document = current.document;
        document.remove(&self.fields.deleted);
        document.remove(&self.fields.deleted_at);
        document.remove(&self.fields.delete_reason);
        document.remove(&self.fields.deleted_by);
        document.insert(
            self.fields.restored_at.clone(),
            JsonValue::String(now.clone()),
        );
        document.insert(self.fields.updated_at.clone(), JsonValue::String(now));

        let response = self
            .store
            .write(document, WriteCondition::IfMatch(current.etag))
            .await?;
        Ok(ItemPayload {
            data: Some(JsonValue::Object(response.document)),
            etag: Some(response.etag),
            request_charge: current.request_charge + response.request_charge,
        })
    }

    /// Adjust a numeric field by a delta under the read token, returning
    /// previous and new values. An absent field starts from zero.
    pub async fn increment(
        &self,
        id: &str,
        partition_key: &str,
        field: &str,
        by: f64,
    ) -> Result<CounterPayload> {
        self.validate_keys("increment", id, partition_key)?;
        Self::validate_identifier("increment", "field", field)?;

        let current = self.store.read(id, partition_key).await?;
        let previous_value = match current.document.get(field) {
            None | Some(JsonValue::Null) => 0.0,
            Some(JsonValue::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(other) => {
                return Err(Error::validation(
                    "increment",
                    field,
                    format!("stored value is not numeric: {other}"),
                ));
            }
        };
        let new_value = previous_value + by;

        let mut document = current.document;
        let stored = if new_value.fract() == 0.0 && previous_value.fract() == 0.0 && by.fract() == 0.0
        {
            JsonValue::from(new_value as i64)
        } else {
            JsonValue::from(new_value)
        };
        document.insert(field.to_string(), stored);
        document.insert(
            self.fields.updated_at.clone(),
            JsonValue::String(Self::now()),
        );

        let response = self
            .store
            .write(document, WriteCondition::IfMatch(current.etag))
            .await?;
        Ok(CounterPayload {
            previous_value,
            new_value,
            request_charge: current.request_charge + response.request_charge,
        })
    }

    /// Negate the delta and delegate to the same atomic path.
    pub async fn decrement(
        &self,
        id: &str,
        partition_key: &str,
        field: &str,
        by: f64,
    ) -> Result<CounterPayload> {
        self.increment(id, partition_key, field, -by).await
    }

    // ========================================================================
    // Batch operations
    // ========================================================================

    /// Create each item independently; failures become `failed` entries.
    pub async fn create_many(&self, items: Vec<JsonValue>) -> Result<BatchPayload> {
        let mut payload = BatchPayload::default();
        for (index, item) in items.into_iter().enumerate() {
            let id_hint = self.id_hint(&item);
            let result = match item {
                JsonValue::Object(object) => self.create(object).await,
                _ => Err(Error::validation("createMany", "items", "item is not an object")),
            };
            match result {
                Ok(item_payload) => {
                    payload.total_request_charge += item_payload.request_charge;
                    payload
                        .succeeded
                        .push(item_payload.data.unwrap_or(JsonValue::Null));
                }
                Err(e) => payload.failed.push(BatchFailure {
                    index,
                    id: id_hint,
                    error: e.to_string(),
                }),
            }
        }
        Ok(payload)
    }

    /// Update each item independently. Items carry `id`, `partitionKey`,
    /// an optional `etag`, and their field deltas.
    pub async fn update_many(&self, items: Vec<JsonValue>) -> Result<BatchPayload> {
        let mut payload = BatchPayload::default();
        for (index, item) in items.into_iter().enumerate() {
            let id_hint = self.id_hint(&item);
            let result = match Self::split_batch_item("updateMany", item) {
                Ok((id, partition_key, if_match, input)) => {
                    self.update(&id, &partition_key, input, if_match).await
                }
                Err(e) => Err(e),
            };
            match result {
                Ok(item_payload) => {
                    payload.total_request_charge += item_payload.request_charge;
                    payload
                        .succeeded
                        .push(item_payload.data.unwrap_or(JsonValue::Null));
                }
                Err(e) => payload.failed.push(BatchFailure {
                    index,
                    id: id_hint,
                    error: e.to_string(),
                }),
            }
        }
        Ok(payload)
    }

    /// Delete each item independently; `succeeded` lists the removed ids.
    pub async fn delete_many(&self, items: Vec<JsonValue>) -> Result<BatchPayload> {
        let mut payload = BatchPayload::default();
        for (index, item) in items.into_iter().enumerate() {
            let id_hint = self.id_hint(&item);
            let result = match Self::split_batch_item("deleteMany", item) {
                Ok((id, partition_key, if_match, _)) => {
                    self.delete(&id, &partition_key, if_match).await
                }
                Err(e) => Err(e),
            };
            match result {
                Ok(item_payload) => {
                    payload.total_request_charge += item_payload.request_charge;
                    payload.succeeded.push(JsonValue::String(
                        item_payload.deleted_id.unwrap_or_default(),
                    ));
                }
                Err(e) => payload.failed.push(BatchFailure {
                    index,
                    id: id_hint,
                    error: e.to_string(),
                }),
            }
        }
        Ok(payload)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Best-effort id of a batch item, for failure records
    fn id_hint(&self, item: &JsonValue) -> Option<String> {
        item.get("id")
            .or_else(|| item.get(&self.fields.id))
            .and_then(JsonValue::as_str)
            .map(ToString::to_string)
    }

    /// Split a batch item into (id, partition key, token, remaining fields)
    fn split_batch_item(
        operation: &str,
        item: JsonValue,
    ) -> Result<(String, String, Option<String>, JsonObject)> {
        let JsonValue::Object(mut object) = item else {
            return Err(Error::validation(operation, "items", "item is not an object"));
        };
        let id = object
            .remove("id")
            .and_then(|v| v.as_str().map(ToString::to_string))
            .ok_or_else(|| Error::validation(operation, "id", "item is missing its id"))?;
        let partition_key = object
            .remove("partitionKey")
            .and_then(|v| v.as_str().map(ToString::to_string))
            .ok_or_else(|| {
                Error::validation(operation, "partitionKey", "item is missing its partition key")
            })?;
        let if_match = object
            .remove("etag")
            .and_then(|v| v.as_str().map(ToString::to_string));
        Ok((id, partition_key, if_match, object))
    }

    /// Merge input fields into a document, routing array fields through the
    /// operation processor. Store-managed fields in the input are ignored.
    fn apply_input(
        &self,
        operation: &str,
        document: &mut JsonObject,
        input: JsonObject,
    ) -> Result<()> {
        let managed = self.fields.managed();
        for (name, value) in input {
            if managed.contains(&name) {
                debug!(%operation, field = %name, "ignoring store-managed field in input");
                continue;
            }
            if self.array_fields.contains(&name) {
                let descriptor = ArrayOperation::from_value(&value)?;
                let current_items = document
                    .get(&name)
                    .and_then(JsonValue::as_array)
                    .cloned()
                    .unwrap_or_default();
                let next = apply_array_operation(&current_items, &descriptor)?;
                document.insert(name, JsonValue::Array(next));
            } else {
                document.insert(name, value);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for MutationExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationExecutor")
            .field("type_name", &self.type_name)
            .field("container", &self.store.container_name())
            .finish()
    }
}
