//! Mutation execution and resolver tests

use super::*;
use crate::config::{GeneratorConfig, OperationConfig, SystemFields};
use crate::error::Error;
use crate::schema::SchemaInferrer;
use crate::store::{MemoryStore, READ_CHARGE, WRITE_CHARGE};
use crate::types::{JsonObject, OperationKind};
use serde_json::json;
use std::sync::Arc;

fn sample_documents() -> Vec<serde_json::Value> {
    vec![
        json!({
            "id": "p1",
            "pk": "tenant-1",
            "name": "Widget",
            "stock": 5,
            "tags": ["new"]
        }),
        json!({
            "id": "p2",
            "pk": "tenant-1",
            "name": "Gadget",
            "stock": 2,
            "tags": ["sale"]
        }),
    ]
}

fn executor_with_store() -> (MutationExecutor, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new("products"));
    let schema = SchemaInferrer::new().infer(&sample_documents(), "Product");
    let executor =
        MutationExecutor::from_schema(store.clone(), &schema, SystemFields::default());
    (executor, store)
}

fn object(value: serde_json::Value) -> JsonObject {
    value.as_object().unwrap().clone()
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_create_writes_document_with_timestamps() {
    let (executor, _store) = executor_with_store();

    let payload = executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "Widget", "tags": ["a"]})))
        .await
        .unwrap();

    assert!(payload.etag.is_some());
    assert_eq!(payload.request_charge, WRITE_CHARGE);

    let data = payload.data.unwrap();
    assert_eq!(data["name"], json!("Widget"));
    assert!(data["_createdAt"].is_string());
    assert_eq!(data["_createdAt"], data["_updatedAt"]);
}

#[tokio::test]
async fn test_create_generates_id_when_absent() {
    let (executor, _store) = executor_with_store();

    let payload = executor
        .create(object(json!({"pk": "t", "name": "Widget"})))
        .await
        .unwrap();

    let data = payload.data.unwrap();
    let id = data["id"].as_str().unwrap();
    assert!(!id.is_empty());
}

#[tokio::test]
async fn test_create_is_write_if_absent() {
    let (executor, _store) = executor_with_store();
    let input = object(json!({"id": "p1", "pk": "t", "name": "Widget"}));

    executor.create(input.clone()).await.unwrap();
    let err = executor.create(input).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_create_validates_partition_key_before_io() {
    let (executor, store) = executor_with_store();

    let err = executor
        .create(object(json!({"id": "p1", "name": "Widget"})))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let err = executor
        .create(object(json!({"id": "p1", "pk": "  ", "name": "Widget"})))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert!(store.is_empty().await);
}

// ============================================================================
// Read
// ============================================================================

#[tokio::test]
async fn test_read_returns_document_and_token() {
    let (executor, _store) = executor_with_store();
    let created = executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "Widget"})))
        .await
        .unwrap();

    let read = executor.read("p1", "t", false).await.unwrap();
    assert_eq!(read.etag, created.etag);
    assert_eq!(read.request_charge, READ_CHARGE);

    let err = executor.read("missing", "t", false).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_read_hides_soft_deleted_unless_asked() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "Widget"})))
        .await
        .unwrap();
    executor.soft_delete("p1", "t", None, None).await.unwrap();

    let err = executor.read("p1", "t", false).await.unwrap_err();
    assert!(err.is_not_found());

    let read = executor.read("p1", "t", true).await.unwrap();
    assert_eq!(read.data.unwrap()["_deleted"], json!(true));
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_merges_fields_and_sums_charges() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "Widget", "stock": 5})))
        .await
        .unwrap();

    let payload = executor
        .update("p1", "t", object(json!({"name": "Gizmo"})), None)
        .await
        .unwrap();

    let data = payload.data.unwrap();
    assert_eq!(data["name"], json!("Gizmo"));
    assert_eq!(data["stock"], json!(5));
    assert_eq!(payload.request_charge, READ_CHARGE + WRITE_CHARGE);
}

#[tokio::test]
async fn test_update_with_stale_token_fails_without_writing() {
    let (executor, _store) = executor_with_store();
    let created = executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "Widget"})))
        .await
        .unwrap();
    let original_etag = created.etag.unwrap();

    // a concurrent writer rotates the token
    executor
        .update("p1", "t", object(json!({"name": "Other"})), None)
        .await
        .unwrap();

    let err = executor
        .update(
            "p1",
            "t",
            object(json!({"name": "Mine"})),
            Some(original_etag),
        )
        .await
        .unwrap_err();
    assert!(err.is_concurrency_conflict());

    // the stored document is provably unchanged by the failed update
    let read = executor.read("p1", "t", false).await.unwrap();
    assert_eq!(read.data.unwrap()["name"], json!("Other"));
}

#[tokio::test]
async fn test_update_with_matching_token_succeeds() {
    let (executor, _store) = executor_with_store();
    let created = executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "Widget"})))
        .await
        .unwrap();

    let payload = executor
        .update("p1", "t", object(json!({"name": "Gizmo"})), created.etag)
        .await
        .unwrap();
    assert_eq!(payload.data.unwrap()["name"], json!("Gizmo"));
}

#[tokio::test]
async fn test_update_array_field_applies_descriptor() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W", "tags": ["a", "b"]})))
        .await
        .unwrap();

    let payload = executor
        .update(
            "p1",
            "t",
            object(json!({"tags": {"type": "append", "value": ["c", "d"]}})),
            None,
        )
        .await
        .unwrap();
    assert_eq!(payload.data.unwrap()["tags"], json!(["a", "b", "c", "d"]));
}

#[tokio::test]
async fn test_update_array_field_rejects_raw_literals() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W", "tags": ["a"]})))
        .await
        .unwrap();

    let err = executor
        .update("p1", "t", object(json!({"tags": ["x", "y"]})), None)
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_update_invalid_array_operation_leaves_document_unchanged() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W", "tags": ["a"]})))
        .await
        .unwrap();

    let err = executor
        .update(
            "p1",
            "t",
            object(json!({"tags": {"type": "insert", "value": "x", "index": 9}})),
            None,
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let read = executor.read("p1", "t", false).await.unwrap();
    assert_eq!(read.data.unwrap()["tags"], json!(["a"]));
}

// ============================================================================
// Replace
// ============================================================================

#[tokio::test]
async fn test_replace_drops_unsupplied_fields() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W", "stock": 5})))
        .await
        .unwrap();

    let payload = executor
        .replace("p1", "t", object(json!({"name": "Fresh"})), None)
        .await
        .unwrap();

    let data = payload.data.unwrap();
    assert_eq!(data["name"], json!("Fresh"));
    assert!(data.get("stock").is_none());
    // store-managed fields survive the replacement
    assert_eq!(data["id"], json!("p1"));
    assert_eq!(data["pk"], json!("t"));
    assert!(data["_createdAt"].is_string());
}

// ============================================================================
// Upsert
// ============================================================================

#[tokio::test]
async fn test_upsert_reports_creation_state() {
    let (executor, _store) = executor_with_store();

    let first = executor
        .upsert(object(json!({"id": "p1", "pk": "t", "name": "W"})))
        .await
        .unwrap();
    assert!(first.was_created);
    assert_eq!(first.request_charge, WRITE_CHARGE);

    let second = executor
        .upsert(object(json!({"id": "p1", "pk": "t", "name": "W2"})))
        .await
        .unwrap();
    assert!(!second.was_created);
    assert_eq!(second.request_charge, READ_CHARGE + WRITE_CHARGE);

    let data = second.data.unwrap();
    assert_eq!(data["name"], json!("W2"));
    // creation timestamp is preserved across the replace
    let first_data = first.data.unwrap();
    assert_eq!(data["_createdAt"], first_data["_createdAt"]);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_removes_and_reports() {
    let (executor, store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W"})))
        .await
        .unwrap();

    let payload = executor.delete("p1", "t", None).await.unwrap();
    assert!(payload.success);
    assert_eq!(payload.deleted_id.as_deref(), Some("p1"));
    assert!(store.is_empty().await);

    let err = executor.delete("p1", "t", None).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_honors_token() {
    let (executor, _store) = executor_with_store();
    let created = executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W"})))
        .await
        .unwrap();

    let err = executor
        .delete("p1", "t", Some("stale".into()))
        .await
        .unwrap_err();
    assert!(err.is_concurrency_conflict());

    executor.delete("p1", "t", created.etag).await.unwrap();
}

// ============================================================================
// Soft delete / restore
// ============================================================================

#[tokio::test]
async fn test_soft_delete_sets_marker_and_metadata() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W"})))
        .await
        .unwrap();

    let payload = executor
        .soft_delete("p1", "t", Some("cleanup".into()), Some("ops".into()))
        .await
        .unwrap();
    assert!(payload.success);
    assert_eq!(payload.request_charge, READ_CHARGE + WRITE_CHARGE);

    let read = executor.read("p1", "t", true).await.unwrap();
    let data = read.data.unwrap();
    assert_eq!(data["_deleted"], json!(true));
    assert!(data["_deletedAt"].is_string());
    assert_eq!(data["_deleteReason"], json!("cleanup"));
    assert_eq!(data["_deletedBy"], json!("ops"));
}

#[tokio::test]
async fn test_soft_delete_is_idempotent_with_zero_cost() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W"})))
        .await
        .unwrap();

    let first = executor
        .soft_delete("p1", "t", Some("cleanup".into()), None)
        .await
        .unwrap();
    assert!(first.success);

    let before = executor.read("p1", "t", true).await.unwrap().data.unwrap();

    let second = executor
        .soft_delete("p1", "t", Some("different reason".into()), None)
        .await
        .unwrap();
    assert!(second.success);
    assert_eq!(second.request_charge, 0.0);

    // original deletion metadata is unchanged
    let after = executor.read("p1", "t", true).await.unwrap().data.unwrap();
    assert_eq!(after["_deletedAt"], before["_deletedAt"]);
    assert_eq!(after["_deleteReason"], json!("cleanup"));
}

#[tokio::test]
async fn test_restore_clears_marker_and_stamps_timestamp() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W"})))
        .await
        .unwrap();
    executor
        .soft_delete("p1", "t", Some("oops".into()), None)
        .await
        .unwrap();

    let payload = executor.restore("p1", "t").await.unwrap();
    let data = payload.data.unwrap();
    assert!(data.get("_deleted").is_none());
    assert!(data.get("_deletedAt").is_none());
    assert!(data.get("_deleteReason").is_none());
    assert!(data["_restoredAt"].is_string());

    // readable again without includeDeleted
    assert!(executor.read("p1", "t", false).await.is_ok());
}

// ============================================================================
// Increment / decrement
// ============================================================================

#[tokio::test]
async fn test_increment_returns_previous_and_new() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W", "stock": 5})))
        .await
        .unwrap();

    let payload = executor.increment("p1", "t", "stock", 3.0).await.unwrap();
    assert_eq!(payload.previous_value, 5.0);
    assert_eq!(payload.new_value, 8.0);
    assert_eq!(payload.request_charge, READ_CHARGE + WRITE_CHARGE);

    // integral adjustments keep the stored value integral
    let read = executor.read("p1", "t", false).await.unwrap();
    assert_eq!(read.data.unwrap()["stock"], json!(8));
}

#[tokio::test]
async fn test_decrement_negates_and_delegates() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W", "stock": 5})))
        .await
        .unwrap();

    let payload = executor.decrement("p1", "t", "stock", 2.0).await.unwrap();
    assert_eq!(payload.previous_value, 5.0);
    assert_eq!(payload.new_value, 3.0);
}

#[tokio::test]
async fn test_increment_missing_field_starts_from_zero() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W"})))
        .await
        .unwrap();

    let payload = executor.increment("p1", "t", "views", 1.0).await.unwrap();
    assert_eq!(payload.previous_value, 0.0);
    assert_eq!(payload.new_value, 1.0);
}

#[tokio::test]
async fn test_increment_non_numeric_field_fails() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "p1", "pk": "t", "name": "W"})))
        .await
        .unwrap();

    let err = executor.increment("p1", "t", "name", 1.0).await.unwrap_err();
    assert!(err.is_validation());
}

// ============================================================================
// Batch operations
// ============================================================================

#[tokio::test]
async fn test_create_many_captures_partial_failure() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "dup", "pk": "t", "name": "Existing"})))
        .await
        .unwrap();

    let payload = executor
        .create_many(vec![
            json!({"id": "a", "pk": "t", "name": "A"}),
            json!({"id": "dup", "pk": "t", "name": "Clash"}),
            json!({"id": "b", "pk": "t", "name": "B"}),
        ])
        .await
        .unwrap();

    assert_eq!(payload.succeeded.len(), 2);
    assert_eq!(payload.failed.len(), 1);
    assert_eq!(payload.failed[0].index, 1);
    assert_eq!(payload.failed[0].id.as_deref(), Some("dup"));
    assert!(payload.failed[0].error.contains("already exists"));
    assert_eq!(payload.total_request_charge, 2.0 * WRITE_CHARGE);
}

#[tokio::test]
async fn test_update_many_independent_items() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "a", "pk": "t", "name": "A", "stock": 1})))
        .await
        .unwrap();

    let payload = executor
        .update_many(vec![
            json!({"id": "a", "partitionKey": "t", "stock": 10}),
            json!({"id": "ghost", "partitionKey": "t", "stock": 2}),
            json!({"partitionKey": "t", "stock": 3}),
        ])
        .await
        .unwrap();

    assert_eq!(payload.succeeded.len(), 1);
    assert_eq!(payload.succeeded[0]["stock"], json!(10));
    assert_eq!(payload.failed.len(), 2);
    assert_eq!(payload.failed[0].index, 1);
    assert!(payload.failed[0].error.contains("not found"));
    assert_eq!(payload.failed[1].index, 2);
    assert_eq!(
        payload.total_request_charge,
        READ_CHARGE + WRITE_CHARGE
    );
}

#[tokio::test]
async fn test_delete_many_lists_removed_ids() {
    let (executor, _store) = executor_with_store();
    executor
        .create(object(json!({"id": "a", "pk": "t", "name": "A"})))
        .await
        .unwrap();
    executor
        .create(object(json!({"id": "b", "pk": "t", "name": "B"})))
        .await
        .unwrap();

    let payload = executor
        .delete_many(vec![
            json!({"id": "a", "partitionKey": "t"}),
            json!({"id": "b", "partitionKey": "t"}),
            json!({"id": "c", "partitionKey": "t"}),
        ])
        .await
        .unwrap();

    assert_eq!(payload.succeeded, vec![json!("a"), json!("b")]);
    assert_eq!(payload.failed.len(), 1);
    assert_eq!(payload.failed[0].index, 2);
}

// ============================================================================
// Resolver map
// ============================================================================

#[tokio::test]
async fn test_resolver_map_honors_operation_config() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new("products"));
    let schema = SchemaInferrer::new().infer(&sample_documents(), "Product");
    let config = GeneratorConfig::with_operations(OperationConfig::include([
        OperationKind::Create,
        OperationKind::Read,
        OperationKind::SoftDelete,
    ]));

    let map = ResolverBuilder::new(store, &schema, config).build();
    assert_eq!(map.len(), 3);
    assert!(map.get("createProduct").is_some());
    assert!(map.get("product").is_some());
    assert!(map.get("softDeleteProduct").is_some());
    assert!(map.get("deleteProduct").is_none());
}

#[tokio::test]
async fn test_resolvers_execute_end_to_end() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new("products"));
    let schema = SchemaInferrer::new().infer(&sample_documents(), "Product");
    let map = ResolverBuilder::new(store, &schema, GeneratorConfig::default()).build();

    let created = map
        .call(
            "createProduct",
            json!(null),
            json!({"input": {"id": "p1", "pk": "t", "name": "Widget", "tags": ["a"]}}),
        )
        .await
        .unwrap();
    assert_eq!(created["data"]["name"], json!("Widget"));
    assert!(created["_etag"].is_string());
    assert!(created["requestCharge"].is_number());

    let updated = map
        .call(
            "updateProduct",
            json!(null),
            json!({
                "id": "p1",
                "partitionKey": "t",
                "input": {"tags": {"type": "append", "value": "b"}}
            }),
        )
        .await
        .unwrap();
    assert_eq!(updated["data"]["tags"], json!(["a", "b"]));

    let read = map
        .call(
            "product",
            json!(null),
            json!({"id": "p1", "partitionKey": "t"}),
        )
        .await
        .unwrap();
    assert_eq!(read["data"]["name"], json!("Widget"));

    let batch = map
        .call(
            "createManyProduct",
            json!(null),
            json!({"items": [
                {"id": "p2", "pk": "t", "name": "A"},
                {"id": "p2", "pk": "t", "name": "Duplicate"}
            ]}),
        )
        .await
        .unwrap();
    assert_eq!(batch["succeeded"].as_array().unwrap().len(), 1);
    assert_eq!(batch["failed"].as_array().unwrap().len(), 1);
    assert!(batch["totalRequestCharge"].is_number());
}

#[tokio::test]
async fn test_resolver_map_rejects_unknown_operation() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new("products"));
    let schema = SchemaInferrer::new().infer(&sample_documents(), "Product");
    let map = ResolverBuilder::new(store, &schema, GeneratorConfig::default()).build();

    let err = map
        .call("mintProduct", json!(null), json!({}))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn test_missing_required_argument_is_validation_error() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new("products"));
    let schema = SchemaInferrer::new().infer(&sample_documents(), "Product");
    let map = ResolverBuilder::new(store, &schema, GeneratorConfig::default()).build();

    let err = map
        .call("updateProduct", json!(null), json!({"id": "p1"}))
        .await
        .unwrap_err();
    assert!(err.is_validation());
}
