//! Resolver map construction
//!
//! Binds the generated operation contracts to executable resolvers. Each
//! resolver is independently bound to its call arguments; no mutable state
//! is shared across invocations.

use super::mutations::MutationExecutor;
use super::types::{ResolverFn, ResolverMap};
use crate::config::GeneratorConfig;
use crate::error::{Error, Result};
use crate::schema::InferredSchema;
use crate::sdl::operation_field_name;
use crate::store::DocumentStore;
use crate::types::{JsonObject, JsonValue, OperationKind};
use std::sync::Arc;

/// Builds the resolver map for one inferred type over one container
#[derive(Debug)]
pub struct ResolverBuilder {
    executor: Arc<MutationExecutor>,
    config: GeneratorConfig,
}

impl ResolverBuilder {
    /// Create a builder from a store, an inferred schema, and configuration
    pub fn new(
        store: Arc<dyn DocumentStore>,
        schema: &InferredSchema,
        config: GeneratorConfig,
    ) -> Self {
        let executor = Arc::new(MutationExecutor::from_schema(
            store,
            schema,
            config.system_fields.clone(),
        ));
        Self { executor, config }
    }

    /// Build resolvers for every enabled operation, keyed by resolver
    /// field name (`createProduct`, `product`, ...)
    pub fn build(&self) -> ResolverMap {
        let mut map = ResolverMap::new();
        let type_name = self.executor.type_name().to_string();

        for op in self.config.operations.enabled() {
            let name = operation_field_name(op, &type_name);
            map.insert(name, make_resolver(self.executor.clone(), op));
        }
        map
    }
}

/// Wrap one executor operation as a boxed async resolver
fn make_resolver(executor: Arc<MutationExecutor>, op: OperationKind) -> ResolverFn {
    let resolver: ResolverFn = Arc::new(move |_parent, args| {
        let executor = executor.clone();
        Box::pin(async move {
            match op {
                OperationKind::Create => {
                    let input = arg_object(&args, op, "input")?;
                    to_value(executor.create(input).await?)
                }
                OperationKind::Read => {
                    let id = arg_str(&args, op, "id")?;
                    let partition_key = arg_str(&args, op, "partitionKey")?;
                    let include_deleted = arg_bool(&args, "includeDeleted");
                    to_value(executor.read(&id, &partition_key, include_deleted).await?)
                }
                OperationKind::Update => {
                    let id = arg_str(&args, op, "id")?;
                    let partition_key = arg_str(&args, op, "partitionKey")?;
                    let input = arg_object(&args, op, "input")?;
                    let etag = arg_opt_str(&args, "etag");
                    to_value(executor.update(&id, &partition_key, input, etag).await?)
                }
                OperationKind::Replace => {
                    let id = arg_str(&args, op, "id")?;
                    let partition_key = arg_str(&args, op, "partitionKey")?;
                    let input = arg_object(&args, op, "input")?;
                    let etag = arg_opt_str(&args, "etag");
                    to_value(executor.replace(&id, &partition_key, input, etag).await?)
                }
                OperationKind::Upsert => {
                    let input = arg_object(&args, op, "input")?;
                    to_value(executor.upsert(input).await?)
                }
                OperationKind::Delete => {
                    let id = arg_str(&args, op, "id")?;
                    let partition_key = arg_str(&args, op, "partitionKey")?;
                    let etag = arg_opt_str(&args, "etag");
                    to_value(executor.delete(&id, &partition_key, etag).await?)
                }
                OperationKind::SoftDelete => {
                    let id = arg_str(&args, op, "id")?;
                    let partition_key = arg_str(&args, op, "partitionKey")?;
                    let reason = arg_opt_str(&args, "reason");
                    let deleted_by = arg_opt_str(&args, "deletedBy");
                    to_value(
                        executor
                            .soft_delete(&id, &partition_key, reason, deleted_by)
                            .await?,
                    )
                }
                OperationKind::Restore => {
                    let id = arg_str(&args, op, "id")?;
                    let partition_key = arg_str(&args, op, "partitionKey")?;
                    to_value(executor.restore(&id, &partition_key).await?)
                }
                OperationKind::Increment | OperationKind::Decrement => {
                    let id = arg_str(&args, op, "id")?;
                    let partition_key = arg_str(&args, op, "partitionKey")?;
                    let field = arg_str(&args, op, "field")?;
                    let by = arg_f64(&args, op, "by")?;
                    let payload = if op == OperationKind::Increment {
                        executor.increment(&id, &partition_key, &field, by).await?
                    } else {
                        executor.decrement(&id, &partition_key, &field, by).await?
                    };
                    to_value(payload)
                }
                OperationKind::CreateMany => {
                    let items = arg_items(&args, op)?;
                    to_value(executor.create_many(items).await?)
                }
                OperationKind::UpdateMany => {
                    let items = arg_items(&args, op)?;
                    to_value(executor.update_many(items).await?)
                }
                OperationKind::DeleteMany => {
                    let items = arg_items(&args, op)?;
                    to_value(executor.delete_many(items).await?)
                }
            }
        })
    });
    resolver
}

fn to_value<T: serde::Serialize>(payload: T) -> Result<JsonValue> {
    Ok(serde_json::to_value(payload)?)
}

fn arg_str(args: &JsonValue, op: OperationKind, name: &str) -> Result<String> {
    args.get(name)
        .and_then(JsonValue::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| Error::validation(op.key(), name, "argument is required"))
}

fn arg_opt_str(args: &JsonValue, name: &str) -> Option<String> {
    args.get(name)
        .and_then(JsonValue::as_str)
        .map(ToString::to_string)
}

fn arg_bool(args: &JsonValue, name: &str) -> bool {
    args.get(name).and_then(JsonValue::as_bool).unwrap_or(false)
}

fn arg_f64(args: &JsonValue, op: OperationKind, name: &str) -> Result<f64> {
    args.get(name)
        .and_then(JsonValue::as_f64)
        .ok_or_else(|| Error::validation(op.key(), name, "numeric argument is required"))
}

fn arg_object(args: &JsonValue, op: OperationKind, name: &str) -> Result<JsonObject> {
    args.get(name)
        .and_then(JsonValue::as_object)
        .cloned()
        .ok_or_else(|| Error::validation(op.key(), name, "object argument is required"))
}

fn arg_items(args: &JsonValue, op: OperationKind) -> Result<Vec<JsonValue>> {
    args.get("items")
        .and_then(JsonValue::as_array)
        .cloned()
        .ok_or_else(|| Error::validation(op.key(), "items", "list argument is required"))
}
