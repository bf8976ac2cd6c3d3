//! SDL generation tests

use super::*;
use crate::config::{GeneratorConfig, OperationConfig};
use crate::schema::{
    FieldDefinition, InferredSchema, InferredType, PartitionKeyPattern, ScalarKind, SchemaInferrer,
};
use crate::types::OperationKind;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;

fn product_schema() -> InferredSchema {
    let docs = vec![
        json!({
            "id": "p1",
            "pk": "tenant-1",
            "name": "Widget",
            "price": 9.99,
            "tags": ["new"],
            "dimensions": {"width": 10, "height": 20}
        }),
        json!({
            "id": "p2",
            "pk": "tenant-1",
            "name": "Gadget",
            "price": 19,
            "tags": ["sale", "popular"],
            "dimensions": {"width": 5, "height": 8}
        }),
    ];
    SchemaInferrer::new().infer(&docs, "Product")
}

/// A hand-built schema where two fields reference the same nested type
fn shared_nested_schema() -> InferredSchema {
    let address = InferredType::Object {
        name: "OrderAddress".to_string(),
        fields: vec![
            FieldDefinition::scalar("street", ScalarKind::String).required(),
            FieldDefinition::scalar("city", ScalarKind::String),
        ],
    };
    InferredSchema {
        root: InferredType::Object {
            name: "Order".to_string(),
            fields: vec![
                FieldDefinition::scalar("id", ScalarKind::String).required(),
                FieldDefinition::named("shipping", "OrderAddress"),
                FieldDefinition::named("billing", "OrderAddress"),
            ],
        },
        types: BTreeMap::from([("OrderAddress".to_string(), address)]),
        partition_key_field: None,
        partition_key_pattern: PartitionKeyPattern::Static,
        sample_count: 1,
        diagnostics: Vec::new(),
    }
}

#[test]
fn test_scalar_mapping_table() {
    assert_eq!(scalar_sdl_name(ScalarKind::String), "String");
    assert_eq!(scalar_sdl_name(ScalarKind::Integer), "Int");
    assert_eq!(scalar_sdl_name(ScalarKind::Float), "Float");
    assert_eq!(scalar_sdl_name(ScalarKind::Boolean), "Boolean");
    assert_eq!(scalar_sdl_name(ScalarKind::Unknown), "JSON");
}

#[test]
fn test_render_output_type() {
    let schema = product_schema();
    let sdl = render_type(&schema.root);

    assert!(sdl.starts_with("type Product {\n"));
    assert!(sdl.contains("  id: String!\n"));
    assert!(sdl.contains("  price: Float!\n"));
    assert!(sdl.contains("  tags: [String]!\n"));
    assert!(sdl.contains("  dimensions: ProductDimensions!\n"));
    assert!(sdl.ends_with("}\n"));
}

#[test]
fn test_render_nested_types_in_order() {
    let schema = product_schema();
    let sdl = render_output_types(&schema);

    let product_at = sdl.find("type Product {").unwrap();
    let dimensions_at = sdl.find("type ProductDimensions {").unwrap();
    assert!(product_at < dimensions_at);
    assert!(sdl.contains("  width: Int!\n"));
}

#[test]
fn test_create_input_preserves_required_and_excludes_system_fields() {
    let schema = product_schema();
    let config = GeneratorConfig::default();
    let sdl = generate_input_sdl(&schema, &config, OperationKind::Create);

    assert!(sdl.contains("input CreateProductInput {"));
    assert!(sdl.contains("  name: String!\n"));
    assert!(sdl.contains("  tags: [String]!\n"));
    assert!(sdl.contains("  dimensions: CreateProductDimensionsInput!\n"));
    assert!(sdl.contains("input CreateProductDimensionsInput {"));
    // the partition key stays addressable; the id and token do not
    assert!(sdl.contains("  pk: String!\n"));
    assert!(!sdl.contains("\n  id:"));
    assert!(!sdl.contains("_etag"));
}

#[test]
fn test_update_input_is_all_optional_with_array_operations() {
    let schema = product_schema();
    let config = GeneratorConfig::default();
    let sdl = generate_input_sdl(&schema, &config, OperationKind::Update);

    assert!(sdl.contains("input UpdateProductInput {"));
    assert!(sdl.contains("  name: String\n"));
    assert!(!sdl.contains("String!"));
    // updates never accept raw array literals
    assert!(sdl.contains("  tags: ArrayOperationInput\n"));
    assert!(!sdl.contains("[String]"));
    assert!(sdl.contains("  dimensions: UpdateProductDimensionsInput\n"));
}

#[test]
fn test_shared_nested_type_generated_once_per_pass() {
    let schema = shared_nested_schema();
    let config = GeneratorConfig::default();
    let bundle = InputGenerator::new(&schema, &config).generate(OperationKind::Create, &[]);

    let root = bundle.root.unwrap();
    let shipping = root.fields.iter().find(|f| f.name == "shipping").unwrap();
    let billing = root.fields.iter().find(|f| f.name == "billing").unwrap();
    assert_eq!(shipping.type_sdl, "CreateOrderAddressInput");
    assert_eq!(billing.type_sdl, "CreateOrderAddressInput");

    // referenced twice, emitted once
    assert_eq!(bundle.nested.len(), 1);
    assert_eq!(bundle.nested[0].name, "CreateOrderAddressInput");
}

#[test]
fn test_caller_excludes_are_unioned_with_system_fields() {
    let schema = product_schema();
    let config = GeneratorConfig::default();
    let bundle = InputGenerator::new(&schema, &config)
        .generate(OperationKind::Create, &["price".to_string()]);

    let root = bundle.root.unwrap();
    assert!(root.fields.iter().all(|f| f.name != "price"));
    assert!(root.fields.iter().all(|f| f.name != "id"));
    assert!(root.fields.iter().any(|f| f.name == "name"));
}

#[test]
fn test_update_many_input_injects_identifying_fields() {
    let schema = product_schema();
    let config = GeneratorConfig::default();
    let bundle = InputGenerator::new(&schema, &config).generate(OperationKind::UpdateMany, &[]);

    let root = bundle.root.unwrap();
    assert_eq!(root.name, "UpdateManyProductInput");
    assert_eq!(root.fields[0].name, "id");
    assert_eq!(root.fields[0].type_sdl, "String!");
    assert_eq!(root.fields[1].name, "partitionKey");
    assert_eq!(root.fields[2].name, "etag");
    assert_eq!(root.fields[2].type_sdl, "String");
    // body fields follow with update semantics
    assert!(root
        .fields
        .iter()
        .any(|f| f.name == "tags" && f.type_sdl == "ArrayOperationInput"));
}

#[test]
fn test_delete_many_input_is_fixed() {
    let schema = product_schema();
    let config = GeneratorConfig::default();
    let sdl = generate_input_sdl(&schema, &config, OperationKind::DeleteMany);

    assert_eq!(
        sdl,
        "input DeleteManyProductInput {\n  id: String!\n  partitionKey: String!\n  etag: String\n}\n"
    );
}

#[test]
fn test_disabled_operations_render_empty_strings() {
    let config = GeneratorConfig::with_operations(OperationConfig::include([
        OperationKind::Create,
        OperationKind::Read,
    ]));

    for type_name in ["Product", "Invoice", "UserProfile"] {
        let docs = vec![json!({"id": "1", "pk": "a", "name": "x", "tags": ["t"]})];
        let schema = SchemaInferrer::new().infer(&docs, type_name);

        assert_eq!(
            generate_input_sdl(&schema, &config, OperationKind::Update),
            ""
        );
        assert_eq!(
            generate_payload_sdl(&schema, &config, OperationKind::Delete),
            ""
        );

        let create = generate_input_sdl(&schema, &config, OperationKind::Create);
        assert!(create.contains(&format!("input Create{type_name}Input {{")));
        let payload = generate_payload_sdl(&schema, &config, OperationKind::Create);
        assert!(payload.contains(&format!("type Create{type_name}Payload {{")));
    }
}

#[test]
fn test_payload_templates() {
    let config = GeneratorConfig::default();

    let create = render_payload_sdl(OperationKind::Create, "Product", &config);
    assert!(create.contains("type CreateProductPayload {"));
    assert!(create.contains("  data: Product\n"));
    assert!(create.contains("  _etag: String\n"));
    assert!(create.contains("  requestCharge: Float!\n"));

    let upsert = render_payload_sdl(OperationKind::Upsert, "Product", &config);
    assert!(upsert.contains("  wasCreated: Boolean!\n"));

    let delete = render_payload_sdl(OperationKind::Delete, "Product", &config);
    assert!(delete.contains("  success: Boolean!\n"));
    assert!(delete.contains("  deletedId: String\n"));
    assert!(!delete.contains("data:"));

    let soft_delete = render_payload_sdl(OperationKind::SoftDelete, "Product", &config);
    assert!(soft_delete.contains("  _etag: String\n"));
    assert!(soft_delete.contains("  success: Boolean!\n"));

    let increment = render_payload_sdl(OperationKind::Increment, "Product", &config);
    assert!(increment.contains("  previousValue: Float!\n"));
    assert!(increment.contains("  newValue: Float!\n"));
}

#[test]
fn test_batch_payload_templates() {
    let config = GeneratorConfig::default();

    let create_many = render_payload_sdl(OperationKind::CreateMany, "Product", &config);
    assert!(create_many.contains("type BatchCreateManyProductPayload {"));
    assert!(create_many.contains("  succeeded: [Product]\n"));
    assert!(create_many.contains("  failed: [BatchOperationFailure]\n"));
    assert!(create_many.contains("  totalRequestCharge: Float!\n"));
    assert!(!create_many.contains("  requestCharge: Float!\n"));

    let delete_many = render_payload_sdl(OperationKind::DeleteMany, "Product", &config);
    assert!(delete_many.contains("type BatchDeleteManyProductPayload {"));
    assert!(delete_many.contains("  succeeded: [String]\n"));
}

#[test]
fn test_operation_field_names() {
    assert_eq!(
        operation_field_name(OperationKind::Create, "Product"),
        "createProduct"
    );
    assert_eq!(operation_field_name(OperationKind::Read, "Product"), "product");
    assert_eq!(
        operation_field_name(OperationKind::SoftDelete, "Product"),
        "softDeleteProduct"
    );
    assert_eq!(
        operation_field_name(OperationKind::CreateMany, "Product"),
        "createManyProduct"
    );
}

#[test]
fn test_full_render_contains_shared_blocks_once() {
    let schema = product_schema();
    let config = GeneratorConfig::default();
    let sdl = render_full(&schema, &config);

    assert_eq!(sdl.matches("scalar JSON").count(), 1);
    assert_eq!(sdl.matches("enum ArrayOperationType {").count(), 1);
    assert_eq!(sdl.matches("input ArrayOperationInput {").count(), 1);
    assert_eq!(sdl.matches("type BatchOperationFailure {").count(), 1);
    assert!(sdl.contains("type Query {"));
    assert!(sdl.contains("type Mutation {"));
    assert!(sdl.contains("  createProduct(input: CreateProductInput!): CreateProductPayload\n"));
    assert!(sdl.contains(
        "  product(id: String!, partitionKey: String!, includeDeleted: Boolean): ReadProductPayload\n"
    ));
}

#[test]
fn test_batch_failure_block_omitted_when_no_batch_enabled() {
    let schema = product_schema();
    let config = GeneratorConfig::with_operations(OperationConfig::exclude([
        OperationKind::CreateMany,
        OperationKind::UpdateMany,
        OperationKind::DeleteMany,
    ]));
    let sdl = render_full(&schema, &config);
    assert!(!sdl.contains("BatchOperationFailure"));
}

#[test]
fn test_render_is_deterministic_byte_for_byte() {
    let docs = vec![
        json!({"id": "1", "pk": "t/1", "name": "a", "meta": {"x": 1}, "tags": ["p"]}),
        json!({"id": "2", "pk": "t/1/2", "name": "b", "meta": {"y": 2.5}}),
    ];
    let config = GeneratorConfig::default();

    let first = render_full(&SchemaInferrer::new().infer(&docs, "Entry"), &config);
    let second = render_full(&SchemaInferrer::new().infer(&docs, "Entry"), &config);
    assert_eq!(first, second);
}
