//! SDL rendering for inferred output types
//!
//! Pure functions of the [`InferredSchema`]; no I/O. Field ordering
//! reproduces the schema's ordering exactly, so identical inference runs
//! render byte-identical text.

use super::inputs::InputGenerator;
use super::payloads::render_payload_sdl;
use crate::config::GeneratorConfig;
use crate::schema::{FieldDefinition, FieldType, InferredSchema, InferredType, ScalarKind};
use crate::types::{uncapitalize, OperationKind};

/// Fixed scalar kind to SDL name table
pub fn scalar_sdl_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::String => "String",
        ScalarKind::Integer => "Int",
        ScalarKind::Float => "Float",
        ScalarKind::Boolean => "Boolean",
        ScalarKind::Unknown => "JSON",
    }
}

/// SDL type expression for one field: base name, list wrapping, non-null
/// marker
pub fn field_type_sdl(field: &FieldDefinition) -> String {
    let base = match &field.field_type {
        FieldType::Scalar(kind) => scalar_sdl_name(*kind).to_string(),
        FieldType::Named(name) => name.clone(),
    };
    let wrapped = if field.is_array {
        format!("[{base}]")
    } else {
        base
    };
    if field.is_required {
        format!("{wrapped}!")
    } else {
        wrapped
    }
}

/// Render one named type block
pub fn render_type(inferred: &InferredType) -> String {
    let (name, fields) = match inferred {
        InferredType::Object { name, fields } => (name, fields),
        _ => return String::new(),
    };

    let mut sdl = format!("type {name} {{\n");
    for field in fields {
        sdl.push_str(&format!("  {}: {}\n", field.name, field_type_sdl(field)));
    }
    sdl.push_str("}\n");
    sdl
}

/// Render the root type followed by every nested type
pub fn render_output_types(schema: &InferredSchema) -> String {
    let mut sdl = render_type(&schema.root);
    for nested in schema.types.values() {
        sdl.push('\n');
        sdl.push_str(&render_type(nested));
    }
    sdl
}

/// The fixed global array-operation blocks, emitted once per document
/// regardless of how many types reference them
pub fn array_operation_sdl() -> String {
    concat!(
        "enum ArrayOperationType {\n",
        "  SET\n",
        "  APPEND\n",
        "  PREPEND\n",
        "  REMOVE\n",
        "  INSERT\n",
        "  SPLICE\n",
        "}\n",
        "\n",
        "input ArrayOperationInput {\n",
        "  type: ArrayOperationType!\n",
        "  value: JSON\n",
        "  index: Int\n",
        "  deleteCount: Int\n",
        "}\n",
    )
    .to_string()
}

/// The shared batch failure type, emitted once when any batch operation is
/// enabled
pub fn batch_failure_sdl() -> String {
    concat!(
        "type BatchOperationFailure {\n",
        "  index: Int!\n",
        "  id: String\n",
        "  error: String!\n",
        "}\n",
    )
    .to_string()
}

/// Argument list for one operation's Query/Mutation field
fn operation_args(op: OperationKind, type_name: &str) -> String {
    match op {
        OperationKind::Create => format!("input: Create{type_name}Input!"),
        OperationKind::Read => {
            "id: String!, partitionKey: String!, includeDeleted: Boolean".to_string()
        }
        OperationKind::Update => format!(
            "id: String!, partitionKey: String!, input: Update{type_name}Input!, etag: String"
        ),
        OperationKind::Replace => format!(
            "id: String!, partitionKey: String!, input: Replace{type_name}Input!, etag: String"
        ),
        OperationKind::Upsert => format!("input: Upsert{type_name}Input!"),
        OperationKind::Delete => {
            "id: String!, partitionKey: String!, etag: String".to_string()
        }
        OperationKind::SoftDelete => {
            "id: String!, partitionKey: String!, reason: String, deletedBy: String".to_string()
        }
        OperationKind::Restore => "id: String!, partitionKey: String!".to_string(),
        OperationKind::Increment | OperationKind::Decrement => {
            "id: String!, partitionKey: String!, field: String!, by: Float!".to_string()
        }
        OperationKind::CreateMany => format!("items: [CreateMany{type_name}Input!]!"),
        OperationKind::UpdateMany => format!("items: [UpdateMany{type_name}Input!]!"),
        OperationKind::DeleteMany => format!("items: [DeleteMany{type_name}Input!]!"),
    }
}

/// The resolver field name for an operation (`createProduct`, `product`,
/// `softDeleteProduct`, ...)
pub fn operation_field_name(op: OperationKind, type_name: &str) -> String {
    match op {
        OperationKind::Read => uncapitalize(type_name),
        _ => format!("{}{type_name}", op.key()),
    }
}

/// Render the Query and Mutation blocks for the enabled operations
fn render_operation_blocks(schema: &InferredSchema, config: &GeneratorConfig) -> String {
    let type_name = schema.root_name();
    let mut queries = Vec::new();
    let mut mutations = Vec::new();

    for op in config.operations.enabled() {
        let args = operation_args(op, type_name);
        let field = format!(
            "  {}({args}): {}\n",
            operation_field_name(op, type_name),
            super::payloads::payload_type_name(op, type_name)
        );
        if op == OperationKind::Read {
            queries.push(field);
        } else {
            mutations.push(field);
        }
    }

    let mut sdl = String::new();
    if !queries.is_empty() {
        sdl.push_str("type Query {\n");
        queries.iter().for_each(|q| sdl.push_str(q));
        sdl.push_str("}\n");
    }
    if !mutations.is_empty() {
        if !sdl.is_empty() {
            sdl.push('\n');
        }
        sdl.push_str("type Mutation {\n");
        mutations.iter().for_each(|m| sdl.push_str(m));
        sdl.push_str("}\n");
    }
    sdl
}

/// Assemble the complete SDL document: scalars, output types, shared
/// blocks, and per-enabled-operation inputs and payloads.
pub fn render_full(schema: &InferredSchema, config: &GeneratorConfig) -> String {
    let type_name = schema.root_name();
    let mut blocks: Vec<String> = vec!["scalar JSON\n".to_string()];

    blocks.push(render_output_types(schema));
    blocks.push(array_operation_sdl());

    if OperationKind::ALL
        .into_iter()
        .any(|op| op.is_batch() && config.operations.is_enabled(op))
    {
        blocks.push(batch_failure_sdl());
    }

    let generator = InputGenerator::new(schema, config);
    for op in config.operations.enabled() {
        let inputs = generator.generate(op, &[]).to_sdl();
        if !inputs.is_empty() {
            blocks.push(inputs);
        }
        let payload = render_payload_sdl(op, type_name, config);
        if !payload.is_empty() {
            blocks.push(payload);
        }
    }

    blocks.push(render_operation_blocks(schema, config));

    let mut sdl = blocks
        .into_iter()
        .filter(|b| !b.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if !sdl.ends_with('\n') {
        sdl.push('\n');
    }
    sdl
}
