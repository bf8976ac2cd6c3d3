//! Payload type generation
//!
//! One fixed template per operation kind. Every payload carries a request
//! cost field; batch payloads report succeeded/failed collections and an
//! aggregate cost instead of a single value.

use crate::config::GeneratorConfig;
use crate::types::OperationKind;

/// The conventional payload type name for an operation over a type
/// (`CreateProductPayload`, `BatchCreateManyProductPayload`)
pub fn payload_type_name(op: OperationKind, type_name: &str) -> String {
    if op.is_batch() {
        format!("Batch{}{type_name}Payload", op.type_prefix())
    } else {
        format!("{}{type_name}Payload", op.type_prefix())
    }
}

/// Render the payload type for one operation.
///
/// Returns the empty string when the operation is disabled.
pub fn render_payload_sdl(op: OperationKind, type_name: &str, config: &GeneratorConfig) -> String {
    if !config.operations.is_enabled(op) {
        return String::new();
    }

    let mut fields: Vec<String> = Vec::new();
    match op {
        OperationKind::Create | OperationKind::Update | OperationKind::Restore => {
            fields.push(format!("data: {type_name}"));
            fields.push("_etag: String".to_string());
        }
        OperationKind::Read | OperationKind::Replace => {
            fields.push(format!("data: {type_name}"));
        }
        OperationKind::Upsert => {
            fields.push(format!("data: {type_name}"));
            fields.push("_etag: String".to_string());
            fields.push("wasCreated: Boolean!".to_string());
        }
        OperationKind::Delete => {
            fields.push("success: Boolean!".to_string());
            fields.push("deletedId: String".to_string());
        }
        OperationKind::SoftDelete => {
            fields.push("success: Boolean!".to_string());
            fields.push("deletedId: String".to_string());
            fields.push("_etag: String".to_string());
        }
        OperationKind::Increment | OperationKind::Decrement => {
            fields.push("previousValue: Float!".to_string());
            fields.push("newValue: Float!".to_string());
        }
        OperationKind::CreateMany | OperationKind::UpdateMany => {
            fields.push(format!("succeeded: [{type_name}]"));
            fields.push("failed: [BatchOperationFailure]".to_string());
        }
        OperationKind::DeleteMany => {
            fields.push("succeeded: [String]".to_string());
            fields.push("failed: [BatchOperationFailure]".to_string());
        }
    }

    if op.is_batch() {
        fields.push("totalRequestCharge: Float!".to_string());
    } else {
        fields.push("requestCharge: Float!".to_string());
    }

    let mut sdl = format!("type {} {{\n", payload_type_name(op, type_name));
    for field in fields {
        sdl.push_str(&format!("  {field}\n"));
    }
    sdl.push_str("}\n");
    sdl
}
