//! SDL generation from an inferred schema
//!
//! # Features
//!
//! - **Output Types**: one block per inferred type, stable field ordering
//! - **Input Types**: per-operation create/update/upsert/batch variants
//! - **Payload Types**: fixed templates with cost metrics and batch aggregates
//! - **Shared Blocks**: array operation enum/input and batch failure type,
//!   emitted once per document

mod inputs;
mod payloads;
mod render;

pub use inputs::{
    input_type_name, InputBundle, InputFieldDefinition, InputGenerator, InputTypeDefinition,
};
pub use payloads::{payload_type_name, render_payload_sdl};
pub use render::{
    array_operation_sdl, batch_failure_sdl, field_type_sdl, operation_field_name, render_full,
    render_output_types, render_type, scalar_sdl_name,
};

use crate::config::GeneratorConfig;
use crate::schema::InferredSchema;
use crate::types::OperationKind;

/// Render the input SDL for one operation; the empty string when the
/// operation key is excluded.
pub fn generate_input_sdl(
    schema: &InferredSchema,
    config: &GeneratorConfig,
    op: OperationKind,
) -> String {
    InputGenerator::new(schema, config).generate(op, &[]).to_sdl()
}

/// Render the payload SDL for one operation; the empty string when the
/// operation key is excluded.
pub fn generate_payload_sdl(
    schema: &InferredSchema,
    config: &GeneratorConfig,
    op: OperationKind,
) -> String {
    render_payload_sdl(op, schema.root_name(), config)
}

#[cfg(test)]
mod tests;
