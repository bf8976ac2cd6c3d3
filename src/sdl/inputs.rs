//! Input type generation
//!
//! Derives create/update/replace/upsert (and batch) input types from the
//! inferred output types. Derived, never stored: one pass per
//! (operation kind, output type) pair. Nested input emission is
//! deduplicated by a processed-set keyed by output type name that travels
//! through the recursion, so a type referenced from several places is
//! generated exactly once per pass.

use super::render::scalar_sdl_name;
use crate::config::GeneratorConfig;
use crate::schema::{FieldType, InferredSchema};
use crate::types::OperationKind;
use std::collections::{BTreeSet, HashSet};

/// One field of a generated input type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFieldDefinition {
    /// Field name
    pub name: String,
    /// Full SDL type expression (`String!`, `[Int]`, `ArrayOperationInput`)
    pub type_sdl: String,
}

/// A generated input type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTypeDefinition {
    /// Input type name
    pub name: String,
    /// Fields in output-type order
    pub fields: Vec<InputFieldDefinition>,
}

impl InputTypeDefinition {
    /// Render this input type as an SDL block
    pub fn to_sdl(&self) -> String {
        let mut sdl = format!("input {} {{\n", self.name);
        for field in &self.fields {
            sdl.push_str(&format!("  {}: {}\n", field.name, field.type_sdl));
        }
        sdl.push_str("}\n");
        sdl
    }
}

/// The root input type of one generation pass plus every nested input it
/// pulled in
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBundle {
    /// The root input type; `None` when the operation is disabled or takes
    /// no input type
    pub root: Option<InputTypeDefinition>,
    /// Nested input types, in generation order
    pub nested: Vec<InputTypeDefinition>,
}

impl InputBundle {
    /// The empty bundle (disabled operation)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether this bundle renders nothing
    pub fn is_empty(&self) -> bool {
        self.root.is_none() && self.nested.is_empty()
    }

    /// Render the bundle; the empty bundle renders the empty string
    pub fn to_sdl(&self) -> String {
        let mut blocks = Vec::new();
        if let Some(root) = &self.root {
            blocks.push(root.to_sdl());
        }
        for nested in &self.nested {
            blocks.push(nested.to_sdl());
        }
        blocks.join("\n")
    }
}

/// The conventional input type name for an operation over a type
pub fn input_type_name(op: OperationKind, type_name: &str) -> String {
    format!("{}{type_name}Input", op.type_prefix())
}

/// Generates input types from an inferred schema
#[derive(Debug)]
pub struct InputGenerator<'a> {
    schema: &'a InferredSchema,
    config: &'a GeneratorConfig,
}

impl<'a> InputGenerator<'a> {
    /// Create a generator over a schema and configuration
    pub fn new(schema: &'a InferredSchema, config: &'a GeneratorConfig) -> Self {
        Self { schema, config }
    }

    /// Generate the input bundle for one operation, with the conventional
    /// root name.
    pub fn generate(&self, op: OperationKind, exclude_fields: &[String]) -> InputBundle {
        self.generate_named(
            &input_type_name(op, self.schema.root_name()),
            op,
            exclude_fields,
        )
    }

    /// Generate the input bundle for one operation under an explicit root
    /// input type name.
    ///
    /// Returns the empty bundle when the operation is disabled or takes no
    /// derived input type.
    pub fn generate_named(
        &self,
        root_input_name: &str,
        op: OperationKind,
        exclude_fields: &[String],
    ) -> InputBundle {
        if !self.config.operations.is_enabled(op) {
            return InputBundle::empty();
        }

        let mut exclusions: BTreeSet<String> =
            self.config.system_fields.input_exclusions().into_iter().collect();
        exclusions.extend(self.config.exclude_fields.iter().cloned());
        exclusions.extend(exclude_fields.iter().cloned());

        match op {
            OperationKind::Create | OperationKind::Upsert | OperationKind::CreateMany => {
                self.object_pass(root_input_name, op, &exclusions, Mode::Create)
            }
            OperationKind::Update | OperationKind::Replace => {
                self.object_pass(root_input_name, op, &exclusions, Mode::Update)
            }
            OperationKind::UpdateMany => {
                let mut bundle =
                    self.object_pass(root_input_name, op, &exclusions, Mode::Update);
                if let Some(root) = &mut bundle.root {
                    root.fields.splice(0..0, identifying_fields());
                }
                bundle
            }
            OperationKind::DeleteMany => InputBundle {
                root: Some(InputTypeDefinition {
                    name: root_input_name.to_string(),
                    fields: identifying_fields(),
                }),
                nested: Vec::new(),
            },
            // the remaining operations take scalar arguments, not input types
            _ => InputBundle::empty(),
        }
    }

    fn object_pass(
        &self,
        root_input_name: &str,
        op: OperationKind,
        exclusions: &BTreeSet<String>,
        mode: Mode,
    ) -> InputBundle {
        let root_type = self.schema.root_name().to_string();
        let mut processed: HashSet<String> = HashSet::from([root_type.clone()]);
        let mut nested = Vec::new();

        let root = self.input_for_type(
            root_input_name,
            &root_type,
            op,
            exclusions,
            mode,
            &mut processed,
            &mut nested,
        );

        InputBundle {
            root: Some(root),
            nested,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn input_for_type(
        &self,
        input_name: &str,
        output_type: &str,
        op: OperationKind,
        exclusions: &BTreeSet<String>,
        mode: Mode,
        processed: &mut HashSet<String>,
        nested_acc: &mut Vec<InputTypeDefinition>,
    ) -> InputTypeDefinition {
        let mut fields = Vec::new();

        for field in self.schema.fields_of(output_type).unwrap_or_default() {
            if exclusions.contains(&field.name) {
                continue;
            }

            // updates take operation descriptors, never raw array literals
            if mode == Mode::Update && field.is_array {
                fields.push(InputFieldDefinition {
                    name: field.name.clone(),
                    type_sdl: "ArrayOperationInput".to_string(),
                });
                continue;
            }

            let base = match &field.field_type {
                FieldType::Scalar(kind) => scalar_sdl_name(*kind).to_string(),
                FieldType::Named(nested_output) => {
                    let nested_input = format!("{}{nested_output}Input", op.type_prefix());
                    if processed.insert(nested_output.clone()) {
                        let definition = self.input_for_type(
                            &nested_input,
                            nested_output,
                            op,
                            exclusions,
                            mode,
                            processed,
                            nested_acc,
                        );
                        nested_acc.push(definition);
                    }
                    nested_input
                }
            };

            let wrapped = if field.is_array {
                format!("[{base}]")
            } else {
                base
            };
            let type_sdl = if mode == Mode::Create && field.is_required {
                format!("{wrapped}!")
            } else {
                wrapped
            };

            fields.push(InputFieldDefinition {
                name: field.name.clone(),
                type_sdl,
            });
        }

        InputTypeDefinition {
            name: input_name.to_string(),
            fields,
        }
    }
}

/// Input semantics: create keeps required flags, update makes everything
/// optional and routes arrays through operation descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Create,
    Update,
}

/// The identifying head fields injected into batch item inputs
fn identifying_fields() -> Vec<InputFieldDefinition> {
    vec![
        InputFieldDefinition {
            name: "id".to_string(),
            type_sdl: "String!".to_string(),
        },
        InputFieldDefinition {
            name: "partitionKey".to_string(),
            type_sdl: "String!".to_string(),
        },
        InputFieldDefinition {
            name: "etag".to_string(),
            type_sdl: "String".to_string(),
        },
    ]
}
