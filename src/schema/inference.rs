//! Schema inference from sampled documents
//!
//! Drives sampling, feeds every field path through the type unifier, and
//! converts the accumulated observation tree into an [`InferredSchema`]:
//! one root type plus a named type per object-valued path.

use super::types::{
    FieldDefinition, InferredSchema, InferredType, PartitionKeyPattern, ScalarKind,
};
use super::unify::{FieldObservation, ObservationScope, ObservedShape};
use crate::config::SamplingConfig;
use crate::error::Result;
use crate::store::{DocumentStore, QuerySpec};
use crate::types::{capitalize, JsonValue};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Separators tried when mining partition-key values, in precedence order
const PARTITION_SEPARATORS: [char; 5] = ['/', ':', '#', '|', '-'];

/// Segment counts considered "a fixed small number" for compound keys
const COMPOUND_SEGMENTS: std::ops::RangeInclusive<usize> = 2..=4;

/// Schema inferrer with sampling configuration
#[derive(Debug, Clone, Default)]
pub struct SchemaInferrer {
    sampling: SamplingConfig,
}

impl SchemaInferrer {
    /// Create an inferrer with default sampling settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an inferrer with the given sampling settings
    pub fn with_config(sampling: SamplingConfig) -> Self {
        Self { sampling }
    }

    /// Infer a schema from already-sampled documents.
    ///
    /// At most `sample_size` documents are consumed; a smaller input is used
    /// in full. Never fails: inconsistent documents degrade to best-effort
    /// merged types with diagnostics.
    pub fn infer(&self, documents: &[JsonValue], type_name: &str) -> InferredSchema {
        let limit = documents.len().min(self.sampling.sample_size);
        let sampled = &documents[..limit];

        let mut scope = ObservationScope::new();
        for document in sampled {
            if let Some(object) = document.as_object() {
                scope.observe_document(object);
            } else {
                debug!(%type_name, "skipping non-object sample");
            }
        }

        let (partition_key_field, partition_key_pattern) = self.partition_pattern(sampled);

        let mut types = BTreeMap::new();
        let mut diagnostics = Vec::new();
        let fields = convert_scope(&scope, type_name, &mut types, &mut diagnostics, type_name);

        for note in &diagnostics {
            debug!("{note}");
        }
        info!(
            %type_name,
            samples = scope.samples(),
            nested_types = types.len(),
            "schema inference complete"
        );

        InferredSchema {
            root: InferredType::Object {
                name: type_name.to_string(),
                fields,
            },
            types,
            partition_key_field,
            partition_key_pattern,
            sample_count: scope.samples(),
            diagnostics,
        }
    }

    /// Sample a container through its query capability, then infer.
    pub async fn infer_from_store(
        &self,
        store: &dyn DocumentStore,
        type_name: &str,
    ) -> Result<InferredSchema> {
        let response = store
            .query(&QuerySpec::sample(self.sampling.sample_size))
            .await?;
        Ok(self.infer(&response.items, type_name))
    }

    /// Mine the configured partition-key field across the samples
    fn partition_pattern(
        &self,
        sampled: &[JsonValue],
    ) -> (Option<String>, PartitionKeyPattern) {
        let Some(field) = self.sampling.partition_key_field() else {
            return (None, PartitionKeyPattern::Static);
        };

        let values: Vec<String> = sampled
            .iter()
            .filter_map(|doc| doc.get(field))
            .filter_map(|v| match v {
                JsonValue::String(s) => Some(s.clone()),
                JsonValue::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect();

        (
            Some(field.to_string()),
            classify_partition_keys(&values),
        )
    }
}

/// Classify sampled partition-key values as hierarchical, compound, or
/// static. Ambiguity never blocks inference; ties default to `Static`.
pub fn classify_partition_keys(values: &[String]) -> PartitionKeyPattern {
    let non_empty: Vec<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .collect();

    if non_empty.is_empty() {
        return PartitionKeyPattern::Static;
    }
    if non_empty.iter().all(|v| *v == non_empty[0]) {
        return PartitionKeyPattern::Static;
    }

    for separator in PARTITION_SEPARATORS {
        if !non_empty.iter().all(|v| v.contains(separator)) {
            continue;
        }
        let depths: Vec<usize> = non_empty
            .iter()
            .map(|v| v.split(separator).count())
            .collect();
        let min = *depths.iter().min().unwrap_or(&0);
        let max = *depths.iter().max().unwrap_or(&0);

        if max > min {
            return PartitionKeyPattern::Hierarchical {
                separator,
                max_depth: max,
            };
        }
        if COMPOUND_SEGMENTS.contains(&min) {
            return PartitionKeyPattern::Compound {
                separator,
                segments: min,
            };
        }
    }

    PartitionKeyPattern::Static
}

/// Convert an observation scope into an ordered field list, registering a
/// named nested type for every object-valued path.
fn convert_scope(
    scope: &ObservationScope,
    type_name: &str,
    types: &mut BTreeMap<String, InferredType>,
    diagnostics: &mut Vec<String>,
    path: &str,
) -> Vec<FieldDefinition> {
    let mut fields = Vec::new();

    for (name, observation) in scope.fields() {
        let field_path = format!("{path}.{name}");
        for note in observation.notes() {
            diagnostics.push(format!("{field_path}: {note}"));
        }

        let required = scope.is_required(name);
        let field = match observation.shape() {
            ObservedShape::Unobserved => {
                FieldDefinition::scalar(name, ScalarKind::Unknown)
            }
            ObservedShape::Scalar(kind) => FieldDefinition::scalar(name, *kind),
            ObservedShape::Object(sub_scope) => {
                let nested_name = format!("{type_name}{}", capitalize(name));
                let nested_fields =
                    convert_scope(sub_scope, &nested_name, types, diagnostics, &field_path);
                types.insert(
                    nested_name.clone(),
                    InferredType::Object {
                        name: nested_name.clone(),
                        fields: nested_fields,
                    },
                );
                FieldDefinition::named(name, nested_name)
            }
            ObservedShape::Array(element) => {
                convert_element(element, name, type_name, types, diagnostics, &field_path)
                    .as_array()
            }
        };

        fields.push(if required { field.required() } else { field });
    }

    fields
}

/// Resolve the unified element observation of an array path
fn convert_element(
    element: &FieldObservation,
    name: &str,
    type_name: &str,
    types: &mut BTreeMap<String, InferredType>,
    diagnostics: &mut Vec<String>,
    path: &str,
) -> FieldDefinition {
    for note in element.notes() {
        diagnostics.push(format!("{path}[]: {note}"));
    }

    match element.shape() {
        ObservedShape::Unobserved => FieldDefinition::scalar(name, ScalarKind::Unknown),
        ObservedShape::Scalar(kind) => FieldDefinition::scalar(name, *kind),
        ObservedShape::Object(sub_scope) => {
            let nested_name = format!("{type_name}{}", capitalize(name));
            let nested_fields =
                convert_scope(sub_scope, &nested_name, types, diagnostics, path);
            types.insert(
                nested_name.clone(),
                InferredType::Object {
                    name: nested_name.clone(),
                    fields: nested_fields,
                },
            );
            FieldDefinition::named(name, nested_name)
        }
        ObservedShape::Array(_) => {
            diagnostics.push(format!("{path}[]: nested arrays flatten to the JSON scalar"));
            FieldDefinition::scalar(name, ScalarKind::Unknown)
        }
    }
}
