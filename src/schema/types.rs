//! Inferred schema types

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Scalar kind of an inferred field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Boolean,
    /// Conflicting or never-typed observations degrade to this catch-all
    Unknown,
}

impl ScalarKind {
    /// Merge two scalar kinds, returning the widened kind and whether the
    /// pair was a genuine conflict (rather than a clean widening)
    pub fn merge(self, other: ScalarKind) -> (ScalarKind, bool) {
        match (self, other) {
            (a, b) if a == b => (a, false),
            (ScalarKind::Integer, ScalarKind::Float)
            | (ScalarKind::Float, ScalarKind::Integer) => (ScalarKind::Float, false),
            // Unknown is absorbing; the conflict was already noted when the
            // field first degraded
            (ScalarKind::Unknown, _) | (_, ScalarKind::Unknown) => (ScalarKind::Unknown, false),
            _ => (ScalarKind::Unknown, true),
        }
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarKind::String => write!(f, "string"),
            ScalarKind::Integer => write!(f, "integer"),
            ScalarKind::Float => write!(f, "float"),
            ScalarKind::Boolean => write!(f, "boolean"),
            ScalarKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// The type a field resolves to: a scalar kind or a named nested type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    /// A scalar kind
    Scalar(ScalarKind),
    /// A reference to a named nested object type
    Named(String),
}

impl FieldType {
    /// The custom type name, when this field references a nested type
    pub fn custom_type_name(&self) -> Option<&str> {
        match self {
            FieldType::Named(name) => Some(name),
            FieldType::Scalar(_) => None,
        }
    }
}

/// One field of an inferred object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Field name as observed in the documents
    pub name: String,
    /// Resolved field type
    pub field_type: FieldType,
    /// Whether the field holds a list of its type
    pub is_array: bool,
    /// Whether the field was present (non-null) in every sample
    pub is_required: bool,
}

impl FieldDefinition {
    /// Create a scalar field
    pub fn scalar(name: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Scalar(kind),
            is_array: false,
            is_required: false,
        }
    }

    /// Create a field referencing a nested type
    pub fn named(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Named(type_name.into()),
            is_array: false,
            is_required: false,
        }
    }

    /// Mark as an array field
    #[must_use]
    pub fn as_array(mut self) -> Self {
        self.is_array = true;
        self
    }

    /// Mark as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }
}

/// An inferred type: a scalar kind, a named object type, or an array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InferredType {
    /// A scalar kind
    Scalar(ScalarKind),
    /// A named object type with an ordered field list
    Object {
        /// Globally unique type name
        name: String,
        /// Fields in first-observed order
        fields: Vec<FieldDefinition>,
    },
    /// An array of an inferred element type
    Array(Box<InferredType>),
}

impl InferredType {
    /// The object fields, when this is an object type
    pub fn fields(&self) -> Option<&[FieldDefinition]> {
        match self {
            InferredType::Object { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// The type name, when this is an object type
    pub fn name(&self) -> Option<&str> {
        match self {
            InferredType::Object { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Structural pattern detected across sampled partition-key values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PartitionKeyPattern {
    /// Values share a path-like separator with varying depth
    /// (`tenants/acme/users`, `tenants/acme/users/42`)
    Hierarchical {
        /// The repeated-segment separator
        separator: char,
        /// Deepest observed segment count
        max_depth: usize,
    },
    /// Values split into a fixed small number of segments
    /// (`US-WEST`, `EU-EAST`)
    Compound {
        /// The flat delimiter
        separator: char,
        /// Fixed segment count
        segments: usize,
    },
    /// All sampled values identical, or no pattern could be established
    #[default]
    Static,
}

/// The result of one inference run: a root type plus its named nested types.
///
/// Built once, immutable thereafter; all downstream generators consume it
/// read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferredSchema {
    /// The root object type
    pub root: InferredType,

    /// Named nested types, keyed by their unique names
    pub types: BTreeMap<String, InferredType>,

    /// Partition key field the samples were mined on, if configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key_field: Option<String>,

    /// Structural pattern of the sampled partition-key values
    pub partition_key_pattern: PartitionKeyPattern,

    /// Number of documents that fed the inference
    pub sample_count: usize,

    /// Human-readable notes about degraded merges, with path context
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl InferredSchema {
    /// The root type name
    pub fn root_name(&self) -> &str {
        self.root.name().unwrap_or_default()
    }

    /// Fields of the root type
    pub fn root_fields(&self) -> &[FieldDefinition] {
        self.root.fields().unwrap_or_default()
    }

    /// Fields of a named type (the root or any nested type)
    pub fn fields_of(&self, type_name: &str) -> Option<&[FieldDefinition]> {
        if self.root.name() == Some(type_name) {
            return self.root.fields();
        }
        self.types.get(type_name).and_then(InferredType::fields)
    }

    /// Names of the root fields that hold arrays.
    ///
    /// The mutation executor uses this to route update deltas through the
    /// array operation processor.
    pub fn array_fields(&self) -> HashSet<String> {
        self.root_fields()
            .iter()
            .filter(|f| f.is_array)
            .map(|f| f.name.clone())
            .collect()
    }
}
