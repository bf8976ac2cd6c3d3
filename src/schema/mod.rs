//! Schema inference from sampled documents
//!
//! # Features
//!
//! - **Type Unification**: merges heterogeneous observations per structural path
//! - **Nested Type Naming**: every object-valued path becomes a named type
//! - **Polymorphic Arrays**: differing element shapes union their fields
//! - **Partition Key Mining**: classifies key values as hierarchical, compound, or static
//! - **Graceful Degradation**: messy data widens types, never fails a run

mod inference;
mod types;
mod unify;

pub use inference::{classify_partition_keys, SchemaInferrer};
pub use types::{
    FieldDefinition, FieldType, InferredSchema, InferredType, PartitionKeyPattern, ScalarKind,
};
pub use unify::{FieldObservation, ObservationScope, ObservedShape};
