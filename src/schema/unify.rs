//! Type unification over sampled values
//!
//! Accumulates per-path observations into a field-type lattice. Unification
//! never fails: conflicting observations widen or degrade to
//! [`ScalarKind::Unknown`] with a diagnostic note, so one inconsistent
//! document can never abort an inference run.

use super::types::ScalarKind;
use crate::types::{JsonObject, JsonValue};
use indexmap::IndexMap;

/// The shape a structural path has resolved to so far
#[derive(Debug, Clone, Default)]
pub enum ObservedShape {
    /// Nothing but nulls (or nothing at all) seen yet
    #[default]
    Unobserved,
    /// Scalar values of the given (possibly widened) kind
    Scalar(ScalarKind),
    /// Object values; fields accumulate in the sub-scope
    Object(ObservationScope),
    /// Array values; all elements across all sampled arrays unify into the
    /// single element observation
    Array(Box<FieldObservation>),
}

/// Aggregated observations for one structural path
#[derive(Debug, Clone, Default)]
pub struct FieldObservation {
    /// Non-null observations
    present: usize,
    /// Explicit null observations; these never change the shape
    nulls: usize,
    shape: ObservedShape,
    notes: Vec<String>,
}

impl FieldObservation {
    /// Create an empty observation
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of non-null observations
    pub fn present(&self) -> usize {
        self.present
    }

    /// Number of explicit null observations
    pub fn nulls(&self) -> usize {
        self.nulls
    }

    /// The accumulated shape
    pub fn shape(&self) -> &ObservedShape {
        &self.shape
    }

    /// Notes recorded for degraded merges on this path
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Fold one observed value into the lattice.
    ///
    /// Widening precedence: nulls never force a change; integers widen to
    /// floats on any non-integral observation; any other disagreement
    /// degrades to [`ScalarKind::Unknown`] with a note.
    pub fn observe(&mut self, value: &JsonValue) {
        match value {
            JsonValue::Null => {
                self.nulls += 1;
            }
            JsonValue::Bool(_) => {
                self.present += 1;
                self.merge_scalar(ScalarKind::Boolean);
            }
            JsonValue::Number(n) => {
                self.present += 1;
                let kind = if n.is_i64() || n.is_u64() {
                    ScalarKind::Integer
                } else {
                    ScalarKind::Float
                };
                self.merge_scalar(kind);
            }
            JsonValue::String(_) => {
                self.present += 1;
                self.merge_scalar(ScalarKind::String);
            }
            JsonValue::Object(map) => {
                self.present += 1;
                self.merge_object(map);
            }
            JsonValue::Array(items) => {
                self.present += 1;
                self.merge_array(items);
            }
        }
    }

    fn merge_scalar(&mut self, kind: ScalarKind) {
        match &mut self.shape {
            ObservedShape::Unobserved => {
                self.shape = ObservedShape::Scalar(kind);
            }
            ObservedShape::Scalar(existing) => {
                let (merged, conflicted) = existing.merge(kind);
                if conflicted {
                    self.notes
                        .push(format!("scalar conflict: {existing} vs {kind}"));
                }
                *existing = merged;
            }
            ObservedShape::Object(_) | ObservedShape::Array(_) => {
                self.degrade(format!("{kind} value observed on a structured path"));
            }
        }
    }

    fn merge_object(&mut self, map: &JsonObject) {
        match &mut self.shape {
            ObservedShape::Unobserved => {
                let mut scope = ObservationScope::new();
                scope.observe_document(map);
                self.shape = ObservedShape::Object(scope);
            }
            ObservedShape::Object(scope) => {
                scope.observe_document(map);
            }
            ObservedShape::Scalar(_) | ObservedShape::Array(_) => {
                self.degrade("object value observed on a non-object path".to_string());
            }
        }
    }

    fn merge_array(&mut self, items: &[JsonValue]) {
        match &mut self.shape {
            ObservedShape::Unobserved => {
                let mut element = Box::new(FieldObservation::new());
                for item in items {
                    element.observe(item);
                }
                self.shape = ObservedShape::Array(element);
            }
            ObservedShape::Array(element) => {
                for item in items {
                    element.observe(item);
                }
            }
            ObservedShape::Scalar(_) | ObservedShape::Object(_) => {
                self.degrade("array value observed on a non-array path".to_string());
            }
        }
    }

    /// Collapse the shape to the Unknown scalar, recording why
    fn degrade(&mut self, note: String) {
        if !matches!(self.shape, ObservedShape::Scalar(ScalarKind::Unknown)) {
            self.notes.push(note);
        }
        self.shape = ObservedShape::Scalar(ScalarKind::Unknown);
    }
}

/// Observations for every field of one object path, in first-observed order
#[derive(Debug, Clone, Default)]
pub struct ObservationScope {
    fields: IndexMap<String, FieldObservation>,
    samples: usize,
}

impl ObservationScope {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of object samples fed into this scope
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Iterate fields in first-observed order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldObservation)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Look up one field's observation
    pub fn get(&self, name: &str) -> Option<&FieldObservation> {
        self.fields.get(name)
    }

    /// Fold one object sample into the scope.
    ///
    /// Fields absent from the sample simply do not advance their presence
    /// count, which is what makes them optional in the inferred type.
    pub fn observe_document(&mut self, document: &JsonObject) {
        self.samples += 1;
        for (name, value) in document {
            self.fields
                .entry(name.clone())
                .or_default()
                .observe(value);
        }
    }

    /// Whether a field was present (non-null) in every sample of this scope
    pub fn is_required(&self, name: &str) -> bool {
        self.get(name)
            .map(|obs| obs.present() > 0 && obs.present() == self.samples)
            .unwrap_or(false)
    }
}
