//! Array operation processing
//!
//! Updates never accept raw array literals; they carry one of a closed set
//! of operation descriptors instead. Application is pure: the current array
//! is never mutated, and a failed operation yields no result at all.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// The closed set of array operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayOpKind {
    Set,
    Append,
    Prepend,
    Remove,
    Insert,
    Splice,
}

impl ArrayOpKind {
    /// The lowercase wire form
    pub fn key(&self) -> &'static str {
        match self {
            ArrayOpKind::Set => "set",
            ArrayOpKind::Append => "append",
            ArrayOpKind::Prepend => "prepend",
            ArrayOpKind::Remove => "remove",
            ArrayOpKind::Insert => "insert",
            ArrayOpKind::Splice => "splice",
        }
    }
}

impl std::fmt::Display for ArrayOpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// An array mutation descriptor. Pure value object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayOperation {
    /// Which transformation to apply
    #[serde(rename = "type")]
    pub kind: ArrayOpKind,

    /// Value(s) involved; an array spreads into individual elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,

    /// Position for insert/splice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,

    /// Number of elements removed by splice (default 1)
    #[serde(
        rename = "deleteCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub delete_count: Option<i64>,
}

impl ArrayOperation {
    /// Create a `set` operation
    pub fn set(value: impl Into<JsonValue>) -> Self {
        Self {
            kind: ArrayOpKind::Set,
            value: Some(value.into()),
            index: None,
            delete_count: None,
        }
    }

    /// Create an `append` operation
    pub fn append(value: impl Into<JsonValue>) -> Self {
        Self {
            kind: ArrayOpKind::Append,
            value: Some(value.into()),
            index: None,
            delete_count: None,
        }
    }

    /// Create a `prepend` operation
    pub fn prepend(value: impl Into<JsonValue>) -> Self {
        Self {
            kind: ArrayOpKind::Prepend,
            value: Some(value.into()),
            index: None,
            delete_count: None,
        }
    }

    /// Create a `remove` operation
    pub fn remove(value: impl Into<JsonValue>) -> Self {
        Self {
            kind: ArrayOpKind::Remove,
            value: Some(value.into()),
            index: None,
            delete_count: None,
        }
    }

    /// Create an `insert` operation
    pub fn insert(value: impl Into<JsonValue>, index: i64) -> Self {
        Self {
            kind: ArrayOpKind::Insert,
            value: Some(value.into()),
            index: Some(index),
            delete_count: None,
        }
    }

    /// Create a `splice` operation
    pub fn splice(index: i64, delete_count: Option<i64>, value: Option<JsonValue>) -> Self {
        Self {
            kind: ArrayOpKind::Splice,
            value,
            index: Some(index),
            delete_count,
        }
    }

    /// Parse a descriptor from a JSON value, rejecting unrecognized kinds
    /// with the operation name in the error.
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| {
                Error::validation("arrayOperation", "type", "operation kind is required")
            })?;

        if !matches!(
            kind,
            "set" | "append" | "prepend" | "remove" | "insert" | "splice"
        ) {
            return Err(Error::UnknownArrayOperation { kind: kind.into() });
        }

        serde_json::from_value(value.clone()).map_err(|e| {
            Error::validation("arrayOperation", "descriptor", e.to_string())
        })
    }

    /// The operation's value(s), spread into elements.
    fn values(&self) -> Result<Vec<JsonValue>> {
        match &self.value {
            None => Err(Error::validation(
                self.kind.key(),
                "value",
                "value is required",
            )),
            Some(JsonValue::Array(items)) => Ok(items.clone()),
            Some(other) => Ok(vec![other.clone()]),
        }
    }

    /// The operation's index, validated against `0..=max`.
    fn index_in(&self, max: usize) -> Result<usize> {
        let index = self.index.ok_or_else(|| {
            Error::validation(self.kind.key(), "index", "index is required")
        })?;
        if index < 0 || index as usize > max {
            return Err(Error::validation(
                self.kind.key(),
                "index",
                format!("index {index} out of range (0..={max})"),
            ));
        }
        Ok(index as usize)
    }
}

/// Apply an array operation, returning a new array.
///
/// Never mutates `current`; never partially applies. Missing required
/// parameters, an out-of-range index, or a negative delete count fail with
/// a validation error carrying the operation kind.
pub fn apply_array_operation(
    current: &[JsonValue],
    operation: &ArrayOperation,
) -> Result<Vec<JsonValue>> {
    match operation.kind {
        ArrayOpKind::Set => operation.values(),
        ArrayOpKind::Append => {
            let mut result = current.to_vec();
            result.extend(operation.values()?);
            Ok(result)
        }
        ArrayOpKind::Prepend => {
            let mut result = operation.values()?;
            result.extend_from_slice(current);
            Ok(result)
        }
        ArrayOpKind::Remove => {
            let targets = operation.values()?;
            Ok(current
                .iter()
                .filter(|item| !targets.contains(item))
                .cloned()
                .collect())
        }
        ArrayOpKind::Insert => {
            let values = operation.values()?;
            let index = operation.index_in(current.len())?;
            let mut result = current.to_vec();
            result.splice(index..index, values);
            Ok(result)
        }
        ArrayOpKind::Splice => {
            if current.is_empty() {
                return Err(Error::validation(
                    operation.kind.key(),
                    "index",
                    "cannot splice an empty array",
                ));
            }
            let index = operation.index_in(current.len() - 1)?;
            let delete_count = operation.delete_count.unwrap_or(1);
            if delete_count < 0 {
                return Err(Error::validation(
                    operation.kind.key(),
                    "deleteCount",
                    format!("deleteCount {delete_count} must not be negative"),
                ));
            }
            let end = (index + delete_count as usize).min(current.len());
            let replacement = match &operation.value {
                Some(JsonValue::Array(items)) => items.clone(),
                Some(other) => vec![other.clone()],
                None => Vec::new(),
            };
            let mut result = current.to_vec();
            result.splice(index..end, replacement);
            Ok(result)
        }
    }
}
