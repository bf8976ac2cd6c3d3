//! Common types used throughout Autograph CDK
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Operation Kind
// ============================================================================

/// The closed set of recognized operation keys.
///
/// Every generated contract and every runtime resolver is keyed by one of
/// these. The wire form is camelCase (`softDelete`, `createMany`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Replace,
    Upsert,
    Delete,
    SoftDelete,
    Restore,
    Increment,
    Decrement,
    CreateMany,
    UpdateMany,
    DeleteMany,
}

impl OperationKind {
    /// All operation kinds, in declaration order
    pub const ALL: [OperationKind; 13] = [
        OperationKind::Create,
        OperationKind::Read,
        OperationKind::Update,
        OperationKind::Replace,
        OperationKind::Upsert,
        OperationKind::Delete,
        OperationKind::SoftDelete,
        OperationKind::Restore,
        OperationKind::Increment,
        OperationKind::Decrement,
        OperationKind::CreateMany,
        OperationKind::UpdateMany,
        OperationKind::DeleteMany,
    ];

    /// The camelCase key used in configuration and resolver names
    pub fn key(&self) -> &'static str {
        match self {
            OperationKind::Create => "create",
            OperationKind::Read => "read",
            OperationKind::Update => "update",
            OperationKind::Replace => "replace",
            OperationKind::Upsert => "upsert",
            OperationKind::Delete => "delete",
            OperationKind::SoftDelete => "softDelete",
            OperationKind::Restore => "restore",
            OperationKind::Increment => "increment",
            OperationKind::Decrement => "decrement",
            OperationKind::CreateMany => "createMany",
            OperationKind::UpdateMany => "updateMany",
            OperationKind::DeleteMany => "deleteMany",
        }
    }

    /// The PascalCase prefix used in generated type names
    /// (`Create`, `SoftDelete`, `CreateMany`, ...)
    pub fn type_prefix(&self) -> &'static str {
        match self {
            OperationKind::Create => "Create",
            OperationKind::Read => "Read",
            OperationKind::Update => "Update",
            OperationKind::Replace => "Replace",
            OperationKind::Upsert => "Upsert",
            OperationKind::Delete => "Delete",
            OperationKind::SoftDelete => "SoftDelete",
            OperationKind::Restore => "Restore",
            OperationKind::Increment => "Increment",
            OperationKind::Decrement => "Decrement",
            OperationKind::CreateMany => "CreateMany",
            OperationKind::UpdateMany => "UpdateMany",
            OperationKind::DeleteMany => "DeleteMany",
        }
    }

    /// Whether this kind is a batch (many-item) operation
    pub fn is_batch(&self) -> bool {
        matches!(
            self,
            OperationKind::CreateMany | OperationKind::UpdateMany | OperationKind::DeleteMany
        )
    }

    /// The single-item kind a batch operation fans out to, if any
    pub fn batch_item_kind(&self) -> Option<OperationKind> {
        match self {
            OperationKind::CreateMany => Some(OperationKind::Create),
            OperationKind::UpdateMany => Some(OperationKind::Update),
            OperationKind::DeleteMany => Some(OperationKind::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ============================================================================
// Name Casing Helpers
// ============================================================================

/// Capitalize the first character of a name (`dimensions` -> `Dimensions`)
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Lowercase the first character of a name (`Product` -> `product`)
pub fn uncapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
