//! Configuration for inference, generation, and execution
//!
//! All knobs are plain serde values loadable from YAML or JSON. Generators
//! and executors receive these as explicit arguments so they stay pure and
//! testable in isolation.

use crate::error::{Error, Result};
use crate::types::OperationKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

// ============================================================================
// Operation Config
// ============================================================================

/// Which operations are enabled for a type.
///
/// Expressed as either an inclusion set or an exclusion set over the
/// [`OperationKind`] keys. A key not mentioned is enabled by default unless
/// an inclusion set is present, in which case only listed keys are enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OperationConfigRepr", into = "OperationConfigRepr")]
pub enum OperationConfig {
    /// Only the listed operations are enabled
    Include(BTreeSet<OperationKind>),

    /// All operations except the listed ones are enabled
    Exclude(BTreeSet<OperationKind>),
}

/// Serde wire form for [`OperationConfig`]: a single-key map
/// `{ include: [...] } | { exclude: [...] }` (spec §92).
///
/// Represented as a struct rather than an externally-tagged enum so the
/// single-key-map form parses under both `serde_json` and `serde_yaml`
/// (the latter encodes externally-tagged enums as `!tag` values, not maps).
#[derive(Serialize, Deserialize)]
struct OperationConfigRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    include: Option<BTreeSet<OperationKind>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exclude: Option<BTreeSet<OperationKind>>,
}

impl std::convert::TryFrom<OperationConfigRepr> for OperationConfig {
    type Error = String;

    fn try_from(repr: OperationConfigRepr) -> std::result::Result<Self, Self::Error> {
        match (repr.include, repr.exclude) {
            (Some(_), Some(_)) => {
                Err("`include` and `exclude` are mutually exclusive".to_string())
            }
            (Some(include), None) => Ok(Self::Include(include)),
            (None, Some(exclude)) => Ok(Self::Exclude(exclude)),
            (None, None) => Err("expected either `include` or `exclude`".to_string()),
        }
    }
}

impl From<OperationConfig> for OperationConfigRepr {
    fn from(config: OperationConfig) -> Self {
        match config {
            OperationConfig::Include(include) => Self {
                include: Some(include),
                exclude: None,
            },
            OperationConfig::Exclude(exclude) => Self {
                include: None,
                exclude: Some(exclude),
            },
        }
    }
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self::Exclude(BTreeSet::new())
    }
}

impl OperationConfig {
    /// Enable everything
    pub fn all() -> Self {
        Self::default()
    }

    /// Enable only the given operations
    pub fn include(ops: impl IntoIterator<Item = OperationKind>) -> Self {
        Self::Include(ops.into_iter().collect())
    }

    /// Enable everything except the given operations
    pub fn exclude(ops: impl IntoIterator<Item = OperationKind>) -> Self {
        Self::Exclude(ops.into_iter().collect())
    }

    /// Check whether an operation is enabled
    pub fn is_enabled(&self, op: OperationKind) -> bool {
        match self {
            Self::Include(set) => set.contains(&op),
            Self::Exclude(set) => !set.contains(&op),
        }
    }

    /// All enabled operations, in declaration order
    pub fn enabled(&self) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|op| self.is_enabled(*op))
            .collect()
    }
}

// ============================================================================
// System Fields
// ============================================================================

/// Names of the store-managed fields on every document.
///
/// These are excluded from generated input types and maintained by the
/// mutation executor. Passed by value into each generation call rather than
/// living as module constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemFields {
    /// Document identifier field
    pub id: String,
    /// Partition key field
    pub partition_key: String,
    /// Concurrency token field
    pub etag: String,
    /// Creation timestamp field
    pub created_at: String,
    /// Last-modification timestamp field
    pub updated_at: String,
    /// Soft-delete marker field
    pub deleted: String,
    /// Soft-delete timestamp field
    pub deleted_at: String,
    /// Soft-delete reason field
    pub delete_reason: String,
    /// Soft-delete actor field
    pub deleted_by: String,
    /// Restoration timestamp field
    pub restored_at: String,
    /// Store-internal resource identifiers, excluded from inputs as-is
    pub internal: Vec<String>,
}

impl Default for SystemFields {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            partition_key: "pk".to_string(),
            etag: "_etag".to_string(),
            created_at: "_createdAt".to_string(),
            updated_at: "_updatedAt".to_string(),
            deleted: "_deleted".to_string(),
            deleted_at: "_deletedAt".to_string(),
            delete_reason: "_deleteReason".to_string(),
            deleted_by: "_deletedBy".to_string(),
            restored_at: "_restoredAt".to_string(),
            internal: vec![
                "_rid".to_string(),
                "_self".to_string(),
                "_ts".to_string(),
                "_attachments".to_string(),
            ],
        }
    }
}

impl SystemFields {
    /// Set the partition key field name
    #[must_use]
    pub fn with_partition_key(mut self, field: impl Into<String>) -> Self {
        self.partition_key = field.into();
        self
    }

    /// Every field name excluded from generated input types.
    ///
    /// The partition key is deliberately absent: callers must be able to
    /// supply it when creating documents.
    pub fn input_exclusions(&self) -> Vec<String> {
        let mut fields = vec![
            self.id.clone(),
            self.etag.clone(),
            self.created_at.clone(),
            self.updated_at.clone(),
            self.deleted.clone(),
            self.deleted_at.clone(),
            self.delete_reason.clone(),
            self.deleted_by.clone(),
            self.restored_at.clone(),
        ];
        fields.extend(self.internal.iter().cloned());
        fields
    }

    /// Every field name the executor manages, including the id
    pub fn managed(&self) -> Vec<String> {
        let mut fields = self.input_exclusions();
        fields.push(self.partition_key.clone());
        fields
    }
}

// ============================================================================
// Sampling Config
// ============================================================================

/// Default number of documents sampled per container
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// How containers are sampled during schema inference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Maximum documents sampled per container; smaller containers sample
    /// their full contents
    pub sample_size: usize,

    /// Partition key field to mine for structural patterns
    /// (a leading `/` is tolerated, Cosmos-style)
    pub partition_key_path: Option<String>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            partition_key_path: None,
        }
    }
}

impl SamplingConfig {
    /// Set the sample size
    #[must_use]
    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size;
        self
    }

    /// Set the partition key path
    #[must_use]
    pub fn with_partition_key_path(mut self, path: impl Into<String>) -> Self {
        self.partition_key_path = Some(path.into());
        self
    }

    /// The partition key field name with any leading `/` stripped
    pub fn partition_key_field(&self) -> Option<&str> {
        self.partition_key_path
            .as_deref()
            .map(|p| p.trim_start_matches('/'))
    }
}

// ============================================================================
// Generator Config
// ============================================================================

/// Configuration consumed by the SDL and input/payload generators
/// and the resolver builder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Which operations are enabled
    pub operations: OperationConfig,

    /// Store-managed field names
    pub system_fields: SystemFields,

    /// Extra fields to exclude from all generated input types
    pub exclude_fields: Vec<String>,
}

impl GeneratorConfig {
    /// Create a config with the given operation enablement
    pub fn with_operations(operations: OperationConfig) -> Self {
        Self {
            operations,
            ..Self::default()
        }
    }
}

// ============================================================================
// Top-level Config
// ============================================================================

/// Full toolkit configuration, loadable from a YAML file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sampling behavior
    pub sampling: SamplingConfig,

    /// Generation and execution behavior
    pub generator: GeneratorConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| Error::FileNotFound {
            path: path.display().to_string(),
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}
