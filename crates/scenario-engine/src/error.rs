//! Engine error taxonomy
//!
//! Validation failures are values and never appear here. [`EngineError`]
//! rolls up caller mistakes, metadata fetch failures and load errors.

use scenario_metadata::MetadataError;
use scenario_refs::RefKind;
use scenario_validate::ContractViolation;
use std::path::PathBuf;

/// Errors returned by [`EngineContext`](crate::EngineContext) operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The caller addressed a node that does not exist or passed a blank name
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),

    /// A metadata lookup failed
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// No place of interest or team carries the name
    #[error("no {} named '{name}'", kind.label())]
    UnknownEntity {
        /// Kind of entity looked up
        kind: RefKind,
        /// Name looked up
        name: String,
    },

    /// Renaming would give two entities of one kind the same name
    #[error("a {} named '{name}' already exists", kind.label())]
    NameTaken {
        /// Kind of entity renamed
        kind: RefKind,
        /// Name already in use
        name: String,
    },

    /// Configuration file could not be parsed
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// JSON document or metadata could not be parsed
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML document or metadata could not be parsed
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    /// Create an unknown entity error
    pub fn unknown_entity(kind: RefKind, name: impl Into<String>) -> Self {
        Self::UnknownEntity {
            kind,
            name: name.into(),
        }
    }

    /// Create a name taken error
    pub fn name_taken(kind: RefKind, name: impl Into<String>) -> Self {
        Self::NameTaken {
            kind,
            name: name.into(),
        }
    }

    /// Create an io error for `path`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
