//! Scenario Engine - per-session consistency engine for scenario documents
//!
//! Wires the document model, reference index, metadata cache and validator
//! into one [`EngineContext`] per editing session:
//! - Validation with a per-node validity cache and dirty propagation
//! - Rename and delete of places of interest and teams with reference rewrite
//! - Unique node ids and default names
//! - Cached, coalesced metadata lookups
//!
//! # Example
//!
//! ```rust
//! use scenario_engine::{EngineContext, StaticMetadataSource};
//! use scenario_model::{NodeKey, ScenarioDocument, Strategy};
//! use std::sync::Arc;
//!
//! let mut doc = ScenarioDocument::new();
//! doc.strategies.push(Strategy::new("Hint"));
//!
//! let ctx = EngineContext::new(doc, Arc::new(StaticMetadataSource::new()));
//! let outcome = ctx.validate(&NodeKey::Strategy("Hint".into()), true).unwrap();
//! assert!(outcome.is_none());
//! assert!(ctx.validate_document().is_valid());
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod context;
pub mod error;
pub mod report;
pub mod session;
pub mod source;

pub use config::EngineConfig;
pub use context::EngineContext;
pub use error::{EngineError, EngineResult};
pub use report::{ReportEntry, ValidationReport};
pub use session::SessionId;
pub use source::StaticMetadataSource;

use scenario_model::ScenarioDocument;
use std::path::Path;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for engine users
    pub use crate::{EngineConfig, EngineContext, EngineError, EngineResult, ValidationReport};
    pub use scenario_model::{NodeKey, ScenarioDocument};
    pub use scenario_refs::RefKind;
    pub use scenario_validate::{FailureKind, ValidationFailure, Validity};
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

/// Read a scenario document from a `.json`, `.yaml` or `.yml` file
///
/// # Errors
/// Returns [`EngineError::Io`] if the file cannot be read, or the parse
/// error for its format
pub fn load_document(path: impl AsRef<Path>) -> EngineResult<ScenarioDocument> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| EngineError::io(path, source))?;
    if is_yaml(path) {
        Ok(serde_yaml::from_str(&text)?)
    } else {
        Ok(serde_json::from_str(&text)?)
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
