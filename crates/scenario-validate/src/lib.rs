//! Scenario Validate - incremental validity of scenario documents
//!
//! Every addressable node of a scenario document is `Unknown`, `Valid` or
//! `Invalid`. This crate provides:
//! - [`Validator`]: the rule catalogue, applied to one node at a time
//! - [`ValidityCache`]: the per-node state parents consult instead of
//!   re-deriving their children
//! - [`ValidationFailure`]: the first failing rule with its [`FailureKind`]
//!
//! # Example
//!
//! ```rust
//! use scenario_metadata::MetadataSnapshot;
//! use scenario_model::{NodeKey, ScenarioDocument, Strategy};
//! use scenario_validate::{Validator, ValidityCache, Validity};
//!
//! let mut doc = ScenarioDocument::new();
//! doc.strategies.push(Strategy::new("Hint"));
//!
//! let cache = ValidityCache::new();
//! let metadata = MetadataSnapshot::new();
//! let validator = Validator::new(&doc, &cache, &metadata);
//!
//! let key = NodeKey::Strategy("Hint".into());
//! assert_eq!(validator.validate(&key, true).unwrap(), None);
//! assert_eq!(cache.get(&key), Validity::Valid);
//! ```

#![warn(unreachable_pub)]

pub mod cache;
pub mod error;
mod rules;
pub mod validator;

pub use cache::{Validity, ValidityCache, ValidityStats};
pub use error::{ContractViolation, FailureKind, RuleResult, ValidationFailure};
pub use validator::{document_keys, ValidationOutcome, Validator, DEFAULT_WEIGHT_TOLERANCE};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for validation
    pub use crate::{
        ContractViolation, FailureKind, ValidationFailure, Validator, Validity, ValidityCache,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
