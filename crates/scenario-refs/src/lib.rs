//! Scenario Refs - named-reference tracking
//!
//! Places of interest and teams/team members are referenced by name from
//! condition inputs, strategies and task triggers. This crate provides:
//! - [`walk_node_references`]: the single enumeration of reference fields
//! - [`ReferenceIndex`]: name to referrer lookup, rebuild and rename propagation
//!
//! # Example
//!
//! ```rust
//! use scenario_model::ScenarioDocument;
//! use scenario_refs::{RefKind, ReferenceIndex};
//!
//! let mut doc = ScenarioDocument::new();
//! let index = ReferenceIndex::new();
//! assert!(index.lookup_referencers(RefKind::Team, "Alpha").is_none());
//!
//! index.rebuild_all(&mut doc);
//! assert_eq!(index.lookup_referencers(RefKind::Team, "Alpha"), Some(vec![]));
//! ```

#![warn(unreachable_pub)]

pub mod index;
pub mod walk;

pub use index::{ReferenceIndex, ReferenceRecord};
pub use walk::{referrer_keys, walk_node_references, RefKind, RefSlot, ReferenceVisitor};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for reference tracking
    pub use crate::{RefKind, ReferenceIndex, ReferenceRecord};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
