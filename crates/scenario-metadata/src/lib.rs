//! Scenario Metadata - cached lookups against an external authority
//!
//! Condition descriptors, assessment types, adaptation maps, self-completing
//! conditions and course surveys come from outside the document. This crate
//! provides:
//! - [`MetadataSource`]: the async boundary to that authority
//! - [`MetadataCache`]: single-flight, failure-transparent caching over it
//! - [`MetadataSnapshot`]: a synchronous view for validation

#![warn(unreachable_pub)]

pub mod cache;
pub mod error;
pub mod snapshot;
pub mod source;

pub use cache::{CacheStats, MetadataCache};
pub use error::{Dataset, FetchError, MetadataError, MetadataResult};
pub use snapshot::MetadataSnapshot;
#[cfg(any(test, feature = "mock"))]
pub use source::MockMetadataSource;
pub use source::{AdaptationMap, AssessmentTypeMap, ConditionDescriptor, CourseSurvey, MetadataSource};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for metadata lookups
    pub use crate::{
        ConditionDescriptor, FetchError, MetadataCache, MetadataError, MetadataSnapshot,
        MetadataSource,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
