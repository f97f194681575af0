//! Error types for metadata lookups

use std::fmt;
use std::sync::Arc;

/// Failure reported by a [`MetadataSource`](crate::MetadataSource)
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The external authority could not be reached
    #[error("metadata service unavailable: {0}")]
    Unavailable(String),

    /// The authority has no entry for the requested key
    #[error("no metadata found for '{0}'")]
    NotFound(String),

    /// The response could not be interpreted
    #[error("malformed metadata response: {0}")]
    Malformed(String),
}

/// Dataset a lookup was made against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    /// Condition descriptor by implementation name
    ConditionDescriptor,
    /// Overall assessment types per condition
    OverallAssessmentTypes,
    /// Scenario adaptations per training application
    ScenarioAdaptations,
    /// Conditions that can complete on their own
    SelfCompletingConditions,
    /// Course surveys by survey context
    CourseSurveys,
    /// Conditions supported by a training application
    ApplicationConditions,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ConditionDescriptor => "condition descriptor",
            Self::OverallAssessmentTypes => "overall assessment types",
            Self::ScenarioAdaptations => "scenario adaptations",
            Self::SelfCompletingConditions => "self-completing conditions",
            Self::CourseSurveys => "course surveys",
            Self::ApplicationConditions => "training application conditions",
        };
        f.write_str(name)
    }
}

/// Error returned by [`MetadataCache`](crate::MetadataCache) lookups
///
/// Every caller that joined a failed fetch receives the same `Arc`'d source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetadataError {
    /// The underlying fetch failed
    #[error("failed to fetch {dataset}: {source}")]
    Fetch {
        /// Dataset being fetched
        dataset: Dataset,
        /// Shared failure
        #[source]
        source: Arc<FetchError>,
    },
}

impl MetadataError {
    /// Wrap a shared fetch failure
    #[must_use]
    pub fn fetch(dataset: Dataset, source: Arc<FetchError>) -> Self {
        Self::Fetch { dataset, source }
    }

    /// Dataset the failure belongs to
    #[must_use]
    pub fn dataset(&self) -> Dataset {
        match self {
            Self::Fetch { dataset, .. } => *dataset,
        }
    }

    /// The shared fetch failure
    #[must_use]
    pub fn source_error(&self) -> &Arc<FetchError> {
        match self {
            Self::Fetch { source, .. } => source,
        }
    }
}

/// Result type for metadata lookups
pub type MetadataResult<T> = Result<T, MetadataError>;
