//! Boundary to the external metadata authority

use crate::error::FetchError;
use async_trait::async_trait;
use scenario_model::TrainingApplication;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Description of a condition implementation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConditionDescriptor {
    /// Implementation class name
    pub impl_name: String,
    /// Name shown to authors
    pub display_name: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
    /// Input types the condition accepts
    #[serde(default)]
    pub input_types: Vec<String>,
    /// Scoring rule types the condition supports
    #[serde(default)]
    pub scoring_types: Vec<String>,
}

/// Survey available to a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSurvey {
    /// Survey key
    pub key: String,
    /// Display name
    pub name: String,
}

/// Overall assessment types keyed by condition implementation name
pub type AssessmentTypeMap = HashMap<String, BTreeSet<String>>;

/// Adaptation type names keyed by training application
pub type AdaptationMap = HashMap<TrainingApplication, BTreeSet<String>>;

/// Read-only datasets served by an external authority
///
/// Implementations may be slow; [`MetadataCache`](crate::MetadataCache)
/// makes sure each key is requested at most once at a time.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Descriptor of one condition implementation
    async fn condition_descriptor(&self, impl_name: &str) -> Result<ConditionDescriptor, FetchError>;

    /// Overall assessment types for every condition
    async fn overall_assessment_types(&self) -> Result<AssessmentTypeMap, FetchError>;

    /// Supported adaptation types for every training application
    async fn scenario_adaptations(&self) -> Result<AdaptationMap, FetchError>;

    /// Condition implementations that signal completion themselves
    async fn self_completing_conditions(&self) -> Result<BTreeSet<String>, FetchError>;

    /// Surveys available in a survey context
    async fn course_surveys(&self, survey_context_id: &str) -> Result<Vec<CourseSurvey>, FetchError>;

    /// Condition implementations a training application supports
    async fn conditions_for_application(
        &self,
        application: TrainingApplication,
    ) -> Result<BTreeSet<String>, FetchError>;
}
