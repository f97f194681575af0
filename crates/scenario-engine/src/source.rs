//! In-memory metadata source
//!
//! Serves datasets loaded from a JSON or YAML file, for offline checking
//! where no metadata authority is reachable. Missing datasets are empty,
//! which the validator treats as permissive.

use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use scenario_metadata::{
    AdaptationMap, AssessmentTypeMap, ConditionDescriptor, CourseSurvey, FetchError,
    MetadataSource,
};
use scenario_model::TrainingApplication;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// Fixed metadata datasets
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticMetadataSource {
    /// Condition descriptors by implementation name
    pub descriptors: HashMap<String, ConditionDescriptor>,
    /// Overall assessment types per condition
    pub assessment_types: AssessmentTypeMap,
    /// Adaptation types per training application
    pub adaptations: AdaptationMap,
    /// Conditions that complete on their own
    pub self_completing: BTreeSet<String>,
    /// Surveys by survey context id
    pub surveys: HashMap<String, Vec<CourseSurvey>>,
    /// Supported conditions per training application
    pub application_conditions: HashMap<TrainingApplication, BTreeSet<String>>,
}

impl StaticMetadataSource {
    /// Source with every dataset empty
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the self-completing condition set
    #[must_use]
    pub fn with_self_completing(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.self_completing = names.into_iter().map(Into::into).collect();
        self
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    ///
    /// # Errors
    /// Returns [`EngineError::Io`] if the file cannot be read, or the parse
    /// error for its format
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::io(path, source))?;
        if crate::is_yaml(path) {
            Ok(serde_yaml::from_str(&text)?)
        } else {
            Ok(serde_json::from_str(&text)?)
        }
    }
}

#[async_trait]
impl MetadataSource for StaticMetadataSource {
    async fn condition_descriptor(&self, impl_name: &str) -> Result<ConditionDescriptor, FetchError> {
        self.descriptors
            .get(impl_name)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(impl_name.to_string()))
    }

    async fn overall_assessment_types(&self) -> Result<AssessmentTypeMap, FetchError> {
        Ok(self.assessment_types.clone())
    }

    async fn scenario_adaptations(&self) -> Result<AdaptationMap, FetchError> {
        Ok(self.adaptations.clone())
    }

    async fn self_completing_conditions(&self) -> Result<BTreeSet<String>, FetchError> {
        Ok(self.self_completing.clone())
    }

    async fn course_surveys(&self, survey_context_id: &str) -> Result<Vec<CourseSurvey>, FetchError> {
        Ok(self
            .surveys
            .get(survey_context_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn conditions_for_application(
        &self,
        application: TrainingApplication,
    ) -> Result<BTreeSet<String>, FetchError> {
        Ok(self
            .application_conditions
            .get(&application)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn unknown_descriptor_is_not_found() {
        let source = StaticMetadataSource::new();
        assert_eq!(
            source.condition_descriptor("domain.Timer").await.unwrap_err(),
            FetchError::NotFound("domain.Timer".into())
        );
        assert!(source.self_completing_conditions().await.unwrap().is_empty());
    }

    #[test]
    fn parses_partial_json() {
        let source: StaticMetadataSource = serde_json::from_str(
            r#"{"self_completing": ["domain.Timer"], "application_conditions": {"vbs": ["domain.Timer"]}}"#,
        )
        .unwrap();
        assert!(source.self_completing.contains("domain.Timer"));
        assert!(source
            .application_conditions
            .contains_key(&TrainingApplication::Vbs));
        assert!(source.descriptors.is_empty());
    }
}
