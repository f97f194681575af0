//! Learner actions available during the scenario

use crate::strategy::AutoTutorSko;
use serde::{Deserialize, Serialize};

/// Kind of learner action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnerActionType {
    /// Start counting paces
    StartPaceCount,
    /// Stop counting paces
    EndPaceCount,
    /// Report having reached a location
    AssessMyLocation,
    /// Ask the tutor for help
    TutorMe,
    /// Apply a strategy on demand
    ApplyStrategy,
    /// Report an explosive hazard
    ExplosiveHazardSpotReport,
    /// Nine-line report
    NineLineReport,
    /// Spot report
    SpotReport,
    /// Use the radio
    Radio,
}

/// Conversation configuration of a TutorMe action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TutorMeConfiguration {
    /// Conversation tree file
    TreeFile {
        /// File name
        name: String,
    },
    /// AutoTutor script
    AutoTutor(AutoTutorSko),
}

/// Action parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnerActionParams {
    /// TutorMe settings
    TutorMe {
        /// Configuration, required
        configuration: Option<TutorMeConfiguration>,
    },
    /// Strategy to apply by name
    StrategyReference(String),
}

/// An action the learner can take
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerAction {
    /// Kind
    pub action_type: Option<LearnerActionType>,
    /// Display name, referenced by triggers
    pub display_name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Optional parameters
    #[serde(default)]
    pub params: Option<LearnerActionParams>,
}

impl LearnerAction {
    /// Action with a type and display name
    #[must_use]
    pub fn new(action_type: LearnerActionType, display_name: impl Into<String>) -> Self {
        Self {
            action_type: Some(action_type),
            display_name: display_name.into(),
            description: None,
            params: None,
        }
    }
}

/// Learner action files and the inline action list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvailableLearnerActions {
    /// Action definition files
    #[serde(default)]
    pub files: Vec<String>,
    /// Inline actions
    #[serde(default)]
    pub actions: Option<Vec<LearnerAction>>,
}

impl AvailableLearnerActions {
    /// Inline actions, empty when absent
    #[inline]
    #[must_use]
    pub fn list(&self) -> &[LearnerAction] {
        self.actions.as_deref().unwrap_or_default()
    }

    /// Whether any action has the given type
    #[must_use]
    pub fn has_type(&self, action_type: LearnerActionType) -> bool {
        self.list()
            .iter()
            .any(|action| action.action_type == Some(action_type))
    }

    /// Append an action
    pub fn push(&mut self, action: LearnerAction) {
        self.actions.get_or_insert_with(Vec::new).push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_lookup() {
        let mut actions = AvailableLearnerActions::default();
        assert!(!actions.has_type(LearnerActionType::StartPaceCount));
        actions.push(LearnerAction::new(LearnerActionType::StartPaceCount, "Start Pace Count"));
        assert!(actions.has_type(LearnerActionType::StartPaceCount));
        assert!(!actions.has_type(LearnerActionType::EndPaceCount));
        assert_eq!(actions.list().len(), 1);
    }
}
