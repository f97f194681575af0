//! Two-sided pairing between conditions and learner actions
//!
//! Pace count needs a pace count condition plus both start and end pace
//! count actions. Avoid location with a learner-action requirement needs an
//! assess-my-location action. The forward check runs from the condition side
//! and the reverse check from the learner actions side.

use crate::error::{RuleResult, ValidationFailure};
use crate::validator::Validator;
use scenario_model::{ConditionInput, LearnerActionType};

impl Validator<'_> {
    fn any_input(&self, predicate: impl Fn(&ConditionInput) -> bool) -> bool {
        self.doc
            .all_conditions()
            .iter()
            .filter_map(|(_, condition)| condition.input.as_ref())
            .any(predicate)
    }

    /// Pace count pairing; with `verify` the condition side is looked up,
    /// without it a condition is assumed to exist
    pub(crate) fn check_pace_count_dependency(&self, verify: bool) -> RuleResult {
        let actions = &self.doc.learner_actions;
        let start = actions.has_type(LearnerActionType::StartPaceCount);
        let end = actions.has_type(LearnerActionType::EndPaceCount);
        let condition = !verify || self.any_input(ConditionInput::is_pace_count);

        let reason = if condition {
            match (start, end) {
                (true, true) => return Ok(()),
                (false, false) => "The Pace Count Condition is missing a Start Pace Count and an End Pace Count learner action.",
                (true, false) => "The Pace Count Condition is missing an End Pace Count learner action.",
                (false, true) => "The Pace Count Condition is missing a Start Pace Count learner action.",
            }
        } else {
            match (start, end) {
                (false, false) => return Ok(()),
                (true, false) => "The Scenario is missing an End Pace Count learner action and a Pace Count Condition.",
                (false, true) => "The Scenario is missing a Start Pace Count learner action and a Pace Count Condition.",
                (true, true) => "The Scenario is missing a Pace Count Condition.",
            }
        };
        Err(ValidationFailure::dependency(reason))
    }

    /// Avoid location pairing, same `verify` semantics as pace count
    pub(crate) fn check_avoid_location_dependency(&self, verify: bool) -> RuleResult {
        let action = self
            .doc
            .learner_actions
            .has_type(LearnerActionType::AssessMyLocation);
        let condition = !verify || self.any_input(ConditionInput::requires_assess_location);

        match (condition, action) {
            (true, false) => Err(ValidationFailure::dependency(
                "The Avoid Location Condition is missing an Assess My Location learner action",
            )),
            (false, true) => Err(ValidationFailure::dependency(
                "The Scenario is missing an Avoid Location Condition that requires the learner to determine when they have reached a location.",
            )),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::ValidityCache;
    use crate::error::FailureKind;
    use crate::validator::Validator;
    use pretty_assertions::assert_eq;
    use scenario_metadata::MetadataSnapshot;
    use scenario_model::input::PaceCountInput;
    use scenario_model::{
        Concept, Condition, ConditionInput, LearnerAction, LearnerActionType, NodeId,
        ScenarioDocument, Task,
    };

    fn pace_doc() -> ScenarioDocument {
        let mut doc = ScenarioDocument::new();
        doc.tasks.push(Task::new("Land Nav", NodeId(1)).with_concept(
            Concept::new("Pace", NodeId(2)).with_condition(Condition::new(
                "domain.PaceCount",
                ConditionInput::PaceCount(PaceCountInput {
                    team_member_ref: None,
                    expected_distance: 100.0,
                }),
            )),
        ));
        doc
    }

    fn pace(doc: &ScenarioDocument, verify: bool) -> Option<String> {
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        Validator::new(doc, &cache, &metadata)
            .check_pace_count_dependency(verify)
            .err()
            .map(|failure| {
                assert_eq!(failure.kind, FailureKind::DependencyPairing);
                failure.reason
            })
    }

    #[test]
    fn forward_pace_count() {
        let mut doc = pace_doc();
        assert_eq!(
            pace(&doc, true).as_deref(),
            Some("The Pace Count Condition is missing a Start Pace Count and an End Pace Count learner action.")
        );
        doc.learner_actions
            .push(LearnerAction::new(LearnerActionType::StartPaceCount, "Start"));
        assert_eq!(
            pace(&doc, true).as_deref(),
            Some("The Pace Count Condition is missing an End Pace Count learner action.")
        );
        doc.learner_actions
            .push(LearnerAction::new(LearnerActionType::EndPaceCount, "End"));
        assert_eq!(pace(&doc, true), None);
    }

    #[test]
    fn reverse_pace_count() {
        let mut doc = ScenarioDocument::new();
        assert_eq!(pace(&doc, true), None);
        doc.learner_actions
            .push(LearnerAction::new(LearnerActionType::EndPaceCount, "End"));
        assert_eq!(
            pace(&doc, true).as_deref(),
            Some("The Scenario is missing a Start Pace Count learner action and a Pace Count Condition.")
        );
        doc.learner_actions
            .push(LearnerAction::new(LearnerActionType::StartPaceCount, "Start"));
        assert_eq!(
            pace(&doc, true).as_deref(),
            Some("The Scenario is missing a Pace Count Condition.")
        );
        // the condition side itself never verifies
        assert_eq!(pace(&doc, false), None);
    }

    #[test]
    fn avoid_location_reverse() {
        let mut doc = ScenarioDocument::new();
        doc.learner_actions
            .push(LearnerAction::new(LearnerActionType::AssessMyLocation, "Where am I"));
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        let failure = Validator::new(&doc, &cache, &metadata)
            .check_avoid_location_dependency(true)
            .unwrap_err();
        assert_eq!(
            failure.reason,
            "The Scenario is missing an Avoid Location Condition that requires the learner to determine when they have reached a location."
        );
    }
}
