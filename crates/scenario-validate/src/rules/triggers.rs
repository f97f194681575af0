//! Task and scenario end trigger rules

use super::{ensure, is_blank};
use crate::error::{RuleResult, ValidationFailure};
use crate::rules::places::{check_coordinate, check_start_location, ANY_COORDINATE};
use crate::validator::Validator;
use scenario_model::{EntityIdentity, LearnerId, NodeId, Trigger, TriggerType};

const NEVER_ENDS: &str =
    "A task trigger will never activate because a concept contains a condition that will never end.";

impl Validator<'_> {
    pub(crate) fn check_scenario_end_triggers(&self) -> RuleResult {
        self.doc
            .end_triggers
            .iter()
            .try_for_each(|trigger| self.check_trigger(trigger))
    }

    pub(crate) fn check_trigger(&self, trigger: &Trigger) -> RuleResult {
        if let Some(message) = &trigger.message {
            self.check_strategy(message)?;
        }
        if let Some(delay) = trigger.delay {
            ensure(delay >= 0.0, "Trigger delay is less than 0")?;
        }
        self.check_trigger_type(&trigger.trigger_type)
    }

    fn check_trigger_type(&self, trigger_type: &TriggerType) -> RuleResult {
        match trigger_type {
            TriggerType::EntityLocation { entity, location } => {
                match entity {
                    EntityIdentity::Learner(LearnerId::StartLocation(start)) => {
                        check_start_location(start)?;
                    }
                    EntityIdentity::Learner(LearnerId::EntityMarking(marking)) => {
                        ensure(!is_blank(marking), "Entity Marking is not provided")?;
                    }
                    EntityIdentity::TeamMember(member) => {
                        ensure(!is_blank(member), "Entity Marking is not provided")?;
                        self.check_target_member(member)?;
                    }
                }
                let location = location
                    .as_ref()
                    .ok_or_else(|| ValidationFailure::invalid("Trigger location is null"))?;
                if let Some(coordinate) = &location.coordinate {
                    check_coordinate(coordinate)
                } else if let Some(point_ref) = &location.point_ref {
                    self.check_point_ref(point_ref, Some(ANY_COORDINATE))
                } else {
                    Err(ValidationFailure::invalid("Missing trigger location value"))
                }
            }
            TriggerType::LearnerLocation { coordinate } => {
                ensure(
                    !self.doc.learner_start_location_needed(),
                    "Learner start location is null",
                )?;
                let coordinate = coordinate
                    .as_ref()
                    .ok_or_else(|| ValidationFailure::invalid("Missing learner location coordinate"))?;
                check_coordinate(coordinate)
            }
            TriggerType::ConceptEnded { node_id } => {
                self.check_concept_completes(*node_id, "Concept node id is null or less than 0")
            }
            TriggerType::ChildConceptEnded { node_id } => self.check_concept_completes(
                *node_id,
                "Child concept node id is null or less than 0",
            ),
            TriggerType::TaskEnded { node_id } => ensure(
                node_id.is_some_and(NodeId::is_valid),
                "Task node id is null or less than 0",
            ),
            TriggerType::ConceptAssessment { concept, result } => {
                ensure(
                    concept.is_some_and(|id| id.get() >= 1),
                    "Assessment concept is null or less than 1",
                )?;
                ensure(!is_blank(result), "Assessment is missing result")
            }
            TriggerType::LearnerActionReference { name } => {
                ensure(!is_blank(name), "Learner action reference is missing a name")?;
                if self.doc.learner_action(name).is_none() {
                    return Err(ValidationFailure::reference(
                        "The learner action reference name doesn't refer to an existing learner action",
                    ));
                }
                Ok(())
            }
            TriggerType::ScenarioStarted => Ok(()),
            TriggerType::StrategyApplied { strategy_name } => {
                if self.doc.strategy(strategy_name).is_none() {
                    return Err(ValidationFailure::reference(format!(
                        "The strategy '{strategy_name}' is not a strategy that exists."
                    )));
                }
                Ok(())
            }
        }
    }

    /// The ended concept must exist in a shape that can actually finish
    fn check_concept_completes(&self, node_id: Option<NodeId>, reason: &str) -> RuleResult {
        let node_id = match node_id {
            Some(id) if id.is_valid() => id,
            _ => return Err(ValidationFailure::invalid(reason)),
        };
        if let Some(concept) = self.doc.find_concept(node_id) {
            ensure(self.metadata.concept_can_complete(concept), NEVER_ENDS)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::ValidityCache;
    use crate::error::FailureKind;
    use crate::validator::Validator;
    use pretty_assertions::assert_eq;
    use scenario_metadata::MetadataSnapshot;
    use scenario_model::{
        Concept, Condition, ConditionInput, Coordinate, EntityIdentity, NodeId, PlaceOfInterest,
        PointRef, ScenarioDocument, Task, Trigger, TriggerLocation, TriggerType,
    };
    use std::collections::BTreeSet;
    use std::sync::Arc;

    fn doc() -> ScenarioDocument {
        let mut doc = ScenarioDocument::new();
        doc.tasks.push(
            Task::new("Patrol", NodeId(1)).with_concept(
                Concept::new("Hold", NodeId(2))
                    .with_condition(Condition::new("domain.Timer", ConditionInput::NoConditionInput)),
            ),
        );
        doc.places_of_interest.push(PlaceOfInterest::Point {
            name: "Bridge".into(),
            coordinate: None,
        });
        doc
    }

    fn check(doc: &ScenarioDocument, metadata: &MetadataSnapshot, trigger_type: TriggerType) -> Option<String> {
        let cache = ValidityCache::new();
        Validator::new(doc, &cache, metadata)
            .check_trigger(&Trigger::new(trigger_type))
            .err()
            .map(|failure| failure.reason)
    }

    #[test]
    fn concept_that_never_ends() {
        let doc = doc();
        let blocking = MetadataSnapshot::new()
            .with_self_completing(Arc::new(BTreeSet::from(["domain.Checkpoint".to_string()])));
        assert_eq!(
            check(&doc, &blocking, TriggerType::ConceptEnded { node_id: Some(NodeId(2)) }).as_deref(),
            Some(
                "A task trigger will never activate because a concept contains a condition that will never end."
            )
        );

        let completing = MetadataSnapshot::new()
            .with_self_completing(Arc::new(BTreeSet::from(["domain.Timer".to_string()])));
        assert_eq!(
            check(&doc, &completing, TriggerType::ConceptEnded { node_id: Some(NodeId(2)) }),
            None
        );
        assert_eq!(
            check(&doc, &completing, TriggerType::ChildConceptEnded { node_id: None }).as_deref(),
            Some("Child concept node id is null or less than 0")
        );
    }

    #[test]
    fn entity_location_point_must_have_coordinates() {
        let doc = doc();
        let metadata = MetadataSnapshot::new();
        let trigger_type = TriggerType::EntityLocation {
            entity: EntityIdentity::Learner(scenario_model::LearnerId::EntityMarking("a-1".into())),
            location: Some(TriggerLocation {
                coordinate: None,
                point_ref: Some(PointRef::new("Bridge")),
            }),
        };
        assert_eq!(
            check(&doc, &metadata, trigger_type).as_deref(),
            Some("The point 'Bridge' has no coordinates defined")
        );
    }

    #[test]
    fn entity_location_member_must_exist() {
        let doc = doc();
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        let trigger = Trigger::new(TriggerType::EntityLocation {
            entity: EntityIdentity::TeamMember("Ghost".into()),
            location: Some(TriggerLocation {
                coordinate: Some(Coordinate::gcc(0.0, 0.0, 0.0)),
                point_ref: None,
            }),
        });
        let failure = Validator::new(&doc, &cache, &metadata)
            .check_trigger(&trigger)
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::ReferenceIntegrity);
        assert_eq!(
            failure.reason,
            "The member Ghost does not exist in the team organization."
        );
    }

    #[test]
    fn missing_strategy_and_negative_delay() {
        let doc = doc();
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        let validator = Validator::new(&doc, &cache, &metadata);

        let mut trigger = Trigger::new(TriggerType::ScenarioStarted);
        trigger.delay = Some(-1.0);
        assert_eq!(
            validator.check_trigger(&trigger).unwrap_err().reason,
            "Trigger delay is less than 0"
        );

        let applied = Trigger::new(TriggerType::StrategyApplied {
            strategy_name: "Hint".into(),
        });
        assert_eq!(
            validator.check_trigger(&applied).unwrap_err().reason,
            "The strategy 'Hint' is not a strategy that exists."
        );
    }
}
