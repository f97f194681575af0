//! State transition rules

use super::{ensure, is_blank, is_blank_opt};
use crate::error::{RuleResult, ValidationFailure};
use crate::validator::Validator;
use scenario_model::transition::concept_scoped_attribute;
use scenario_model::{NodeId, StateTransition, StateType};
use smallvec::SmallVec;

impl Validator<'_> {
    pub(crate) fn check_state_transition(&self, transition: &StateTransition) -> RuleResult {
        check_state_transition(transition)?;
        // unnamed transitions are allowed to repeat
        if let Some(name) = &transition.name {
            let named = self
                .doc
                .state_transitions
                .iter()
                .filter(|other| other.name.as_ref() == Some(name))
                .count();
            ensure(named <= 1, "State Transition name is used by more than one state transition")?;
        }
        Ok(())
    }
}

fn check_state_transition(transition: &StateTransition) -> RuleResult {
    if let Some(name) = &transition.name {
        ensure(
            !is_blank(name),
            "State Transition name must be at least 1 character",
        )?;
    }
    ensure(
        !transition.logical_expression.is_empty(),
        "Logical expression is null or it has no state type",
    )?;

    let mut attributes: SmallVec<[&str; 8]> = SmallVec::new();
    let mut nodes: SmallVec<[NodeId; 8]> = SmallVec::new();
    for state in &transition.logical_expression {
        match state {
            StateType::LearnerState {
                attribute,
                previous,
                current,
                concept,
            } => {
                if is_blank_opt(previous.as_deref()) && is_blank_opt(current.as_deref()) {
                    return Err(ValidationFailure::invalid(format!(
                        "Logical Expression '{attribute}' cannot have both previous and current values as null"
                    )));
                }
                if let Some(display) = concept_scoped_attribute(attribute) {
                    if is_blank_opt(concept.as_deref()) {
                        return Err(ValidationFailure::invalid(format!(
                            "The learner state '{display}' cannot have a null course concept"
                        )));
                    }
                }
                if attributes.contains(&attribute.as_str()) {
                    return Err(ValidationFailure::invalid(format!(
                        "Found duplicate learner state attribute of '{attribute}'"
                    )));
                }
                attributes.push(attribute);
            }
            StateType::PerformanceNode {
                name,
                node_id,
                previous,
                current,
            } => {
                if is_blank_opt(previous.as_deref()) && is_blank_opt(current.as_deref()) {
                    return Err(ValidationFailure::invalid(format!(
                        "Logical Expression '{name}' cannot have both previous and current values as null"
                    )));
                }
                if nodes.contains(node_id) {
                    return Err(ValidationFailure::invalid(format!(
                        "Found duplicate task/concept of '{name}'"
                    )));
                }
                nodes.push(*node_id);
            }
        }
    }

    ensure(
        !transition.strategy_choices.is_empty(),
        "Strategy choices is null or it has no strategies",
    )?;
    for choice in &transition.strategy_choices {
        if is_blank(choice) {
            return Err(ValidationFailure::invalid(format!(
                "Malformed strategy reference name: '{choice}'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn learner_state(attribute: &str, concept: Option<&str>) -> StateType {
        StateType::LearnerState {
            attribute: attribute.into(),
            previous: None,
            current: Some("High".into()),
            concept: concept.map(String::from),
        }
    }

    fn transition(states: Vec<StateType>) -> StateTransition {
        StateTransition {
            name: Some("Escalate".into()),
            logical_expression: states,
            strategy_choices: vec!["Hint".into()],
        }
    }

    #[test]
    fn named_transitions_are_unique() {
        use crate::cache::ValidityCache;
        use scenario_metadata::MetadataSnapshot;
        use scenario_model::ScenarioDocument;

        let mut doc = ScenarioDocument::new();
        let escalate = transition(vec![learner_state("Engagement", None)]);
        doc.state_transitions = vec![escalate.clone(), escalate];
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        let validator = Validator::new(&doc, &cache, &metadata);
        assert_eq!(
            validator
                .check_state_transition(&doc.state_transitions[0])
                .unwrap_err()
                .reason,
            "State Transition name is used by more than one state transition"
        );

        let mut unnamed = doc.clone();
        for transition in &mut unnamed.state_transitions {
            transition.name = None;
        }
        let validator = Validator::new(&unnamed, &cache, &metadata);
        assert!(validator
            .check_state_transition(&unnamed.state_transitions[0])
            .is_ok());
    }

    #[test]
    fn duplicate_attribute() {
        let t = transition(vec![
            learner_state("Engagement", None),
            learner_state("Engagement", None),
        ]);
        assert_eq!(
            check_state_transition(&t).unwrap_err().reason,
            "Found duplicate learner state attribute of 'Engagement'"
        );
    }

    #[test]
    fn concept_scoped_attribute_needs_concept() {
        let t = transition(vec![learner_state("PriorKnowledge", None)]);
        assert_eq!(
            check_state_transition(&t).unwrap_err().reason,
            "The learner state 'Prior Knowledge' cannot have a null course concept"
        );
        let ok = transition(vec![learner_state("PriorKnowledge", Some("Move"))]);
        assert!(check_state_transition(&ok).is_ok());
    }

    #[test]
    fn duplicate_performance_node() {
        let node = StateType::PerformanceNode {
            name: "Patrol".into(),
            node_id: NodeId(1),
            previous: Some("Unknown".into()),
            current: None,
        };
        let t = transition(vec![node.clone(), node]);
        assert_eq!(
            check_state_transition(&t).unwrap_err().reason,
            "Found duplicate task/concept of 'Patrol'"
        );
    }

    #[test]
    fn unnamed_transition_is_allowed_but_blank_name_is_not() {
        let mut t = transition(vec![learner_state("Engagement", None)]);
        t.name = None;
        assert!(check_state_transition(&t).is_ok());
        t.name = Some("  ".into());
        assert_eq!(
            check_state_transition(&t).unwrap_err().reason,
            "State Transition name must be at least 1 character"
        );
    }

    #[test]
    fn strategy_choices_required() {
        let mut t = transition(vec![learner_state("Engagement", None)]);
        t.strategy_choices = vec![" ".into()];
        assert_eq!(
            check_state_transition(&t).unwrap_err().reason,
            "Malformed strategy reference name: ' '"
        );
        t.strategy_choices.clear();
        assert_eq!(
            check_state_transition(&t).unwrap_err().reason,
            "Strategy choices is null or it has no strategies"
        );
    }
}
