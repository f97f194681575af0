//! Task, concept and condition rules

use super::{ensure, is_blank};
use crate::error::{RuleResult, ValidationFailure};
use crate::validator::Validator;
use scenario_model::{
    Concept, ConceptChildren, Condition, Evaluator, NodeId, NodeKey, RealTimeAssessmentRules,
    ScoringSpec, Task,
};

impl Validator<'_> {
    pub(crate) fn check_task(&self, task: &Task, validate_children: bool) -> RuleResult {
        ensure(!is_blank(&task.name), "Task is missing a name")?;
        ensure(task.node_id.is_valid(), "Task node id is null or less than 0")?;
        self.check_unique_node("Task", task.node_id, &task.name)?;
        ensure(!task.concepts.is_empty(), "Task must have at least 1 child")?;

        if validate_children {
            for concept in &task.concepts {
                self.cached(&NodeKey::Concept(concept.node_id))
                    .map_err(|failure| concept_context(failure, concept))?;
            }
        }

        if let Some(start_triggers) = &task.start_triggers {
            let mut scenario_started = false;
            for trigger in start_triggers {
                if trigger.trigger_type.is_scenario_started() {
                    ensure(!scenario_started, "More than one scenario started trigger type")?;
                    scenario_started = true;
                }
                self.check_trigger(trigger)?;
            }
        }

        ensure(!task.end_triggers.is_empty(), "Task must have at least 1 end trigger")?;
        for trigger in &task.end_triggers {
            self.check_trigger(trigger)?;
        }

        if let Some(survey) = &task.survey {
            ensure(
                !is_blank(&survey.gift_survey_key),
                "Task is missing the GIFT survey key",
            )?;
        }

        self.check_weights(
            task.concepts.iter().map(|concept| concept.weight),
            "The total weights for this task's children doesn't equal 1.0",
        )
    }

    pub(crate) fn check_concept(&self, concept: &Concept, validate_children: bool) -> RuleResult {
        ensure(!is_blank(&concept.name), "Concept is missing a name")?;
        ensure(concept.node_id.is_valid(), "Concept node id is null or less than 0")?;
        self.check_unique_node("Concept", concept.node_id, &concept.name)?;
        if let Some(priority) = concept.priority {
            ensure(priority >= 1, "Concept priority is less than 1")?;
        }

        match &concept.children {
            ConceptChildren::Concepts(children) => {
                ensure(!children.is_empty(), "Concept must have at least 1 concept child")?;
                self.check_weights(
                    children.iter().map(|child| child.weight),
                    "The total weights for this intermediate concept's children doesn't equal 1.0",
                )?;
                if validate_children {
                    for child in children {
                        self.cached(&NodeKey::Concept(child.node_id))
                            .map_err(|failure| concept_context(failure, child))?;
                    }
                }
            }
            ConceptChildren::Conditions(conditions) => {
                ensure(!conditions.is_empty(), "Concept must have at least 1 condition child")?;
                self.check_weights(
                    conditions.iter().map(|condition| condition.weight),
                    "The total weights for this concept's children doesn't equal 1.0",
                )?;
                if validate_children {
                    for (index, condition) in conditions.iter().enumerate() {
                        let key = NodeKey::Condition {
                            concept: concept.node_id,
                            index,
                        };
                        self.cached(&key).map_err(|failure| {
                            failure.with_context(format_args!(
                                "Condition {} returned invalid from the cache: ",
                                condition.condition_impl
                            ))
                        })?;
                    }
                }
            }
        }

        if let Some(survey) = &concept.survey {
            ensure(
                !is_blank(&survey.gift_survey_key),
                "Concept is missing the GIFT survey key",
            )?;
        }
        Ok(())
    }

    /// Node ids and names are unique across every task and concept
    fn check_unique_node(&self, label: &str, node_id: NodeId, name: &str) -> RuleResult {
        let nodes = self.doc.performance_nodes();
        if nodes.iter().filter(|node| node.node_id() == node_id).count() > 1 {
            return Err(ValidationFailure::invalid(format!(
                "{label} node id {node_id} is used by more than one task or concept"
            )));
        }
        if nodes.iter().filter(|node| node.name() == name).count() > 1 {
            return Err(ValidationFailure::invalid(format!(
                "{label} name '{name}' is used by more than one task or concept"
            )));
        }
        Ok(())
    }

    pub(crate) fn check_condition(
        &self,
        concept: NodeId,
        index: usize,
        condition: &Condition,
    ) -> RuleResult {
        ensure(
            !is_blank(&condition.condition_impl),
            "Condition does not have a condition impl",
        )?;

        if let Some(rules) = &condition.scoring {
            ensure(!rules.is_empty(), "Condition does not have any scoring rules")?;
            for rule in rules {
                check_scoring_spec(rule.label(), rule.spec())?;
            }
        }

        if let Some(default) = &condition.default_assessment {
            ensure(!is_blank(default), "Condition default is missing an assessment")?;
        }

        ensure(
            condition.input.is_some(),
            "Condition is missing an input or input type",
        )?;

        // input validity depends on document-wide state, never trust the cache
        self.forced(&NodeKey::ConditionInput { concept, index })
            .map_err(|failure| failure.with_context("Condition input type returned invalid from the cache: "))
    }
}

fn concept_context(failure: ValidationFailure, concept: &Concept) -> ValidationFailure {
    failure.with_context(format_args!(
        "Concept {} returned invalid from the cache: ",
        concept.name
    ))
}

/// Rules shared by count, completion-time and violation-time scoring
pub(crate) fn check_scoring_spec(label: &str, spec: &ScoringSpec) -> RuleResult {
    if is_blank(&spec.name) {
        return Err(ValidationFailure::invalid(format!(
            "Scoring rule '{label}' is missing a name"
        )));
    }
    if spec.units.is_none() {
        return Err(ValidationFailure::invalid(format!(
            "Scoring rule '{label}' is missing a unit"
        )));
    }
    if spec.evaluators.is_empty() {
        return Err(ValidationFailure::invalid(format!(
            "Scoring rule '{label}' must have at least 1 evaluator"
        )));
    }
    spec.evaluators.iter().try_for_each(check_evaluator)
}

fn check_evaluator(evaluator: &Evaluator) -> RuleResult {
    ensure(
        !(is_blank(&evaluator.assessment)
            || is_blank(&evaluator.operator)
            || is_blank(&evaluator.value)),
        "Evaluator is missing an assessment, operator, or value",
    )
}

/// Real-time rules need at least one of count / violation time
pub(crate) fn check_real_time_rules(rules: Option<&RealTimeAssessmentRules>) -> RuleResult {
    let Some(rules) = rules else {
        return Ok(());
    };
    ensure(
        rules.count.is_some() || rules.violation_time.is_some(),
        "The real time assessment rules is empty",
    )?;
    if let Some(count) = &rules.count {
        check_scoring_spec("count", count)?;
    }
    if let Some(violation_time) = &rules.violation_time {
        check_scoring_spec("violationTime", violation_time)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ValidityCache;
    use crate::error::FailureKind;
    use pretty_assertions::assert_eq;
    use scenario_metadata::MetadataSnapshot;
    use scenario_model::{ConditionInput, ScenarioDocument, ScoringRule, Trigger, TriggerType};

    fn leaf(name: &str, id: i64) -> Concept {
        Concept::new(name, NodeId(id)).with_condition(Condition::new(
            "domain.Timer",
            ConditionInput::NoConditionInput,
        ))
    }

    fn task_with(concepts: Vec<Concept>) -> Task {
        let mut task = Task::new("Patrol", NodeId(1)).with_end_trigger(Trigger::new(
            TriggerType::TaskEnded {
                node_id: Some(NodeId(1)),
            },
        ));
        task.concepts = concepts;
        task
    }

    fn validate(doc: &ScenarioDocument, key: &NodeKey) -> Option<ValidationFailure> {
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        Validator::new(doc, &cache, &metadata)
            .validate(key, true)
            .unwrap()
    }

    #[test]
    fn weights_within_tolerance_pass() {
        let mut doc = ScenarioDocument::new();
        doc.tasks.push(task_with(vec![
            leaf("A", 2).with_weight(0.33),
            leaf("B", 3).with_weight(0.33),
            leaf("C", 4).with_weight(0.34),
        ]));
        assert_eq!(validate(&doc, &NodeKey::Task(NodeId(1))), None);
    }

    #[test]
    fn weights_outside_tolerance_fail() {
        let mut doc = ScenarioDocument::new();
        doc.tasks.push(task_with(vec![
            leaf("A", 2).with_weight(0.3),
            leaf("B", 3).with_weight(0.3),
            leaf("C", 4).with_weight(0.3),
        ]));
        let failure = validate(&doc, &NodeKey::Task(NodeId(1))).unwrap();
        assert_eq!(failure.kind, FailureKind::Invalid);
        assert_eq!(
            failure.reason,
            "The total weights for this task's children doesn't equal 1.0"
        );
    }

    #[test]
    fn weights_are_opt_in() {
        let mut doc = ScenarioDocument::new();
        doc.tasks.push(task_with(vec![leaf("A", 2), leaf("B", 3)]));
        assert_eq!(validate(&doc, &NodeKey::Task(NodeId(1))), None);
    }

    #[test]
    fn condition_weights_use_concept_message() {
        let mut doc = ScenarioDocument::new();
        let concept = Concept::new("Leaf", NodeId(2))
            .with_condition(Condition::new("domain.A", ConditionInput::NoConditionInput).with_weight(0.5))
            .with_condition(Condition::new("domain.B", ConditionInput::NoConditionInput));
        doc.tasks.push(task_with(vec![concept]));
        let failure = validate(&doc, &NodeKey::Concept(NodeId(2))).unwrap();
        assert_eq!(
            failure.reason,
            "The total weights for this concept's children doesn't equal 1.0"
        );
    }

    #[test]
    fn invalid_child_names_the_child() {
        let mut doc = ScenarioDocument::new();
        let mut broken = leaf("Broken", 3);
        broken.priority = Some(0);
        doc.tasks.push(task_with(vec![leaf("Fine", 2), broken]));

        let failure = validate(&doc, &NodeKey::Task(NodeId(1))).unwrap();
        assert_eq!(
            failure.reason,
            "Concept Broken returned invalid from the cache: Concept priority is less than 1"
        );
    }

    #[test]
    fn repeated_concept_id_cannot_hide_a_child() {
        let mut doc = ScenarioDocument::new();
        let mut shadowed = leaf("Shadowed", 2);
        shadowed.priority = Some(0);
        doc.tasks.push(task_with(vec![leaf("Fine", 2), shadowed]));

        let failure = validate(&doc, &NodeKey::Task(NodeId(1))).unwrap();
        assert_eq!(failure.kind, FailureKind::Invalid);
        assert_eq!(
            failure.reason,
            "Concept Fine returned invalid from the cache: \
             Concept node id 2 is used by more than one task or concept"
        );
    }

    #[test]
    fn names_are_unique_across_tasks_and_concepts() {
        let mut doc = ScenarioDocument::new();
        doc.tasks.push(task_with(vec![leaf("Patrol", 2)]));
        assert_eq!(
            validate(&doc, &NodeKey::Task(NodeId(1))).unwrap().reason,
            "Task name 'Patrol' is used by more than one task or concept"
        );

        doc.tasks[0].concepts[0].name = "Sweep".into();
        assert_eq!(validate(&doc, &NodeKey::Task(NodeId(1))), None);
    }

    #[test]
    fn own_fields_only_without_children() {
        let mut doc = ScenarioDocument::new();
        let mut broken = leaf("Broken", 2);
        broken.priority = Some(0);
        doc.tasks.push(task_with(vec![broken]));

        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        let validator = Validator::new(&doc, &cache, &metadata);
        assert_eq!(validator.validate(&NodeKey::Task(NodeId(1)), false).unwrap(), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn scoring_rules_checked_in_order() {
        let condition = Condition {
            condition_impl: "domain.Timer".into(),
            scoring: Some(vec![ScoringRule::Count(ScoringSpec {
                name: "Violations".into(),
                units: None,
                evaluators: vec![],
            })]),
            input: Some(ConditionInput::NoConditionInput),
            ..Condition::default()
        };
        let mut doc = ScenarioDocument::new();
        doc.tasks.push(task_with(vec![
            Concept::new("Leaf", NodeId(2)).with_condition(condition),
        ]));
        let failure = validate(
            &doc,
            &NodeKey::Condition {
                concept: NodeId(2),
                index: 0,
            },
        )
        .unwrap();
        assert_eq!(failure.reason, "Scoring rule 'count' is missing a unit");
    }

    #[test]
    fn missing_end_trigger() {
        let mut doc = ScenarioDocument::new();
        let mut task = task_with(vec![leaf("A", 2)]);
        task.end_triggers.clear();
        doc.tasks.push(task);
        assert_eq!(
            validate(&doc, &NodeKey::Task(NodeId(1))).unwrap().reason,
            "Task must have at least 1 end trigger"
        );
    }

    #[test]
    fn empty_real_time_rules() {
        let rules = RealTimeAssessmentRules::default();
        assert_eq!(
            check_real_time_rules(Some(&rules)).unwrap_err().reason,
            "The real time assessment rules is empty"
        );
        assert!(check_real_time_rules(None).is_ok());
    }
}
