//! Performance tree: tasks, concepts and conditions

use crate::ids::NodeId;
use crate::input::ConditionInput;
use crate::trigger::Trigger;
use serde::{Deserialize, Serialize};

/// Survey attached to a task or concept
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurveyAssessment {
    /// Survey key in the survey system
    pub gift_survey_key: String,
}

/// Top-level performance node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Name, unique among tasks and concepts
    pub name: String,
    /// Id, unique across the forest
    pub node_id: NodeId,
    /// Child concepts
    #[serde(default)]
    pub concepts: Vec<Concept>,
    /// Optional start triggers
    #[serde(default)]
    pub start_triggers: Option<Vec<Trigger>>,
    /// End triggers
    #[serde(default)]
    pub end_triggers: Vec<Trigger>,
    /// Optional survey
    #[serde(default)]
    pub survey: Option<SurveyAssessment>,
}

impl Task {
    /// Task without children or triggers
    #[must_use]
    pub fn new(name: impl Into<String>, node_id: NodeId) -> Self {
        Self {
            name: name.into(),
            node_id,
            concepts: Vec::new(),
            start_triggers: None,
            end_triggers: Vec::new(),
            survey: None,
        }
    }

    /// Builder: append a concept
    #[must_use]
    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    /// Builder: append an end trigger
    #[must_use]
    pub fn with_end_trigger(mut self, trigger: Trigger) -> Self {
        self.end_triggers.push(trigger);
        self
    }

    /// Start triggers followed by end triggers
    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.start_triggers
            .iter()
            .flatten()
            .chain(self.end_triggers.iter())
    }
}

/// Children of a concept: either sub-concepts or conditions, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptChildren {
    /// Intermediate concept
    Concepts(Vec<Concept>),
    /// Leaf concept
    Conditions(Vec<Condition>),
}

impl Default for ConceptChildren {
    fn default() -> Self {
        Self::Conditions(Vec::new())
    }
}

/// Intermediate or leaf performance node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    /// Name, unique among tasks and concepts
    pub name: String,
    /// Id, unique across the forest
    pub node_id: NodeId,
    /// Optional priority, at least 1
    #[serde(default)]
    pub priority: Option<i64>,
    /// Rollup weight among siblings
    #[serde(default)]
    pub weight: Option<f64>,
    /// Sub-concepts or conditions
    #[serde(default)]
    pub children: ConceptChildren,
    /// Optional survey
    #[serde(default)]
    pub survey: Option<SurveyAssessment>,
}

impl Concept {
    /// Leaf concept with no conditions
    #[must_use]
    pub fn new(name: impl Into<String>, node_id: NodeId) -> Self {
        Self {
            name: name.into(),
            node_id,
            priority: None,
            weight: None,
            children: ConceptChildren::default(),
            survey: None,
        }
    }

    /// Builder: set the rollup weight
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Builder: append a condition, turning the concept into a leaf
    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        match &mut self.children {
            ConceptChildren::Conditions(conditions) => conditions.push(condition),
            ConceptChildren::Concepts(_) => {
                self.children = ConceptChildren::Conditions(vec![condition]);
            }
        }
        self
    }

    /// Builder: append a sub-concept, turning the concept into an intermediate node
    #[must_use]
    pub fn with_child(mut self, concept: Concept) -> Self {
        match &mut self.children {
            ConceptChildren::Concepts(concepts) => concepts.push(concept),
            ConceptChildren::Conditions(_) => {
                self.children = ConceptChildren::Concepts(vec![concept]);
            }
        }
        self
    }

    /// Conditions when this is a leaf concept
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        match &self.children {
            ConceptChildren::Conditions(conditions) => conditions,
            ConceptChildren::Concepts(_) => &[],
        }
    }

    /// Sub-concepts when this is an intermediate concept
    #[must_use]
    pub fn sub_concepts(&self) -> &[Concept] {
        match &self.children {
            ConceptChildren::Concepts(concepts) => concepts,
            ConceptChildren::Conditions(_) => &[],
        }
    }
}

/// Leaf assessment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Condition {
    /// Implementation class name
    pub condition_impl: String,
    /// Rollup weight among sibling conditions
    #[serde(default)]
    pub weight: Option<f64>,
    /// Optional scoring rules; when present must be non-empty
    #[serde(default)]
    pub scoring: Option<Vec<ScoringRule>>,
    /// Default assessment, when present must name one
    #[serde(default)]
    pub default_assessment: Option<String>,
    /// Typed input
    #[serde(default)]
    pub input: Option<ConditionInput>,
}

impl Condition {
    /// Condition with an implementation and input
    #[must_use]
    pub fn new(condition_impl: impl Into<String>, input: ConditionInput) -> Self {
        Self {
            condition_impl: condition_impl.into(),
            input: Some(input),
            ..Self::default()
        }
    }

    /// Builder: set the rollup weight
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Scoring rule kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// Count of violations
    Count(ScoringSpec),
    /// Time to complete
    CompletionTime(ScoringSpec),
    /// Time spent in violation
    ViolationTime(ScoringSpec),
}

impl ScoringRule {
    /// Label used in messages
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Count(_) => "count",
            Self::CompletionTime(_) => "completionTime",
            Self::ViolationTime(_) => "violationTime",
        }
    }

    /// Rule body
    #[must_use]
    pub fn spec(&self) -> &ScoringSpec {
        match self {
            Self::Count(spec) | Self::CompletionTime(spec) | Self::ViolationTime(spec) => spec,
        }
    }
}

/// Body of a scoring rule
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoringSpec {
    /// Rule name
    pub name: String,
    /// Units of the measured quantity
    #[serde(default)]
    pub units: Option<String>,
    /// Evaluators, at least one
    #[serde(default)]
    pub evaluators: Vec<Evaluator>,
}

/// Threshold comparison producing an assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluator {
    /// Assessment level produced
    pub assessment: String,
    /// Comparison operator
    pub operator: String,
    /// Threshold
    pub value: String,
}

/// Real-time count/violation-time rules of some inputs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RealTimeAssessmentRules {
    /// Violation count rule
    #[serde(default)]
    pub count: Option<ScoringSpec>,
    /// Violation time rule
    #[serde(default)]
    pub violation_time: Option<ScoringSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_children_switch_kind() {
        let concept = Concept::new("Move", NodeId(2))
            .with_condition(Condition::new("domain.Timer", ConditionInput::NoConditionInput));
        assert_eq!(concept.conditions().len(), 1);
        assert!(concept.sub_concepts().is_empty());

        let parent = Concept::new("Parent", NodeId(1)).with_child(concept);
        assert_eq!(parent.sub_concepts().len(), 1);
        assert!(parent.conditions().is_empty());
    }

    #[test]
    fn task_triggers_chain_start_then_end() {
        use crate::trigger::{Trigger, TriggerType};

        let mut task = Task::new("Patrol", NodeId(0))
            .with_end_trigger(Trigger::new(TriggerType::TaskEnded { node_id: Some(NodeId(0)) }));
        task.start_triggers = Some(vec![Trigger::new(TriggerType::ScenarioStarted)]);

        let kinds: Vec<bool> = task
            .triggers()
            .map(|t| t.trigger_type.is_scenario_started())
            .collect();
        assert_eq!(kinds, vec![true, false]);
    }

    #[test]
    fn scoring_rule_labels() {
        let rule = ScoringRule::ViolationTime(ScoringSpec::default());
        assert_eq!(rule.label(), "violationTime");
        assert!(rule.spec().evaluators.is_empty());
    }
}
