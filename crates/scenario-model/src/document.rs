//! The scenario document and its lookups

use crate::action::{AvailableLearnerActions, LearnerAction};
use crate::ids::{NodeId, NodeKey};
use crate::performance::{Concept, ConceptChildren, Condition, Task};
use crate::place::PlaceOfInterest;
use crate::strategy::Strategy;
use crate::team::{LearnerId, Team, TeamMember, TeamOrganization};
use crate::transition::StateTransition;
use crate::trigger::Trigger;
use serde::{Deserialize, Serialize};

/// End trigger of the whole scenario
pub type ScenarioEndTrigger = Trigger;

/// Training application the scenario runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingApplication {
    /// Embedded Unity build
    UnityEmbedded,
    /// Virtual Battlespace
    Vbs,
    /// VR-Engage
    VrEngage,
    /// Desktop Unity build
    UnityDesktop,
    /// HAVEN
    Haven,
    /// RIDE
    Ride,
    /// PowerPoint
    PowerPoint,
    /// ARES sand table
    Ares,
    /// Mobile device events
    MobileDeviceEvents,
    /// TC3
    Tc,
    /// DE testbed
    DeTestbed,
    /// Sudoku
    Sudoku,
    /// Simple example application
    SimpleExample,
}

impl TrainingApplication {
    /// Whether the application identifies the learner by a learner id
    #[must_use]
    pub fn requires_learner_id(self) -> bool {
        matches!(
            self,
            Self::UnityEmbedded
                | Self::Vbs
                | Self::VrEngage
                | Self::UnityDesktop
                | Self::Haven
                | Self::Ride
        )
    }

    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UnityEmbedded => "Unity WebGL",
            Self::Vbs => "VBS",
            Self::VrEngage => "VR-Engage",
            Self::UnityDesktop => "Unity Desktop",
            Self::Haven => "HAVEN",
            Self::Ride => "RIDE",
            Self::PowerPoint => "PowerPoint",
            Self::Ares => "ARES",
            Self::MobileDeviceEvents => "Mobile Device",
            Self::Tc => "TC3",
            Self::DeTestbed => "DE Testbed",
            Self::Sudoku => "Sudoku",
            Self::SimpleExample => "Simple Example",
        }
    }
}

/// Root of an editable training scenario
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioDocument {
    /// Target training application
    #[serde(default)]
    pub training_application: Option<TrainingApplication>,
    /// Scenario-level learner identity
    #[serde(default)]
    pub learner_id: Option<LearnerId>,
    /// Team organization
    #[serde(default)]
    pub team_organization: Option<TeamOrganization>,
    /// Performance forest roots
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Instructional strategies
    #[serde(default)]
    pub strategies: Vec<Strategy>,
    /// State transitions
    #[serde(default)]
    pub state_transitions: Vec<StateTransition>,
    /// Places of interest
    #[serde(default)]
    pub places_of_interest: Vec<PlaceOfInterest>,
    /// Learner actions
    #[serde(default)]
    pub learner_actions: AvailableLearnerActions,
    /// Scenario end triggers
    #[serde(default)]
    pub end_triggers: Vec<ScenarioEndTrigger>,
}

impl ScenarioDocument {
    /// Empty document
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the training application needs a learner id and the
    /// scenario-level start location has no coordinate
    #[must_use]
    pub fn learner_start_location_needed(&self) -> bool {
        let required = self
            .training_application
            .is_some_and(TrainingApplication::requires_learner_id);
        let has_coordinate = matches!(
            &self.learner_id,
            Some(LearnerId::StartLocation(start)) if start.coordinate.is_some()
        );
        required && !has_coordinate
    }

    /// Whether the training application is VBS
    #[inline]
    #[must_use]
    pub fn is_vbs(&self) -> bool {
        self.training_application == Some(TrainingApplication::Vbs)
    }

    // ---- performance forest ----

    /// Task by node id
    #[must_use]
    pub fn find_task(&self, id: NodeId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.node_id == id)
    }

    /// Mutable task by node id
    pub fn find_task_mut(&mut self, id: NodeId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.node_id == id)
    }

    /// Concept anywhere in the forest by node id
    #[must_use]
    pub fn find_concept(&self, id: NodeId) -> Option<&Concept> {
        self.tasks
            .iter()
            .find_map(|task| find_in(&task.concepts, id))
    }

    /// Mutable concept anywhere in the forest by node id
    pub fn find_concept_mut(&mut self, id: NodeId) -> Option<&mut Concept> {
        self.tasks
            .iter_mut()
            .find_map(|task| find_in_mut(&mut task.concepts, id))
    }

    /// Parent chain of a concept, nearest first, ending at its task
    ///
    /// Empty for tasks and unknown ids.
    #[must_use]
    pub fn ancestors_of(&self, id: NodeId) -> Vec<NodeKey> {
        for task in &self.tasks {
            let mut path = Vec::new();
            if path_to(&task.concepts, id, &mut path) {
                let mut chain: Vec<NodeKey> = path.into_iter().rev().map(NodeKey::Concept).collect();
                chain.push(NodeKey::Task(task.node_id));
                return chain;
            }
        }
        Vec::new()
    }

    /// Every task and concept, depth-first
    pub fn performance_nodes(&self) -> Vec<PerformanceNode<'_>> {
        let mut out = Vec::new();
        for task in &self.tasks {
            out.push(PerformanceNode::Task(task));
            collect_concepts(&task.concepts, &mut out);
        }
        out
    }

    /// Condition at `index` under the leaf concept `concept`
    #[must_use]
    pub fn condition(&self, concept: NodeId, index: usize) -> Option<&Condition> {
        self.find_concept(concept)?.conditions().get(index)
    }

    /// Mutable condition at `index` under the leaf concept `concept`
    pub fn condition_mut(&mut self, concept: NodeId, index: usize) -> Option<&mut Condition> {
        match &mut self.find_concept_mut(concept)?.children {
            ConceptChildren::Conditions(conditions) => conditions.get_mut(index),
            ConceptChildren::Concepts(_) => None,
        }
    }

    /// Every condition with its key, depth-first
    #[must_use]
    pub fn all_conditions(&self) -> Vec<(NodeKey, &Condition)> {
        self.performance_nodes()
            .into_iter()
            .filter_map(|node| match node {
                PerformanceNode::Concept(concept) => Some(concept),
                PerformanceNode::Task(_) => None,
            })
            .flat_map(|concept| {
                concept
                    .conditions()
                    .iter()
                    .enumerate()
                    .map(move |(index, condition)| {
                        (
                            NodeKey::Condition {
                                concept: concept.node_id,
                                index,
                            },
                            condition,
                        )
                    })
            })
            .collect()
    }

    // ---- named entities ----

    /// Place of interest by name
    #[must_use]
    pub fn place_of_interest(&self, name: &str) -> Option<&PlaceOfInterest> {
        self.places_of_interest.iter().find(|poi| poi.name() == name)
    }

    /// Mutable place of interest by name
    pub fn place_of_interest_mut(&mut self, name: &str) -> Option<&mut PlaceOfInterest> {
        self.places_of_interest
            .iter_mut()
            .find(|poi| poi.name() == name)
    }

    /// Strategy by name
    #[must_use]
    pub fn strategy(&self, name: &str) -> Option<&Strategy> {
        self.strategies.iter().find(|strategy| strategy.name == name)
    }

    /// Mutable strategy by name
    pub fn strategy_mut(&mut self, name: &str) -> Option<&mut Strategy> {
        self.strategies
            .iter_mut()
            .find(|strategy| strategy.name == name)
    }

    /// State transition by name
    #[must_use]
    pub fn state_transition(&self, name: &str) -> Option<&StateTransition> {
        self.state_transitions
            .iter()
            .find(|transition| transition.name.as_deref() == Some(name))
    }

    /// Learner action by display name
    #[must_use]
    pub fn learner_action(&self, display_name: &str) -> Option<&LearnerAction> {
        self.learner_actions
            .list()
            .iter()
            .find(|action| action.display_name == display_name)
    }

    /// Root team of the organization
    #[must_use]
    pub fn team_root(&self) -> Option<&Team> {
        self.team_organization.as_ref()?.root.as_ref()
    }

    /// Mutable root team of the organization
    pub fn team_root_mut(&mut self) -> Option<&mut Team> {
        self.team_organization.as_mut()?.root.as_mut()
    }

    /// Whether any team or member is named `name`
    #[must_use]
    pub fn has_team_or_member(&self, name: &str) -> bool {
        self.team_root()
            .is_some_and(|root| root.has_team_or_member(name))
    }

    /// Team by name
    #[must_use]
    pub fn team(&self, name: &str) -> Option<&Team> {
        self.team_root()?.team(name)
    }

    /// Team member by name
    #[must_use]
    pub fn team_member(&self, name: &str) -> Option<&TeamMember> {
        self.team_root()?.member(name)
    }

    /// Names of every team and member
    #[must_use]
    pub fn team_names(&self) -> Vec<&str> {
        self.team_root().map(Team::names).unwrap_or_default()
    }

    /// Some member of the organization, if any
    #[must_use]
    pub fn any_member_name(&self) -> Option<&str> {
        self.team_root()?.any_member_name()
    }
}

/// A task or concept
#[derive(Debug, Clone, Copy)]
pub enum PerformanceNode<'a> {
    /// Task
    Task(&'a Task),
    /// Concept
    Concept(&'a Concept),
}

impl PerformanceNode<'_> {
    /// Node name
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Task(task) => &task.name,
            Self::Concept(concept) => &concept.name,
        }
    }

    /// Node id
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        match self {
            Self::Task(task) => task.node_id,
            Self::Concept(concept) => concept.node_id,
        }
    }

    /// Cache key of the node
    #[must_use]
    pub fn key(&self) -> NodeKey {
        match self {
            Self::Task(task) => NodeKey::Task(task.node_id),
            Self::Concept(concept) => NodeKey::Concept(concept.node_id),
        }
    }
}

fn collect_concepts<'a>(concepts: &'a [Concept], out: &mut Vec<PerformanceNode<'a>>) {
    for concept in concepts {
        out.push(PerformanceNode::Concept(concept));
        collect_concepts(concept.sub_concepts(), out);
    }
}

fn find_in(concepts: &[Concept], id: NodeId) -> Option<&Concept> {
    concepts.iter().find_map(|concept| {
        if concept.node_id == id {
            Some(concept)
        } else {
            find_in(concept.sub_concepts(), id)
        }
    })
}

fn find_in_mut(concepts: &mut [Concept], id: NodeId) -> Option<&mut Concept> {
    for concept in concepts {
        if concept.node_id == id {
            return Some(concept);
        }
        if let ConceptChildren::Concepts(children) = &mut concept.children {
            if let Some(found) = find_in_mut(children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Pushes the ids of the concepts above `id` (root first) onto `path`.
fn path_to(concepts: &[Concept], id: NodeId, path: &mut Vec<NodeId>) -> bool {
    for concept in concepts {
        if concept.node_id == id {
            return true;
        }
        path.push(concept.node_id);
        if path_to(concept.sub_concepts(), id, path) {
            return true;
        }
        path.pop();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ConditionInput;
    use crate::place::{Coordinate, StartLocation};
    use pretty_assertions::assert_eq;

    fn forest() -> ScenarioDocument {
        let leaf = Concept::new("Leaf", NodeId(3))
            .with_condition(Condition::new("domain.A", ConditionInput::NoConditionInput))
            .with_condition(Condition::new("domain.B", ConditionInput::NoConditionInput));
        let mid = Concept::new("Mid", NodeId(2)).with_child(leaf);
        let other = Concept::new("Other", NodeId(4));
        ScenarioDocument {
            tasks: vec![
                Task::new("Task", NodeId(1)).with_concept(mid),
                Task::new("Second", NodeId(5)).with_concept(other),
            ],
            ..ScenarioDocument::default()
        }
    }

    #[test]
    fn ancestors_run_from_parent_to_task() {
        let doc = forest();
        assert_eq!(
            doc.ancestors_of(NodeId(3)),
            vec![NodeKey::Concept(NodeId(2)), NodeKey::Task(NodeId(1))]
        );
        assert_eq!(doc.ancestors_of(NodeId(4)), vec![NodeKey::Task(NodeId(5))]);
        assert!(doc.ancestors_of(NodeId(1)).is_empty());
        assert!(doc.ancestors_of(NodeId(99)).is_empty());
    }

    #[test]
    fn conditions_are_addressed_by_concept_and_index() {
        let doc = forest();
        let keys: Vec<NodeKey> = doc.all_conditions().into_iter().map(|(key, _)| key).collect();
        assert_eq!(
            keys,
            vec![
                NodeKey::Condition { concept: NodeId(3), index: 0 },
                NodeKey::Condition { concept: NodeId(3), index: 1 },
            ]
        );
        assert_eq!(
            doc.condition(NodeId(3), 1).map(|c| c.condition_impl.as_str()),
            Some("domain.B")
        );
        assert!(doc.condition(NodeId(2), 0).is_none());
    }

    #[test]
    fn performance_nodes_are_depth_first() {
        let doc = forest();
        let nodes = doc.performance_nodes();
        let names: Vec<&str> = nodes.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["Task", "Mid", "Leaf", "Second", "Other"]);
    }

    #[test]
    fn learner_start_location_requirement() {
        let mut doc = ScenarioDocument::new();
        assert!(!doc.learner_start_location_needed());

        doc.training_application = Some(TrainingApplication::Vbs);
        assert!(doc.learner_start_location_needed());

        doc.learner_id = Some(LearnerId::StartLocation(StartLocation {
            coordinate: Some(Coordinate::gcc(0.0, 0.0, 0.0)),
        }));
        assert!(!doc.learner_start_location_needed());

        doc.training_application = Some(TrainingApplication::PowerPoint);
        doc.learner_id = None;
        assert!(!doc.learner_start_location_needed());
    }
}
