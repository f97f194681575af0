//! Unique identifier and name allocation
//!
//! Node ids are handed out from a cursor seeded by the largest id in the
//! document. Names are produced by appending an increasing counter to a
//! prefix until the namespace no longer contains the candidate.

use crate::document::ScenarioDocument;
use crate::ids::NodeId;
use crate::performance::{Concept, Task};
use crate::strategy::Strategy;
use crate::team::{Team, TeamMember};
use crate::transition::StateTransition;
use parking_lot::Mutex;
use tracing::trace;

/// Prefix of generated task names
pub const NEW_TASK_PREFIX: &str = "New Task ";
/// Prefix of generated concept names
pub const NEW_CONCEPT_PREFIX: &str = "New Concept ";
/// Prefix of generated strategy names
pub const NEW_STRATEGY_PREFIX: &str = "New Strategy ";
/// Prefix of generated state transition names
pub const NEW_STATE_TRANSITION_PREFIX: &str = "New State Transition ";
/// Prefix of generated team names
pub const NEW_TEAM_PREFIX: &str = "New Team ";
/// Prefix of generated team member names
pub const NEW_TEAM_MEMBER_PREFIX: &str = "New Team Member ";

/// Namespaces in which generated names must be unique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Tasks and concepts share one namespace
    PerformanceNode,
    /// Strategies
    Strategy,
    /// State transitions
    StateTransition,
    /// Teams and team members share one namespace
    Team,
    /// Places of interest
    PlaceOfInterest,
}

impl Namespace {
    /// Whether `name` is taken in this namespace. Blank names always are.
    #[must_use]
    pub fn contains(self, doc: &ScenarioDocument, name: &str) -> bool {
        if name.trim().is_empty() {
            return true;
        }
        match self {
            Self::PerformanceNode => doc
                .performance_nodes()
                .iter()
                .any(|node| node.name() == name),
            Self::Strategy => doc.strategy(name).is_some(),
            Self::StateTransition => doc.state_transition(name).is_some(),
            Self::Team => doc.has_team_or_member(name),
            Self::PlaceOfInterest => doc.place_of_interest(name).is_some(),
        }
    }
}

/// `prefix` followed by the first counter from 1 for which `exists` is false
pub fn next_name(prefix: &str, exists: impl Fn(&str) -> bool) -> String {
    (1u64..)
        .map(|index| format!("{prefix}{index}"))
        .find(|candidate| !exists(candidate))
        .unwrap_or_else(|| prefix.to_string())
}

/// Hands out Task/Concept node ids that are unique across the forest
#[derive(Debug, Default)]
pub struct NodeIdAllocator {
    cursor: Mutex<Option<i64>>,
}

impl NodeIdAllocator {
    /// Allocator that will scan on first use
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused node id
    ///
    /// The first call scans `doc` for its largest id; later calls only bump
    /// the cursor, so ids handed out but never inserted are not reused.
    pub fn next_node_id(&self, doc: &ScenarioDocument) -> NodeId {
        let mut cursor = self.cursor.lock();
        let last = cursor.get_or_insert_with(|| largest_node_id(doc));
        *last += 1;
        trace!(node_id = *last, "allocated node id");
        NodeId(*last)
    }

    /// Forget the cursor so the next call rescans
    pub fn reset(&self) {
        *self.cursor.lock() = None;
    }

    /// A unique name in `namespace`
    #[must_use]
    pub fn unique_name(&self, doc: &ScenarioDocument, namespace: Namespace, prefix: &str) -> String {
        next_name(prefix, |candidate| namespace.contains(doc, candidate))
    }

    /// Task with a unique name and id holding one generated concept. Not inserted.
    #[must_use]
    pub fn generate_new_task(&self, doc: &ScenarioDocument) -> Task {
        let name = self.unique_name(doc, Namespace::PerformanceNode, NEW_TASK_PREFIX);
        let node_id = self.next_node_id(doc);
        Task::new(name, node_id).with_concept(self.generate_new_concept(doc))
    }

    /// Concept with a unique name and id. Not inserted.
    #[must_use]
    pub fn generate_new_concept(&self, doc: &ScenarioDocument) -> Concept {
        let name = self.unique_name(doc, Namespace::PerformanceNode, NEW_CONCEPT_PREFIX);
        Concept::new(name, self.next_node_id(doc))
    }

    /// Strategy with a unique name. Not inserted.
    #[must_use]
    pub fn generate_new_strategy(&self, doc: &ScenarioDocument) -> Strategy {
        Strategy::new(self.unique_name(doc, Namespace::Strategy, NEW_STRATEGY_PREFIX))
    }

    /// State transition with a unique name. Not inserted.
    #[must_use]
    pub fn generate_new_state_transition(&self, doc: &ScenarioDocument) -> StateTransition {
        StateTransition::new(self.unique_name(
            doc,
            Namespace::StateTransition,
            NEW_STATE_TRANSITION_PREFIX,
        ))
    }

    /// Team with a unique name. Not inserted.
    #[must_use]
    pub fn generate_new_team(&self, doc: &ScenarioDocument) -> Team {
        Team::new(self.unique_name(doc, Namespace::Team, NEW_TEAM_PREFIX))
    }

    /// Team member with a unique name and no learner id. Not inserted.
    #[must_use]
    pub fn generate_new_team_member(&self, doc: &ScenarioDocument) -> TeamMember {
        TeamMember {
            name: self.unique_name(doc, Namespace::Team, NEW_TEAM_MEMBER_PREFIX),
            learner_id: None,
        }
    }
}

fn largest_node_id(doc: &ScenarioDocument) -> i64 {
    doc.performance_nodes()
        .iter()
        .map(|node| node.node_id().get())
        .fold(0, i64::max)
}
