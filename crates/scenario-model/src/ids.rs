//! Node identifiers and addresses
//!
//! [`NodeId`] is the integer id carried by Task and Concept nodes.
//! [`NodeKey`] is a stable address for any validatable node and is the key
//! used by the validity cache and the reference index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer id of a Task or Concept, unique across the performance forest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl NodeId {
    /// Raw value
    #[inline]
    #[must_use]
    pub fn get(self) -> i64 {
        self.0
    }

    /// Whether the id is usable (non-negative)
    #[inline]
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Stable address of a validatable node
///
/// Conditions have no name of their own, so they are addressed by the id of
/// their owning concept plus their position in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeKey {
    /// The document as a whole
    Scenario,
    /// Task by node id
    Task(NodeId),
    /// Concept by node id
    Concept(NodeId),
    /// Condition at `index` under the leaf concept `concept`
    Condition {
        /// Owning concept
        concept: NodeId,
        /// Position among the concept's conditions
        index: usize,
    },
    /// Typed input of the condition at `index` under `concept`
    ConditionInput {
        /// Owning concept
        concept: NodeId,
        /// Position among the concept's conditions
        index: usize,
    },
    /// Strategy by name
    Strategy(String),
    /// State transition by name
    StateTransition(String),
    /// The places-of-interest collection
    PlacesOfInterest,
    /// Place of interest by name
    PlaceOfInterest(String),
    /// The team organization
    TeamOrganization,
    /// Team by name
    Team(String),
    /// Team member by name
    TeamMember(String),
    /// Scenario-level learner id
    LearnerId,
    /// The available learner actions
    LearnerActions,
    /// Learner action by display name
    LearnerAction(String),
    /// Scenario end triggers
    ScenarioEndTriggers,
}

impl NodeKey {
    /// The condition key that owns an input key
    #[must_use]
    pub fn owning_condition(&self) -> Option<NodeKey> {
        match self {
            Self::ConditionInput { concept, index } => Some(Self::Condition {
                concept: *concept,
                index: *index,
            }),
            _ => None,
        }
    }

    /// Whether a change to this node can affect validity anywhere in the document
    ///
    /// Team organization and learner action edits feed cross-entity rules, so
    /// a dirty notification on one of them clears every cached result.
    #[must_use]
    pub fn is_document_wide(&self) -> bool {
        matches!(
            self,
            Self::LearnerActions
                | Self::LearnerAction(_)
                | Self::TeamOrganization
                | Self::Team(_)
                | Self::TeamMember(_)
                | Self::LearnerId
                | Self::PlacesOfInterest
        )
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scenario => write!(f, "scenario"),
            Self::Task(id) => write!(f, "task#{id}"),
            Self::Concept(id) => write!(f, "concept#{id}"),
            Self::Condition { concept, index } => write!(f, "concept#{concept}/condition[{index}]"),
            Self::ConditionInput { concept, index } => {
                write!(f, "concept#{concept}/condition[{index}]/input")
            }
            Self::Strategy(name) => write!(f, "strategy:{name}"),
            Self::StateTransition(name) => write!(f, "state-transition:{name}"),
            Self::PlacesOfInterest => write!(f, "places-of-interest"),
            Self::PlaceOfInterest(name) => write!(f, "place-of-interest:{name}"),
            Self::TeamOrganization => write!(f, "team-organization"),
            Self::Team(name) => write!(f, "team:{name}"),
            Self::TeamMember(name) => write!(f, "team-member:{name}"),
            Self::LearnerId => write!(f, "learner-id"),
            Self::LearnerActions => write!(f, "learner-actions"),
            Self::LearnerAction(name) => write!(f, "learner-action:{name}"),
            Self::ScenarioEndTriggers => write!(f, "scenario-end-triggers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_validity() {
        assert!(NodeId(0).is_valid());
        assert!(!NodeId(-1).is_valid());
        assert_eq!(NodeId::from(7).get(), 7);
    }

    #[test]
    fn input_key_maps_to_condition() {
        let input = NodeKey::ConditionInput {
            concept: NodeId(4),
            index: 1,
        };
        assert_eq!(
            input.owning_condition(),
            Some(NodeKey::Condition {
                concept: NodeId(4),
                index: 1
            })
        );
        assert_eq!(NodeKey::Task(NodeId(1)).owning_condition(), None);
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(NodeKey::Task(NodeId(3)).to_string(), "task#3");
        assert_eq!(
            NodeKey::Condition {
                concept: NodeId(2),
                index: 0
            }
            .to_string(),
            "concept#2/condition[0]"
        );
        assert_eq!(NodeKey::Strategy("Hint".into()).to_string(), "strategy:Hint");
    }

    #[test]
    fn team_keys_are_document_wide() {
        assert!(NodeKey::TeamMember("A".into()).is_document_wide());
        assert!(!NodeKey::Task(NodeId(1)).is_document_wide());
    }
}
