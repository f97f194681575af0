//! Task and scenario triggers

use crate::ids::NodeId;
use crate::place::{Coordinate, PointRef};
use crate::strategy::Strategy;
use crate::team::LearnerId;
use serde::{Deserialize, Serialize};

/// Start or end trigger of a task, or an end trigger of the scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    /// What fires the trigger
    pub trigger_type: TriggerType,
    /// Seconds to wait after firing
    #[serde(default)]
    pub delay: Option<f64>,
    /// Strategy applied when the trigger fires
    #[serde(default)]
    pub message: Option<Strategy>,
}

impl Trigger {
    /// Trigger with no delay or message
    #[inline]
    #[must_use]
    pub fn new(trigger_type: TriggerType) -> Self {
        Self {
            trigger_type,
            delay: None,
            message: None,
        }
    }
}

/// Whose location an [`TriggerType::EntityLocation`] trigger tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityIdentity {
    /// Identified directly
    Learner(LearnerId),
    /// Identified by a team member name
    TeamMember(String),
}

/// Target of a location trigger
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerLocation {
    /// Literal coordinate
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    /// Named point
    #[serde(default)]
    pub point_ref: Option<PointRef>,
}

/// What fires a [`Trigger`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerType {
    /// An entity reaches a location
    EntityLocation {
        /// Tracked entity
        entity: EntityIdentity,
        /// Destination
        location: Option<TriggerLocation>,
    },
    /// The learner reaches a coordinate
    LearnerLocation {
        /// Destination
        coordinate: Option<Coordinate>,
    },
    /// A concept finishes
    ConceptEnded {
        /// Concept node id
        node_id: Option<NodeId>,
    },
    /// A child concept finishes
    ChildConceptEnded {
        /// Concept node id
        node_id: Option<NodeId>,
    },
    /// A task finishes
    TaskEnded {
        /// Task node id
        node_id: Option<NodeId>,
    },
    /// A concept receives an assessment
    ConceptAssessment {
        /// Concept node id
        concept: Option<NodeId>,
        /// Assessment level
        result: String,
    },
    /// The learner performs a learner action
    LearnerActionReference {
        /// Display name of the action
        name: String,
    },
    /// The scenario starts
    ScenarioStarted,
    /// A strategy is applied
    StrategyApplied {
        /// Strategy name
        strategy_name: String,
    },
}

impl TriggerType {
    /// Whether this is a scenario-started trigger
    #[inline]
    #[must_use]
    pub fn is_scenario_started(&self) -> bool {
        matches!(self, Self::ScenarioStarted)
    }
}
