//! Scenario Model - typed training-scenario documents
//!
//! Provides:
//! - The scenario document: performance forest, strategies, state transitions,
//!   places of interest, team organization, learner actions and triggers
//! - [`NodeKey`] addressing for every validatable node
//! - [`NodeIdAllocator`] for unique node ids and default names
//!
//! # Example
//!
//! ```rust
//! use scenario_model::{NodeIdAllocator, ScenarioDocument};
//!
//! let mut doc = ScenarioDocument::new();
//! let allocator = NodeIdAllocator::new();
//! let task = allocator.generate_new_task(&doc);
//! assert_eq!(task.name, "New Task 1");
//! doc.tasks.push(task);
//! ```

#![warn(unreachable_pub)]

pub mod action;
pub mod allocator;
pub mod document;
pub mod ids;
pub mod input;
pub mod performance;
pub mod place;
pub mod strategy;
pub mod team;
pub mod transition;
pub mod trigger;

pub use action::{
    AvailableLearnerActions, LearnerAction, LearnerActionParams, LearnerActionType,
    TutorMeConfiguration,
};
pub use allocator::{next_name, Namespace, NodeIdAllocator};
pub use document::{PerformanceNode, ScenarioDocument, ScenarioEndTrigger, TrainingApplication};
pub use ids::{NodeId, NodeKey};
pub use input::ConditionInput;
pub use performance::{
    Concept, ConceptChildren, Condition, Evaluator, RealTimeAssessmentRules, ScoringRule,
    ScoringSpec, SurveyAssessment, Task,
};
pub use place::{
    AreaRef, Coordinate, CoordinateType, PathRef, PlaceOfInterest, PointRef, Segment,
    StartLocation,
};
pub use strategy::{Activity, EnvironmentAdaptation, Strategy};
pub use team::{LearnerId, Team, TeamMember, TeamOrganization, TeamUnit};
pub use transition::{StateTransition, StateType};
pub use trigger::{EntityIdentity, Trigger, TriggerLocation, TriggerType};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with scenario documents
    pub use crate::{
        Concept, Condition, ConditionInput, NodeId, NodeIdAllocator, NodeKey, PlaceOfInterest,
        ScenarioDocument, Strategy, Task, Team, TeamMember, TeamOrganization,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
