//! Testing utilities for the scenario engine workspace
//!
//! Shared document fixtures and metadata sources.

#![allow(missing_docs)]

use async_trait::async_trait;
use scenario_metadata::{
    AdaptationMap, AssessmentTypeMap, ConditionDescriptor, CourseSurvey, FetchError,
    MetadataSource, MockMetadataSource,
};
use scenario_model::input::{AvoidLocationInput, CorridorBoundaryInput, PaceCountInput};
use scenario_model::strategy::{
    Feedback, FeedbackPresentation, InstructionalIntervention, StrategyHandler,
};
use scenario_model::{
    Activity, AreaRef, Concept, Condition, ConditionInput, Coordinate, LearnerAction,
    LearnerActionParams, LearnerActionType, NodeId, PathRef, PlaceOfInterest, PointRef,
    ScenarioDocument, Segment, StateTransition, StateType, Strategy, Task, Team, TeamMember,
    TeamOrganization, TrainingApplication, Trigger, TriggerType,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub const CORRIDOR_IMPL: &str = "domain.CorridorBoundaryCondition";
pub const AVOID_IMPL: &str = "domain.AvoidLocationCondition";
pub const PACE_IMPL: &str = "domain.PaceCountCondition";
pub const NO_INPUT_IMPL: &str = "domain.TimerCondition";

pub fn squad() -> TeamOrganization {
    TeamOrganization::new(
        Team::new("Squad")
            .with_member(TeamMember::with_marking("Alpha", "alpha-1"))
            .with_member(TeamMember::with_marking("Bravo", "bravo-1")),
    )
}

pub fn places() -> Vec<PlaceOfInterest> {
    vec![
        PlaceOfInterest::Point {
            name: "Checkpoint".into(),
            coordinate: Some(Coordinate::gcc(10.0, 20.0, 0.0)),
        },
        PlaceOfInterest::Path {
            name: "Route".into(),
            segments: vec![Segment {
                name: "Leg 1".into(),
                width: Some(5.0),
                buffer_width_percent: Some(10.0),
                start: Some(Coordinate::gcc(0.0, 0.0, 0.0)),
                end: Some(Coordinate::gcc(100.0, 0.0, 0.0)),
            }],
        },
        PlaceOfInterest::Area {
            name: "Zone".into(),
            coordinates: vec![
                Coordinate::gcc(0.0, 0.0, 0.0),
                Coordinate::gcc(10.0, 0.0, 0.0),
                Coordinate::gcc(0.0, 10.0, 0.0),
            ],
        },
    ]
}

pub fn hint_strategy() -> Strategy {
    Strategy::new("Hint").with_activity(Activity::InstructionalIntervention(
        InstructionalIntervention {
            handler: Some(StrategyHandler {
                impl_name: "domain.FeedbackHandler".into(),
            }),
            delay_after: None,
            feedback: Some(Feedback {
                team_refs: vec!["Alpha".into()],
                presentation: Some(FeedbackPresentation::Message {
                    content: "Stay on the route".into(),
                }),
            }),
        },
    ))
}

pub fn corridor_condition(member: &str) -> Condition {
    Condition::new(
        CORRIDOR_IMPL,
        ConditionInput::CorridorBoundary(CorridorBoundaryInput {
            team_member_refs: vec![member.into()],
            buffer_width_percent: Some(10.0),
            path_ref: Some(PathRef {
                value: "Route".into(),
            }),
        }),
    )
}

pub fn avoid_condition(member: &str) -> Condition {
    Condition::new(
        AVOID_IMPL,
        ConditionInput::AvoidLocation(AvoidLocationInput {
            team_member_refs: vec![member.into()],
            point_refs: vec![PointRef::new("Checkpoint")],
            area_refs: vec![AreaRef {
                value: "Zone".into(),
            }],
            real_time_rules: None,
            require_learner_action: false,
        }),
    )
}

pub fn pace_condition(member: &str) -> Condition {
    Condition::new(
        PACE_IMPL,
        ConditionInput::PaceCount(PaceCountInput {
            team_member_ref: Some(member.into()),
            expected_distance: 100.0,
        }),
    )
}

/// Document that passes every rule
///
/// Task `Patrol` (1) holds concept `Movement` (2) with a corridor and an
/// avoid-location condition.
pub fn valid_document() -> ScenarioDocument {
    let mut task = Task::new("Patrol", NodeId(1))
        .with_concept(
            Concept::new("Movement", NodeId(2))
                .with_condition(corridor_condition("Alpha"))
                .with_condition(avoid_condition("Bravo")),
        )
        .with_end_trigger(Trigger::new(TriggerType::ConceptEnded {
            node_id: Some(NodeId(2)),
        }));
    task.start_triggers = Some(vec![Trigger::new(TriggerType::ScenarioStarted)]);

    let mut doc = ScenarioDocument {
        training_application: Some(TrainingApplication::PowerPoint),
        team_organization: Some(squad()),
        tasks: vec![task],
        strategies: vec![hint_strategy()],
        state_transitions: vec![StateTransition {
            name: Some("Escalate".into()),
            logical_expression: vec![StateType::LearnerState {
                attribute: "Engagement".into(),
                previous: None,
                current: Some("Low".into()),
                concept: None,
            }],
            strategy_choices: vec!["Hint".into()],
        }],
        places_of_interest: places(),
        end_triggers: vec![Trigger::new(TriggerType::TaskEnded {
            node_id: Some(NodeId(1)),
        })],
        ..ScenarioDocument::default()
    };
    let mut action = LearnerAction::new(LearnerActionType::ApplyStrategy, "Ask for help");
    action.params = Some(LearnerActionParams::StrategyReference("Hint".into()));
    doc.learner_actions.push(action);
    doc
}

/// [`valid_document`] plus concept `Navigation` (3) holding a pace count
/// condition and no pace count learner actions
pub fn pace_count_document() -> ScenarioDocument {
    let mut doc = valid_document();
    doc.tasks[0]
        .concepts
        .push(Concept::new("Navigation", NodeId(3)).with_condition(pace_condition("Alpha")));
    doc
}

/// Add both pace count learner actions
pub fn add_pace_count_actions(doc: &mut ScenarioDocument) {
    doc.learner_actions.push(LearnerAction::new(
        LearnerActionType::StartPaceCount,
        "Start Pace Count",
    ));
    doc.learner_actions.push(LearnerAction::new(
        LearnerActionType::EndPaceCount,
        "End Pace Count",
    ));
}

/// Task `Weights` (1) with one leaf concept per weight, ids from 2
pub fn weighted_document(weights: &[f64]) -> ScenarioDocument {
    let mut task = Task::new("Weights", NodeId(1)).with_end_trigger(Trigger::new(
        TriggerType::TaskEnded {
            node_id: Some(NodeId(1)),
        },
    ));
    for (offset, weight) in (2_i64..).zip(weights) {
        task.concepts.push(
            Concept::new(format!("Leaf {offset}"), NodeId(offset))
                .with_weight(*weight)
                .with_condition(Condition::new(NO_INPUT_IMPL, ConditionInput::NoConditionInput)),
        );
    }
    ScenarioDocument {
        tasks: vec![task],
        ..ScenarioDocument::default()
    }
}

/// Self-completing set covering every fixture condition
pub fn self_completing_set() -> BTreeSet<String> {
    [CORRIDOR_IMPL, AVOID_IMPL, PACE_IMPL, NO_INPUT_IMPL]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Mock source answering every dataset with fixture data
pub fn permissive_mock() -> MockMetadataSource {
    let mut source = MockMetadataSource::new();
    source.expect_condition_descriptor().returning(|name| {
        Ok(ConditionDescriptor {
            impl_name: name.to_string(),
            display_name: name.to_string(),
            ..ConditionDescriptor::default()
        })
    });
    source
        .expect_overall_assessment_types()
        .returning(|| Ok(AssessmentTypeMap::new()));
    source
        .expect_scenario_adaptations()
        .returning(|| Ok(AdaptationMap::new()));
    source
        .expect_self_completing_conditions()
        .returning(|| Ok(self_completing_set()));
    source.expect_course_surveys().returning(|_| Ok(Vec::new()));
    source
        .expect_conditions_for_application()
        .returning(|_| Ok(self_completing_set()));
    source
}

/// Source that counts calls, can hold every fetch until released and can
/// fail its first fetches
#[derive(Debug, Default)]
pub struct ScriptedSource {
    calls: AtomicUsize,
    failures_left: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch waits for one `notify_one` on `gate`
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// The first `count` fetches fail with `Unavailable`
    pub fn failing(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond<T>(&self, value: T) -> Result<T, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            Err(FetchError::Unavailable("scripted outage".into()))
        } else {
            Ok(value)
        }
    }
}

#[async_trait]
impl MetadataSource for ScriptedSource {
    async fn condition_descriptor(&self, impl_name: &str) -> Result<ConditionDescriptor, FetchError> {
        self.respond(ConditionDescriptor {
            impl_name: impl_name.to_string(),
            display_name: impl_name.to_string(),
            ..ConditionDescriptor::default()
        })
        .await
    }

    async fn overall_assessment_types(&self) -> Result<AssessmentTypeMap, FetchError> {
        self.respond(AssessmentTypeMap::new()).await
    }

    async fn scenario_adaptations(&self) -> Result<AdaptationMap, FetchError> {
        self.respond(AdaptationMap::new()).await
    }

    async fn self_completing_conditions(&self) -> Result<BTreeSet<String>, FetchError> {
        self.respond(self_completing_set()).await
    }

    async fn course_surveys(&self, survey_context_id: &str) -> Result<Vec<CourseSurvey>, FetchError> {
        self.respond(vec![CourseSurvey {
            key: format!("{survey_context_id}-survey"),
            name: "After Action Survey".into(),
        }])
        .await
    }

    async fn conditions_for_application(
        &self,
        _application: TrainingApplication,
    ) -> Result<BTreeSet<String>, FetchError> {
        self.respond(self_completing_set()).await
    }
}
