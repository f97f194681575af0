//! Reference walk
//!
//! [`walk_node_references`] is the only place that knows which fields of a
//! referrer node hold the name of a place of interest or of a team/team
//! member. Gathering and renaming are both visitors over this walk.
//!
//! Referrers are conditions (their input), strategies (their activities) and
//! tasks (their start and end triggers, including strategies embedded in a
//! trigger message).

use scenario_model::input::{Checkpoint, ConditionInput, Entrance, SpacingPair, TargetRef};
use scenario_model::strategy::{Activity, EnvironmentAdaptation, HighlightTarget};
use scenario_model::{
    AreaRef, EntityIdentity, NodeKey, PointRef, ScenarioDocument, Strategy, Task, Trigger,
    TriggerType,
};
use smallvec::SmallVec;

/// Kind of named entity a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    /// Point, path or area
    PlaceOfInterest,
    /// Team or team member
    Team,
}

impl RefKind {
    /// Every kind
    pub const ALL: [RefKind; 2] = [RefKind::PlaceOfInterest, RefKind::Team];

    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::PlaceOfInterest => "place of interest",
            Self::Team => "team",
        }
    }
}

/// A reference-bearing field handed to a [`ReferenceVisitor`]
#[derive(Debug)]
pub enum RefSlot<'a> {
    /// Required name
    Single(&'a mut String),
    /// Optional name
    Optional(&'a mut Option<String>),
    /// List of names
    List(&'a mut Vec<String>),
    /// List of point references
    Points(&'a mut Vec<PointRef>),
    /// List of area references
    Areas(&'a mut Vec<AreaRef>),
    /// Mixed list of team member and point targets
    Targets(&'a mut Vec<TargetRef>),
}

impl RefSlot<'_> {
    /// Non-blank names of `kind` held by this slot, one per occurrence
    #[must_use]
    pub fn names(&self, kind: RefKind) -> SmallVec<[&str; 4]> {
        let mut out = SmallVec::new();
        match self {
            Self::Single(name) => out.push(name.as_str()),
            Self::Optional(name) => out.extend(name.as_deref()),
            Self::List(names) => out.extend(names.iter().map(String::as_str)),
            Self::Points(points) => out.extend(points.iter().map(|p| p.value.as_str())),
            Self::Areas(areas) => out.extend(areas.iter().map(|a| a.value.as_str())),
            Self::Targets(targets) => out.extend(targets.iter().filter_map(|t| target_name(t, kind))),
        }
        out.retain(|name: &mut &str| !name.trim().is_empty());
        out
    }

    /// Replace `old` with `new`. A blank `new` clears single fields and
    /// drops list entries. Returns whether anything changed.
    pub fn rename(&mut self, kind: RefKind, old: &str, new: &str) -> bool {
        let clear = new.trim().is_empty();
        match self {
            Self::Single(name) => replace(name, old, new),
            Self::Optional(slot) => {
                if slot.as_deref() != Some(old) {
                    return false;
                }
                **slot = (!clear).then(|| new.to_string());
                true
            }
            Self::List(names) => rename_entries(names, |n| n, old, new, clear),
            Self::Points(points) => rename_entries(points, |p| &mut p.value, old, new, clear),
            Self::Areas(areas) => rename_entries(areas, |a| &mut a.value, old, new, clear),
            Self::Targets(targets) => {
                let before = targets.len();
                if clear {
                    targets.retain(|t| target_name(t, kind) != Some(old));
                    return targets.len() != before;
                }
                let mut changed = false;
                for target in targets.iter_mut() {
                    let name = match (kind, target) {
                        (RefKind::Team, TargetRef::TeamMember(name)) => name,
                        (RefKind::PlaceOfInterest, TargetRef::Point(point)) => &mut point.value,
                        _ => continue,
                    };
                    changed |= replace(name, old, new);
                }
                changed
            }
        }
    }
}

fn target_name(target: &TargetRef, kind: RefKind) -> Option<&str> {
    match (kind, target) {
        (RefKind::Team, TargetRef::TeamMember(name)) => Some(name),
        (RefKind::PlaceOfInterest, TargetRef::Point(point)) => Some(&point.value),
        _ => None,
    }
}

fn replace(name: &mut String, old: &str, new: &str) -> bool {
    if name != old {
        return false;
    }
    new.clone_into(name);
    true
}

fn rename_entries<T>(
    items: &mut Vec<T>,
    name_of: impl Fn(&mut T) -> &mut String,
    old: &str,
    new: &str,
    clear: bool,
) -> bool {
    let before = items.len();
    if clear {
        items.retain_mut(|item| name_of(item) != old);
        return items.len() != before;
    }
    items
        .iter_mut()
        .fold(false, |changed, item| replace(name_of(item), old, new) | changed)
}

/// Receives every reference-bearing field of a referrer node
pub trait ReferenceVisitor {
    /// Called once per field, tagged with the kind of entity it names
    fn visit(&mut self, kind: RefKind, slot: RefSlot<'_>);
}

/// Keys of every node that can hold references, in document order
#[must_use]
pub fn referrer_keys(doc: &ScenarioDocument) -> Vec<NodeKey> {
    let conditions = doc.all_conditions().into_iter().map(|(key, _)| key);
    let strategies = doc
        .strategies
        .iter()
        .map(|strategy| NodeKey::Strategy(strategy.name.clone()));
    let tasks = doc.tasks.iter().map(|task| NodeKey::Task(task.node_id));
    conditions.chain(strategies).chain(tasks).collect()
}

/// Walk the reference fields of the node at `key`
///
/// Returns false when `key` does not resolve to a referrer node.
pub fn walk_node_references(
    doc: &mut ScenarioDocument,
    key: &NodeKey,
    visitor: &mut dyn ReferenceVisitor,
) -> bool {
    match key {
        NodeKey::Condition { concept, index } => {
            let Some(condition) = doc.condition_mut(*concept, *index) else {
                return false;
            };
            if let Some(input) = condition.input.as_mut() {
                walk_input(input, visitor);
            }
            true
        }
        NodeKey::Strategy(name) => doc
            .strategy_mut(name)
            .map(|strategy| walk_strategy(strategy, visitor))
            .is_some(),
        NodeKey::Task(id) => doc
            .find_task_mut(*id)
            .map(|task| walk_task(task, visitor))
            .is_some(),
        NodeKey::Scenario
        | NodeKey::Concept(_)
        | NodeKey::ConditionInput { .. }
        | NodeKey::StateTransition(_)
        | NodeKey::PlacesOfInterest
        | NodeKey::PlaceOfInterest(_)
        | NodeKey::TeamOrganization
        | NodeKey::Team(_)
        | NodeKey::TeamMember(_)
        | NodeKey::LearnerId
        | NodeKey::LearnerActions
        | NodeKey::LearnerAction(_)
        | NodeKey::ScenarioEndTriggers => false,
    }
}

fn walk_task(task: &mut Task, visitor: &mut dyn ReferenceVisitor) {
    let start = task.start_triggers.iter_mut().flatten();
    for trigger in start.chain(task.end_triggers.iter_mut()) {
        walk_trigger(trigger, visitor);
    }
}

fn walk_trigger(trigger: &mut Trigger, visitor: &mut dyn ReferenceVisitor) {
    match &mut trigger.trigger_type {
        TriggerType::EntityLocation { entity, location } => {
            if let EntityIdentity::TeamMember(name) = entity {
                visitor.visit(RefKind::Team, RefSlot::Single(name));
            }
            if let Some(point) = location.as_mut().and_then(|l| l.point_ref.as_mut()) {
                visitor.visit(RefKind::PlaceOfInterest, RefSlot::Single(&mut point.value));
            }
        }
        TriggerType::LearnerLocation { .. }
        | TriggerType::ConceptEnded { .. }
        | TriggerType::ChildConceptEnded { .. }
        | TriggerType::TaskEnded { .. }
        | TriggerType::ConceptAssessment { .. }
        | TriggerType::LearnerActionReference { .. }
        | TriggerType::ScenarioStarted
        | TriggerType::StrategyApplied { .. } => {}
    }
    if let Some(message) = trigger.message.as_mut() {
        walk_strategy(message, visitor);
    }
}

fn walk_strategy(strategy: &mut Strategy, visitor: &mut dyn ReferenceVisitor) {
    for activity in &mut strategy.activities {
        match activity {
            Activity::InstructionalIntervention(intervention) => {
                if let Some(feedback) = intervention.feedback.as_mut() {
                    visitor.visit(RefKind::Team, RefSlot::List(&mut feedback.team_refs));
                }
            }
            Activity::ScenarioAdaptation(adaptation) => {
                if let Some(adaptation) = adaptation.adaptation.as_mut() {
                    walk_adaptation(adaptation, visitor);
                }
            }
            Activity::MidLessonMedia(_) | Activity::PerformanceAssessment(_) => {}
        }
    }
}

fn walk_adaptation(adaptation: &mut EnvironmentAdaptation, visitor: &mut dyn ReferenceVisitor) {
    match adaptation {
        EnvironmentAdaptation::Endurance { team_member, .. }
        | EnvironmentAdaptation::FatigueRecovery { team_member, .. }
        | EnvironmentAdaptation::Teleport { team_member, .. } => {
            visitor.visit(RefKind::Team, RefSlot::Optional(team_member));
        }
        EnvironmentAdaptation::HighlightObjects { target, .. } => match target {
            Some(HighlightTarget::TeamMember(name)) => {
                visitor.visit(RefKind::Team, RefSlot::Single(name));
            }
            Some(HighlightTarget::Location(name)) => {
                visitor.visit(RefKind::PlaceOfInterest, RefSlot::Single(name));
            }
            None => {}
        },
        EnvironmentAdaptation::CreateBreadcrumbs {
            place_of_interest,
            team_members,
        } => {
            visitor.visit(RefKind::PlaceOfInterest, RefSlot::Single(place_of_interest));
            visitor.visit(RefKind::Team, RefSlot::List(team_members));
        }
        EnvironmentAdaptation::RemoveBreadcrumbs { team_members } => {
            visitor.visit(RefKind::Team, RefSlot::List(team_members));
        }
        EnvironmentAdaptation::Fog { .. }
        | EnvironmentAdaptation::TimeOfDay { .. }
        | EnvironmentAdaptation::Overcast { .. }
        | EnvironmentAdaptation::Rain { .. }
        | EnvironmentAdaptation::CreateActors { .. }
        | EnvironmentAdaptation::RemoveActors { .. }
        | EnvironmentAdaptation::Script { .. }
        | EnvironmentAdaptation::RemoveHighlightOnObjects { .. } => {}
    }
}

fn walk_input(input: &mut ConditionInput, visitor: &mut dyn ReferenceVisitor) {
    match input {
        ConditionInput::AssignedSector(input) => {
            if let Some(point) = input.point_ref.as_mut() {
                visitor.visit(RefKind::PlaceOfInterest, RefSlot::Single(&mut point.value));
            }
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
        }
        ConditionInput::AvoidLocation(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
            visitor.visit(RefKind::PlaceOfInterest, RefSlot::Points(&mut input.point_refs));
            visitor.visit(RefKind::PlaceOfInterest, RefSlot::Areas(&mut input.area_refs));
        }
        ConditionInput::CheckpointPace(input) | ConditionInput::CheckpointProgress(input) => {
            visitor.visit(RefKind::Team, RefSlot::Optional(&mut input.team_member_ref));
            walk_checkpoints(&mut input.checkpoints, visitor);
        }
        ConditionInput::CorridorBoundary(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
            if let Some(path) = input.path_ref.as_mut() {
                visitor.visit(RefKind::PlaceOfInterest, RefSlot::Single(&mut path.value));
            }
        }
        ConditionInput::CorridorPosture(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
            if let Some(path) = input.path_ref.as_mut() {
                visitor.visit(RefKind::PlaceOfInterest, RefSlot::Single(&mut path.value));
            }
        }
        ConditionInput::DetectObjects(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
            if let Some(objects) = input.objects_to_detect.as_mut() {
                walk_targets(objects, visitor);
            }
        }
        ConditionInput::EliminateHostiles(input) | ConditionInput::LifeformTargetAccuracy(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
            if let Some(entities) = input.entities.as_mut() {
                visitor.visit(RefKind::Team, RefSlot::List(&mut entities.team_member_refs));
            }
        }
        ConditionInput::EngageTargets(input) | ConditionInput::NegligentDischarge(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
            if let Some(targets) = input.targets.as_mut() {
                walk_targets(targets, visitor);
            }
        }
        ConditionInput::EnterArea(input) => {
            visitor.visit(RefKind::Team, RefSlot::Optional(&mut input.team_member_ref));
            walk_entrances(&mut input.entrances, visitor);
        }
        ConditionInput::ExplosiveHazardSpotReport(input)
        | ConditionInput::NineLineReport(input)
        | ConditionInput::ObservedAssessment(input)
        | ConditionInput::SpotReport(input)
        | ConditionInput::UseRadio(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
        }
        ConditionInput::FireTeamRateOfFire(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
        }
        ConditionInput::Halt(input) | ConditionInput::Health(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
        }
        ConditionInput::IdentifyPois(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
            visitor.visit(RefKind::PlaceOfInterest, RefSlot::Points(&mut input.pois));
        }
        ConditionInput::MuzzleFlagging(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
        }
        ConditionInput::PaceCount(input) => {
            visitor.visit(RefKind::Team, RefSlot::Optional(&mut input.team_member_ref));
        }
        ConditionInput::RequestExternalAttribute(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
        }
        ConditionInput::RulesOfEngagement(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
        }
        ConditionInput::Spacing(input) => walk_spacing(&mut input.pairs, visitor),
        ConditionInput::SpeedLimit(input) => {
            visitor.visit(RefKind::Team, RefSlot::Optional(&mut input.team_member_ref));
        }
        ConditionInput::Timer(input) => {
            visitor.visit(RefKind::Team, RefSlot::List(&mut input.team_member_refs));
        }
        ConditionInput::ApplicationCompleted(_)
        | ConditionInput::AutoTutor(_)
        | ConditionInput::Generic(_)
        | ConditionInput::HasMovedExcavatorComponent(_)
        | ConditionInput::MarksmanshipPrecision(_)
        | ConditionInput::MarksmanshipSessionComplete(_)
        | ConditionInput::NoConditionInput
        | ConditionInput::NumberOfShotsFired(_)
        | ConditionInput::PowerPointDwell(_)
        | ConditionInput::Simile(_) => {}
    }
}

fn walk_targets(targets: &mut Vec<TargetRef>, visitor: &mut dyn ReferenceVisitor) {
    visitor.visit(RefKind::Team, RefSlot::Targets(targets));
    visitor.visit(RefKind::PlaceOfInterest, RefSlot::Targets(targets));
}

fn walk_checkpoints(checkpoints: &mut [Checkpoint], visitor: &mut dyn ReferenceVisitor) {
    for checkpoint in checkpoints {
        visitor.visit(RefKind::PlaceOfInterest, RefSlot::Single(&mut checkpoint.point));
    }
}

fn walk_entrances(entrances: &mut [Entrance], visitor: &mut dyn ReferenceVisitor) {
    for entrance in entrances {
        for side in [&mut entrance.inside, &mut entrance.outside] {
            if let Some(boundary) = side.as_mut() {
                visitor.visit(RefKind::PlaceOfInterest, RefSlot::Single(&mut boundary.point));
            }
        }
    }
}

fn walk_spacing(pairs: &mut [SpacingPair], visitor: &mut dyn ReferenceVisitor) {
    for pair in pairs {
        visitor.visit(RefKind::Team, RefSlot::Optional(&mut pair.first));
        visitor.visit(RefKind::Team, RefSlot::Optional(&mut pair.second));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scenario_model::input::{AvoidLocationInput, WeaponConeInput};

    #[derive(Default)]
    struct Collect(Vec<(RefKind, String)>);

    impl ReferenceVisitor for Collect {
        fn visit(&mut self, kind: RefKind, slot: RefSlot<'_>) {
            self.0
                .extend(slot.names(kind).into_iter().map(|n| (kind, n.to_string())));
        }
    }

    #[test]
    fn targets_split_by_kind() {
        let mut input = ConditionInput::EngageTargets(WeaponConeInput {
            team_member_refs: vec!["Alpha".into()],
            targets: Some(vec![
                TargetRef::TeamMember("Bravo".into()),
                TargetRef::Point(PointRef::new("Hill")),
            ]),
            ..WeaponConeInput::default()
        });
        let mut collect = Collect::default();
        walk_input(&mut input, &mut collect);
        assert_eq!(
            collect.0,
            vec![
                (RefKind::Team, "Alpha".to_string()),
                (RefKind::Team, "Bravo".to_string()),
                (RefKind::PlaceOfInterest, "Hill".to_string()),
            ]
        );
    }

    #[test]
    fn blank_rename_drops_list_entries() {
        let mut avoid = AvoidLocationInput {
            point_refs: vec![PointRef::new("Hill"), PointRef::new("Ford")],
            ..AvoidLocationInput::default()
        };
        let mut slot = RefSlot::Points(&mut avoid.point_refs);
        assert!(slot.rename(RefKind::PlaceOfInterest, "Hill", ""));
        assert_eq!(avoid.point_refs, vec![PointRef::new("Ford")]);
    }

    #[test]
    fn blank_rename_clears_optional() {
        let mut member = Some("Alpha".to_string());
        assert!(RefSlot::Optional(&mut member).rename(RefKind::Team, "Alpha", " "));
        assert_eq!(member, None);

        let mut single = "Alpha".to_string();
        assert!(RefSlot::Single(&mut single).rename(RefKind::Team, "Alpha", ""));
        assert_eq!(single, "");
        assert!(!RefSlot::Single(&mut single).rename(RefKind::Team, "Alpha", "Bravo"));
    }

    #[test]
    fn targets_rename_only_matching_kind() {
        let mut targets = vec![
            TargetRef::TeamMember("Hill".into()),
            TargetRef::Point(PointRef::new("Hill")),
        ];
        assert!(RefSlot::Targets(&mut targets).rename(RefKind::PlaceOfInterest, "Hill", "Ridge"));
        assert_eq!(
            targets,
            vec![
                TargetRef::TeamMember("Hill".into()),
                TargetRef::Point(PointRef::new("Ridge")),
            ]
        );
    }

    #[test]
    fn non_referrer_keys_are_not_walked() {
        let mut doc = ScenarioDocument::new();
        let mut collect = Collect::default();
        assert!(!walk_node_references(&mut doc, &NodeKey::PlacesOfInterest, &mut collect));
        assert!(!walk_node_references(
            &mut doc,
            &NodeKey::Strategy("Missing".into()),
            &mut collect
        ));
    }
}
