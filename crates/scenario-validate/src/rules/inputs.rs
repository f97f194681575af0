//! Condition input rules, one arm per input type

use super::{ensure, has_min_len, is_blank, is_blank_opt};
use crate::error::{RuleResult, ValidationFailure};
use crate::rules::performance::check_real_time_rules;
use crate::rules::places::{check_start_location, AGL_ONLY, GCC_ONLY};
use crate::rules::strategy::check_auto_tutor_sko;
use crate::validator::Validator;
use scenario_model::input::{
    AssignedSectorInput, AvoidLocationInput, CheckpointInput, DetectObjectsInput, Entities,
    EntitiesInput, EnterAreaInput, ExcavatorDirection, ExcavatorInput, ExternalAttributeInput,
    ExternalAttributeType, GenericInput, MuzzleFlaggingInput, PowerPointDwellInput,
    RateOfFireInput, SpacingInput, SpacingRange, TargetRef, TeamRulesInput, WeaponConeInput,
};
use scenario_model::{ConditionInput, CoordinateType};
use smallvec::SmallVec;

impl Validator<'_> {
    pub(crate) fn check_input(&self, input: &ConditionInput) -> RuleResult {
        match input {
            ConditionInput::ApplicationCompleted(input) => {
                match input.ideal_completion_duration.as_deref() {
                    Some(duration) => ensure(
                        has_min_len(duration, 8),
                        "Ideal completion duration must be at least 8 characters",
                    ),
                    None => Ok(()),
                }
            }
            ConditionInput::AssignedSector(input) => self.check_assigned_sector(input),
            ConditionInput::AutoTutor(input) => {
                let sko = input
                    .sko
                    .as_ref()
                    .ok_or_else(|| ValidationFailure::invalid("Auto Tutor SKO is null"))?;
                check_auto_tutor_sko(sko)
            }
            ConditionInput::AvoidLocation(input) => self.check_avoid_location(input),
            ConditionInput::CheckpointPace(input) | ConditionInput::CheckpointProgress(input) => {
                self.check_checkpoints(input)
            }
            ConditionInput::CorridorBoundary(input) => {
                self.check_learner_location(!input.team_member_refs.is_empty())?;
                self.check_members_exist(&input.team_member_refs)?;
                ensure(
                    input.buffer_width_percent.is_some_and(|percent| percent >= 0.0),
                    "Buffer width percent is null or less than 0",
                )?;
                self.check_path_ref(input.path_ref.as_ref())
            }
            ConditionInput::CorridorPosture(input) => {
                self.check_learner_location(!input.team_member_refs.is_empty())?;
                self.check_members_exist(&input.team_member_refs)?;
                ensure(
                    !input.postures.is_empty(),
                    "Postures must have at least 1 posture",
                )?;
                for posture in &input.postures {
                    ensure(!is_blank(posture), "Posture is blank")?;
                }
                self.check_path_ref(input.path_ref.as_ref())
            }
            ConditionInput::DetectObjects(input) => self.check_detect_objects(input),
            ConditionInput::EliminateHostiles(input) => self.check_eliminate_hostiles(input),
            ConditionInput::EngageTargets(input) => {
                self.check_weapon_cone(input)?;
                let targets = input
                    .targets
                    .as_deref()
                    .ok_or_else(|| ValidationFailure::invalid("There are no targets to engage"))?;
                self.check_targets(targets, self.vbs_restriction(GCC_ONLY))?;
                check_expectation_times(
                    input.above_expectation_upper_bound,
                    input.at_expectation_upper_bound,
                )
            }
            ConditionInput::EnterArea(input) => self.check_enter_area(input),
            ConditionInput::ExplosiveHazardSpotReport(input)
            | ConditionInput::NineLineReport(input)
            | ConditionInput::SpotReport(input)
            | ConditionInput::UseRadio(input) => {
                self.check_required_team_refs(&input.team_member_refs)
            }
            ConditionInput::FireTeamRateOfFire(input) => self.check_rate_of_fire(input),
            ConditionInput::Generic(input) => check_generic(input),
            ConditionInput::Halt(input) => self.check_team_rules(input, "Halt"),
            ConditionInput::Health(input) => self.check_team_rules(input, "Health"),
            ConditionInput::HasMovedExcavatorComponent(input) => check_excavator(input),
            ConditionInput::IdentifyPois(input) => {
                self.check_learner_location(!input.team_member_refs.is_empty())?;
                self.check_members_exist(&input.team_member_refs)?;
                ensure(!input.pois.is_empty(), "POIs must have at least 1 point")?;
                let restriction = self.vbs_restriction(AGL_ONLY);
                for poi in &input.pois {
                    self.check_point_ref(poi, restriction)?;
                }
                check_real_time_rules(input.real_time_rules.as_ref())
            }
            ConditionInput::LifeformTargetAccuracy(input) => self.check_lifeform_accuracy(input),
            ConditionInput::MarksmanshipPrecision(input)
            | ConditionInput::MarksmanshipSessionComplete(input)
            | ConditionInput::NumberOfShotsFired(input) => match &input.expected_number_of_shots {
                Some(shots) => ensure(!is_blank(shots), "Missing expected number of shots"),
                None => Ok(()),
            },
            ConditionInput::MuzzleFlagging(input) => self.check_muzzle_flagging(input),
            ConditionInput::NegligentDischarge(input) => {
                self.check_weapon_cone(input)?;
                let targets = input
                    .targets
                    .as_deref()
                    .ok_or_else(|| ValidationFailure::invalid("There are no objects to avoid"))?;
                self.check_targets(targets, self.vbs_restriction(GCC_ONLY))?;
                check_real_time_rules(input.real_time_rules.as_ref())
            }
            ConditionInput::NoConditionInput => Ok(()),
            ConditionInput::ObservedAssessment(input) => {
                self.check_members_exist(&input.team_member_refs)
            }
            ConditionInput::PaceCount(input) => {
                let member = input.team_member_ref.as_deref().filter(|name| !is_blank(name));
                self.check_learner_location(member.is_some())?;
                if let Some(member) = member {
                    self.check_member_exists(member)?;
                }
                ensure(
                    input.expected_distance > 0.0,
                    "Expected distance is less than or equal to 0",
                )?;
                self.check_pace_count_dependency(false)
            }
            ConditionInput::PowerPointDwell(input) => check_power_point_dwell(input),
            ConditionInput::RequestExternalAttribute(input) => {
                self.check_external_attribute(input)
            }
            ConditionInput::RulesOfEngagement(input) => {
                self.check_learner_location(!input.team_member_refs.is_empty())?;
                self.check_members_exist(&input.team_member_refs)?;
                let wcs = input
                    .wcs
                    .as_ref()
                    .ok_or_else(|| ValidationFailure::invalid("WCS is null"))?;
                ensure(wcs.value.is_some(), "WCS value is null")?;
                check_real_time_rules(input.real_time_rules.as_ref())
            }
            ConditionInput::Simile(input) => {
                ensure(
                    has_min_len(&input.configuration_file, 5),
                    "Configuration file must be at least 5 characters",
                )?;
                ensure(!is_blank(&input.condition_key), "Missing condition key")
            }
            ConditionInput::Spacing(input) => self.check_spacing(input),
            ConditionInput::SpeedLimit(input) => {
                ensure(
                    input.speed_limit.is_some_and(|limit| limit > 0.0),
                    "A speed of greater than zero must be specified.",
                )?;
                let member = input
                    .team_member_ref
                    .as_deref()
                    .filter(|name| !is_blank(name))
                    .ok_or_else(|| {
                        ValidationFailure::invalid(
                            "The team member the speed limit applies to must be specified",
                        )
                    })?;
                self.check_member_exists(member)?;
                check_real_time_rules(input.real_time_rules.as_ref())
            }
            ConditionInput::Timer(input) => {
                ensure(input.repeatable.is_some(), "Repeatable flag is null")?;
                ensure(
                    input.interval.is_some_and(|interval| interval > 0.0),
                    "Interval is null or less than or equal to 0",
                )?;
                self.check_members_exist(&input.team_member_refs)
            }
        }
    }

    fn check_assigned_sector(&self, input: &AssignedSectorInput) -> RuleResult {
        let angle = input
            .max_angle_from_center
            .ok_or_else(|| ValidationFailure::invalid("The max angle from center is required."))?;
        ensure(
            angle > 0.0 && angle < 180.0,
            "The max angle from center must be between 0 and 180 (exclusive).",
        )?;
        let center = input.point_ref.as_ref().ok_or_else(|| {
            ValidationFailure::invalid("Select the center point of the assigned sector.")
        })?;
        self.check_point_ref(center, self.vbs_restriction(GCC_ONLY))
            .map_err(|failure| {
                failure.with_context(
                    "The selected center point of the assigned sector isn't valid because ",
                )
            })?;
        if let Some(duration) = input.free_look_duration {
            ensure(
                duration >= 0.0,
                "The free look duration must be equal to or greater than zero.",
            )?;
        }
        ensure(
            !input.team_member_refs.is_empty(),
            "At least one team member must be assessed",
        )?;
        self.check_members_exist(&input.team_member_refs)
    }

    fn check_avoid_location(&self, input: &AvoidLocationInput) -> RuleResult {
        self.check_learner_location(!input.team_member_refs.is_empty())?;
        self.check_members_exist(&input.team_member_refs)?;
        ensure(
            !(input.point_refs.is_empty() && input.area_refs.is_empty()),
            "The list of places to avoid is empty",
        )?;
        let restriction = self.vbs_restriction(GCC_ONLY);
        for point in &input.point_refs {
            self.check_point_ref(point, restriction)?;
        }
        for area in &input.area_refs {
            self.check_area_ref(area)?;
        }
        check_real_time_rules(input.real_time_rules.as_ref())?;
        if input.require_learner_action {
            self.check_avoid_location_dependency(false)?;
        }
        Ok(())
    }

    fn check_checkpoints(&self, input: &CheckpointInput) -> RuleResult {
        let member = input.team_member_ref.as_deref().filter(|name| !is_blank(name));
        self.check_learner_location(member.is_some())?;
        if let Some(member) = member {
            self.check_member_exists(member)?;
        }
        ensure(!input.checkpoints.is_empty(), "There are no checkpoints")?;
        for checkpoint in &input.checkpoints {
            ensure(
                !is_blank(&checkpoint.at_time),
                "Checkpoint is missing an At Time",
            )?;
            ensure(!is_blank(&checkpoint.point), "Checkpoint is missing a point")?;
            ensure(
                checkpoint.window_of_time.is_some(),
                "Checkpoint's window of time is null",
            )?;
        }
        Ok(())
    }

    fn check_detect_objects(&self, input: &DetectObjectsInput) -> RuleResult {
        match (input.field_of_view, input.orient_angle) {
            (None, Some(_)) => {
                return Err(ValidationFailure::invalid(
                    "The field of view angle must be specified if the orient angle is specified.",
                ))
            }
            (Some(_), None) => {
                return Err(ValidationFailure::invalid(
                    "The orient angle must be specified if the field of view angle is specified.",
                ))
            }
            (Some(field_of_view), Some(orient)) => ensure(
                orient <= field_of_view,
                "The field of view angle must be greater than the orient angle",
            )?,
            (None, None) => {}
        }
        if let Some(field_of_view) = input.field_of_view {
            ensure(
                (1..=360).contains(&field_of_view),
                "The field of view angle must be between 1 and 360 (inclusive).",
            )?;
        }
        if let Some(orient) = input.orient_angle {
            ensure(
                (1..=360).contains(&orient),
                "The orient angle must be between 1 and 360 (inclusive).",
            )?;
        }
        check_expectation_times(
            input.above_expectation_upper_bound,
            input.at_expectation_upper_bound,
        )?;
        if let Some(distance) = input.view_max_distance {
            ensure(distance > 0, "The max distance must be greater than zero.")?;
        }
        ensure(
            !input.team_member_refs.is_empty(),
            "At least one team member must be assessed",
        )?;
        self.check_members_exist(&input.team_member_refs)?;
        let objects = input
            .objects_to_detect
            .as_deref()
            .ok_or_else(|| ValidationFailure::invalid("There are no objects to detect"))?;
        self.check_targets(objects, self.vbs_restriction(GCC_ONLY))
    }

    fn check_weapon_cone(&self, input: &WeaponConeInput) -> RuleResult {
        ensure(
            (1..=360).contains(&input.weapon_cone_angle),
            "The weapon cone angle must be between 1 and 360 (inclusive).",
        )?;
        if let Some(distance) = input.weapon_cone_max_distance {
            ensure(distance > 0, "The max distance must be greater than zero.")?;
        }
        ensure(
            !input.team_member_refs.is_empty(),
            "At least one team member must be assessed",
        )?;
        self.check_members_exist(&input.team_member_refs)
    }

    fn check_targets(
        &self,
        targets: &[TargetRef],
        restriction: Option<&[CoordinateType]>,
    ) -> RuleResult {
        targets.iter().try_for_each(|target| match target {
            TargetRef::TeamMember(member) => self.check_target_member(member),
            TargetRef::Point(point) => self.check_point_ref(point, restriction),
        })
    }

    fn check_entities(&self, entities: &Entities) -> RuleResult {
        self.check_members_exist(&entities.team_member_refs)?;
        entities
            .start_locations
            .iter()
            .try_for_each(check_start_location)
    }

    fn check_eliminate_hostiles(&self, input: &EntitiesInput) -> RuleResult {
        let entities = input
            .entities
            .as_ref()
            .filter(|entities| {
                !(entities.team_member_refs.is_empty() && entities.start_locations.is_empty())
            })
            .ok_or_else(|| {
                ValidationFailure::invalid(
                    "Entities must contain at least 1 start location or team member reference",
                )
            })?;
        self.check_members_exist(&input.team_member_refs)?;
        self.check_entities(entities)?;
        check_real_time_rules(input.real_time_rules.as_ref())
    }

    fn check_lifeform_accuracy(&self, input: &EntitiesInput) -> RuleResult {
        self.check_learner_location(!input.team_member_refs.is_empty())?;
        self.check_members_exist(&input.team_member_refs)?;
        let entities = input
            .entities
            .as_ref()
            .filter(|entities| {
                !(entities.team_member_refs.is_empty() && entities.start_locations.is_empty())
            })
            .ok_or_else(|| {
                ValidationFailure::invalid("Entities must have at least 1 start location")
            })?;
        self.check_entities(entities)?;
        check_real_time_rules(input.real_time_rules.as_ref())
    }

    fn check_enter_area(&self, input: &EnterAreaInput) -> RuleResult {
        let member = input.team_member_ref.as_deref().filter(|name| !is_blank(name));
        self.check_learner_location(member.is_some())?;
        if let Some(member) = member {
            self.check_member_exists(member)?;
        }
        ensure(
            !input.entrances.is_empty(),
            "Entrance must have at least 1 location",
        )?;
        for entrance in &input.entrances {
            ensure(!is_blank(&entrance.name), "Missing entrance name")?;
            ensure(!is_blank(&entrance.assessment), "Assessment is blank")?;
            let (Some(inside), Some(outside)) = (&entrance.inside, &entrance.outside) else {
                return Err(ValidationFailure::invalid("Inside or Outside is null"));
            };
            ensure(
                !is_blank(&inside.point) && inside.proximity.is_some(),
                "Inside is missing point or proximity",
            )?;
            ensure(
                !is_blank(&outside.point) && outside.proximity.is_some(),
                "Outside is missing point or proximity",
            )?;
        }
        Ok(())
    }

    fn check_rate_of_fire(&self, input: &RateOfFireInput) -> RuleResult {
        let at = input.at_expectation_upper_bound.ok_or_else(|| {
            ValidationFailure::invalid("The upper bound for At Expectation is not set.")
        })?;
        let below = input.below_expectation_upper_bound.ok_or_else(|| {
            ValidationFailure::invalid("The upper bound for Below Expectation is not set.")
        })?;
        ensure(
            at >= below,
            "The below expectation upper bound is greater than the at expectation upper bound.",
        )?;
        ensure(
            !input.team_member_refs.is_empty(),
            "At least one team member must be assessed",
        )?;
        self.check_members_exist(&input.team_member_refs)
    }

    fn check_team_rules(&self, input: &TeamRulesInput, condition: &str) -> RuleResult {
        check_real_time_rules(input.real_time_rules.as_ref())?;
        let learner_id_required = self
            .doc
            .training_application
            .is_some_and(|application| application.requires_learner_id());
        if learner_id_required && input.team_member_refs.is_empty() {
            return Err(ValidationFailure::invalid(format!(
                "{condition} condition requires at least one team member"
            )));
        }
        self.check_members_exist(&input.team_member_refs)
    }

    fn check_muzzle_flagging(&self, input: &MuzzleFlaggingInput) -> RuleResult {
        let angle = input
            .max_angle
            .ok_or_else(|| ValidationFailure::invalid("The max angle is required."))?;
        ensure(
            angle > 0.0 && angle < 180.0,
            "The max angle must be between 0 and 180 (exclusive).",
        )?;
        if let Some(distance) = input.max_distance {
            ensure(
                distance > 0.0,
                "The max distance is optional but must be greater than 0.",
            )?;
        }
        ensure(
            input.team_member_refs.len() >= 2,
            "At least two team members must be assessed",
        )?;
        self.check_members_exist(&input.team_member_refs)
    }

    fn check_external_attribute(&self, input: &ExternalAttributeInput) -> RuleResult {
        self.check_required_team_refs(&input.team_member_refs)?;
        let attribute_type = input
            .attribute_type
            .ok_or_else(|| ValidationFailure::invalid("The attribute type is null"))?;
        if attribute_type != ExternalAttributeType::WeaponState {
            ensure(!is_blank(&input.attribute_name), "The attribute name is blank")?;
        }
        Ok(())
    }

    fn check_spacing(&self, input: &SpacingInput) -> RuleResult {
        ensure(
            !input.pairs.is_empty(),
            "At least one pair of learners to maintain spacing must be specified.",
        )?;
        for pair in &input.pairs {
            let first = pair
                .first
                .as_deref()
                .filter(|name| !is_blank(name))
                .ok_or_else(|| {
                    ValidationFailure::invalid("Missing first object's team member reference")
                })?;
            self.check_member_exists(first)?;
            let second = pair
                .second
                .as_deref()
                .filter(|name| !is_blank(name))
                .ok_or_else(|| {
                    ValidationFailure::invalid("Missing second object's team member reference")
                })?;
            self.check_member_exists(second)?;
            check_spacing_range(pair.ideal.as_ref(), "ideal")?;
            check_spacing_range(pair.acceptable.as_ref(), "acceptable")?;
        }
        Ok(())
    }
}

fn check_spacing_range(range: Option<&SpacingRange>, label: &str) -> RuleResult {
    let range = range.ok_or_else(|| {
        ValidationFailure::invalid(format!("Missing {label} spacing range"))
    })?;
    if range.min.is_none() {
        return Err(ValidationFailure::invalid(format!(
            "Missing {label} minimum spacing"
        )));
    }
    if range.max.is_none() {
        return Err(ValidationFailure::invalid(format!(
            "Missing {label} maximum spacing"
        )));
    }
    Ok(())
}

/// Above and at expectation bounds come as a pair, above strictly first
fn check_expectation_times(above: Option<f64>, at: Option<f64>) -> RuleResult {
    match (above, at) {
        (None, None) => Ok(()),
        (None, Some(_)) => Err(ValidationFailure::invalid(
            "The Above Expectation time must be specified if the At Expectation time is specified",
        )),
        (Some(_), None) => Err(ValidationFailure::invalid(
            "The At Expectation time must be specified if the Above Expectation time is specified",
        )),
        (Some(above), Some(at)) => {
            ensure(
                above < at,
                "The Above Expectation time must be less than the At Expectation time",
            )?;
            ensure(above >= 0.0, "The Above Expectation time can't be negative")?;
            ensure(at >= 0.0, "The At Expectation time can't be negative")
        }
    }
}

fn check_generic(input: &GenericInput) -> RuleResult {
    ensure(
        !input.pairs.is_empty(),
        "Generic param must have at least 1 parameter pair",
    )?;
    let mut seen: SmallVec<[&str; 8]> = SmallVec::new();
    for pair in &input.pairs {
        ensure(
            !is_blank(&pair.name) && !is_blank(&pair.value),
            "Generic param is missing the name or value",
        )?;
        if seen.contains(&pair.name.as_str()) {
            return Err(ValidationFailure::invalid(format!(
                "Generic param has duplicate name '{}'",
                pair.name
            )));
        }
        seen.push(&pair.name);
    }
    Ok(())
}

fn check_excavator(input: &ExcavatorInput) -> RuleResult {
    ensure(
        (1..=4).contains(&input.components.len()),
        "Must have between 1-4 components",
    )?;
    for component in &input.components {
        ensure(
            !is_blank_opt(component.component_type.as_deref()),
            "Component type is null",
        )?;
        match component.direction {
            Some(ExcavatorDirection::Any(value)) => {
                ensure(value >= 0.0, "Any direction is less than 0")?;
            }
            Some(ExcavatorDirection::Bidirectional { negative, positive }) => ensure(
                negative >= 0.0 && positive >= 0.0,
                "Negative or Positive rotation is less than 0",
            )?,
            None => {}
        }
    }
    if let Some(max) = input.max_assessments {
        ensure(max >= 0, "Max assessments is less than 0")?;
    }
    Ok(())
}

fn check_power_point_dwell(input: &PowerPointDwellInput) -> RuleResult {
    let (Some(default_time), Some(slides)) = (input.default_time, &input.slides) else {
        return Err(ValidationFailure::invalid("Missing default or slides"));
    };
    ensure(default_time >= 0, "Default time is less than 0")?;

    let mut nonzero = default_time != 0;
    let mut duplicate = false;
    let mut indices: SmallVec<[i64; 16]> = SmallVec::new();
    for slide in slides {
        ensure(slide.time_seconds >= 0, "Slide time is less than 0")?;
        nonzero |= slide.time_seconds != 0;
        let index = slide
            .index
            .filter(|index| *index >= 1)
            .ok_or_else(|| ValidationFailure::invalid("Slide index is null or less than 1"))?;
        duplicate |= indices.contains(&index);
        indices.push(index);
    }
    ensure(nonzero, "Must have at least one slide with a nonzero value")?;
    ensure(!duplicate, "Cannot have duplicate slide indices")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ValidityCache;
    use crate::error::FailureKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use scenario_metadata::MetadataSnapshot;
    use scenario_model::input::{PaceCountInput, Slide, TeamRefsInput};
    use scenario_model::strategy::NameValue;
    use scenario_model::{
        Coordinate, PlaceOfInterest, PointRef, ScenarioDocument, Team, TeamMember,
        TeamOrganization, TrainingApplication,
    };

    fn doc() -> ScenarioDocument {
        let mut doc = ScenarioDocument::new();
        doc.team_organization = Some(TeamOrganization::new(
            Team::new("Platoon")
                .with_member(TeamMember::with_marking("Lead", "lead"))
                .with_member(TeamMember::with_marking("Gunner", "gun")),
        ));
        doc.places_of_interest.push(PlaceOfInterest::Point {
            name: "Bridge".into(),
            coordinate: Some(Coordinate::agl(1.0, 1.0, 0.0)),
        });
        doc
    }

    fn check(doc: &ScenarioDocument, input: &ConditionInput) -> Result<(), ValidationFailure> {
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        Validator::new(doc, &cache, &metadata).check_input(input)
    }

    fn reason(doc: &ScenarioDocument, input: &ConditionInput) -> String {
        check(doc, input).unwrap_err().reason
    }

    #[test]
    fn report_inputs_require_a_member() {
        let doc = doc();
        let input = ConditionInput::SpotReport(TeamRefsInput::default());
        assert_eq!(reason(&doc, &input), "A team member must be specified.");
        let input = ConditionInput::UseRadio(TeamRefsInput {
            team_member_refs: vec!["Lead".into()],
        });
        assert!(check(&doc, &input).is_ok());
    }

    #[test]
    fn assigned_sector_point_failure_keeps_kind() {
        let doc = doc();
        let input = ConditionInput::AssignedSector(AssignedSectorInput {
            max_angle_from_center: Some(45.0),
            point_ref: Some(PointRef::new("Nowhere")),
            free_look_duration: None,
            team_member_refs: vec!["Lead".into()],
        });
        let failure = check(&doc, &input).unwrap_err();
        assert_eq!(failure.kind, FailureKind::ReferenceIntegrity);
        assert_eq!(
            failure.reason,
            "The selected center point of the assigned sector isn't valid because The point reference name doesn't refer to an existing point"
        );
    }

    #[test]
    fn vbs_restricts_engage_target_points() {
        let mut doc = doc();
        let input = ConditionInput::EngageTargets(WeaponConeInput {
            weapon_cone_angle: 30,
            team_member_refs: vec!["Lead".into()],
            targets: Some(vec![TargetRef::Point(PointRef::new("Bridge"))]),
            ..WeaponConeInput::default()
        });
        assert!(check(&doc, &input).is_ok());

        doc.training_application = Some(TrainingApplication::Vbs);
        doc.learner_id = Some(scenario_model::LearnerId::StartLocation(
            scenario_model::StartLocation {
                coordinate: Some(Coordinate::gcc(0.0, 0.0, 0.0)),
            },
        ));
        assert_eq!(
            reason(&doc, &input),
            "Point uses AGL coordinates which are not allowed"
        );
    }

    #[test]
    fn detect_objects_angle_pairing() {
        let doc = doc();
        let input = ConditionInput::DetectObjects(DetectObjectsInput {
            orient_angle: Some(90),
            ..DetectObjectsInput::default()
        });
        assert_eq!(
            reason(&doc, &input),
            "The field of view angle must be specified if the orient angle is specified."
        );
        let input = ConditionInput::DetectObjects(DetectObjectsInput {
            field_of_view: Some(60),
            orient_angle: Some(90),
            ..DetectObjectsInput::default()
        });
        assert_eq!(
            reason(&doc, &input),
            "The field of view angle must be greater than the orient angle"
        );
    }

    #[test]
    fn expectation_bounds() {
        assert_eq!(
            check_expectation_times(Some(5.0), None).unwrap_err().reason,
            "The At Expectation time must be specified if the Above Expectation time is specified"
        );
        assert_eq!(
            check_expectation_times(Some(5.0), Some(5.0)).unwrap_err().reason,
            "The Above Expectation time must be less than the At Expectation time"
        );
        assert_eq!(
            check_expectation_times(Some(-2.0), Some(5.0)).unwrap_err().reason,
            "The Above Expectation time can't be negative"
        );
        assert!(check_expectation_times(Some(2.0), Some(5.0)).is_ok());
    }

    #[test]
    fn pace_count_condition_reports_missing_actions() {
        let doc = doc();
        let input = ConditionInput::PaceCount(PaceCountInput {
            team_member_ref: Some("Lead".into()),
            expected_distance: 100.0,
        });
        let failure = check(&doc, &input).unwrap_err();
        assert_eq!(failure.kind, FailureKind::DependencyPairing);
    }

    #[test]
    fn generic_duplicate_names() {
        let input = GenericInput {
            pairs: vec![NameValue::new("speed", "1"), NameValue::new("speed", "2")],
        };
        assert_eq!(
            check_generic(&input).unwrap_err().reason,
            "Generic param has duplicate name 'speed'"
        );
    }

    #[test]
    fn power_point_dwell_rules() {
        let slide = |index, time_seconds| Slide {
            index: Some(index),
            time_seconds,
        };
        let zero = PowerPointDwellInput {
            default_time: Some(0),
            slides: Some(vec![slide(1, 0)]),
        };
        assert_eq!(
            check_power_point_dwell(&zero).unwrap_err().reason,
            "Must have at least one slide with a nonzero value"
        );
        let duplicate = PowerPointDwellInput {
            default_time: Some(10),
            slides: Some(vec![slide(1, 5), slide(1, 6)]),
        };
        assert_eq!(
            check_power_point_dwell(&duplicate).unwrap_err().reason,
            "Cannot have duplicate slide indices"
        );
        assert_eq!(
            check_power_point_dwell(&PowerPointDwellInput::default())
                .unwrap_err()
                .reason,
            "Missing default or slides"
        );
    }

    #[test]
    fn halt_needs_member_when_learner_id_required() {
        let mut doc = doc();
        doc.training_application = Some(TrainingApplication::VrEngage);
        let input = ConditionInput::Halt(TeamRulesInput::default());
        assert_eq!(
            reason(&doc, &input),
            "Halt condition requires at least one team member"
        );
        doc.training_application = Some(TrainingApplication::PowerPoint);
        assert!(check(&doc, &input).is_ok());
    }

    #[test]
    fn muzzle_flagging_needs_two_members() {
        let doc = doc();
        let input = ConditionInput::MuzzleFlagging(MuzzleFlaggingInput {
            max_angle: Some(20.0),
            max_distance: None,
            team_member_refs: vec!["Lead".into()],
        });
        assert_eq!(reason(&doc, &input), "At least two team members must be assessed");
    }

    proptest! {
        #[test]
        fn cone_angle_range(angle in -720_i64..720) {
            let doc = doc();
            let input = ConditionInput::NegligentDischarge(WeaponConeInput {
                weapon_cone_angle: angle,
                team_member_refs: vec!["Lead".into()],
                targets: Some(vec![]),
                ..WeaponConeInput::default()
            });
            let in_range = (1..=360).contains(&angle);
            prop_assert_eq!(check(&doc, &input).is_ok(), in_range);
        }

        #[test]
        fn muzzle_angle_is_exclusive(angle in -10.0_f64..200.0) {
            let doc = doc();
            let input = ConditionInput::MuzzleFlagging(MuzzleFlaggingInput {
                max_angle: Some(angle),
                max_distance: None,
                team_member_refs: vec!["Lead".into(), "Gunner".into()],
            });
            prop_assert_eq!(check(&doc, &input).is_ok(), angle > 0.0 && angle < 180.0);
        }
    }
}
