//! Typed condition inputs
//!
//! Every condition carries exactly one [`ConditionInput`]. The set is
//! closed: the reference walk and the validator both match on it
//! exhaustively, so adding a variant forces both to be updated.

use crate::performance::RealTimeAssessmentRules;
use crate::place::{AreaRef, PathRef, PointRef, StartLocation};
use crate::strategy::{AutoTutorSko, NameValue};
use serde::{Deserialize, Serialize};

/// Team member or point targeted by a weapon/detection condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRef {
    /// Team member by name
    TeamMember(String),
    /// Named point
    Point(PointRef),
}

/// Timed waypoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Expected arrival time
    pub at_time: String,
    /// Point name
    pub point: String,
    /// Allowed deviation in seconds
    pub window_of_time: Option<f64>,
}

/// Entity group of a hostile or target condition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entities {
    /// Team members in the group
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Start locations in the group
    #[serde(default)]
    pub start_locations: Vec<StartLocation>,
}

/// Entry/exit pair of an [`EnterAreaInput`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrance {
    /// Name
    pub name: String,
    /// Assessment given on entry
    pub assessment: String,
    /// Inside point
    pub inside: Option<EntranceBoundary>,
    /// Outside point
    pub outside: Option<EntranceBoundary>,
}

/// One side of an [`Entrance`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntranceBoundary {
    /// Point name
    pub point: String,
    /// Proximity in meters
    pub proximity: Option<f64>,
}

/// Pair of learners that must keep their distance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpacingPair {
    /// First member
    pub first: Option<String>,
    /// Second member
    pub second: Option<String>,
    /// Ideal range
    pub ideal: Option<SpacingRange>,
    /// Acceptable range
    pub acceptable: Option<SpacingRange>,
}

/// Min/max spacing range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpacingRange {
    /// Minimum spacing
    pub min: Option<f64>,
    /// Maximum spacing
    pub max: Option<f64>,
}

/// Excavator component movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcavatorComponent {
    /// Component kind (boom, bucket, arm, swing)
    pub component_type: Option<String>,
    /// Required movement
    #[serde(default)]
    pub direction: Option<ExcavatorDirection>,
}

/// Movement direction of an [`ExcavatorComponent`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcavatorDirection {
    /// Movement in any direction
    Any(f64),
    /// Separate negative/positive rotation thresholds
    Bidirectional {
        /// Negative rotation
        negative: f64,
        /// Positive rotation
        positive: f64,
    },
}

/// PowerPoint slide dwell time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// One-based slide index
    pub index: Option<i64>,
    /// Seconds
    pub time_seconds: i64,
}

/// Kind of external attribute requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalAttributeType {
    /// Weapon state, needs no attribute name
    WeaponState,
    /// Named simulation variable
    Variable,
}

/// Weapon control status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wcs {
    /// Hold, tight or free
    pub value: Option<String>,
}

/// Input that only names team members
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamRefsInput {
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
}

/// Input with team members and real-time rules
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamRulesInput {
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Real-time assessment rules
    #[serde(default)]
    pub real_time_rules: Option<RealTimeAssessmentRules>,
}

/// Input that counts shots
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShotsInput {
    /// Expected number of shots
    #[serde(default)]
    pub expected_number_of_shots: Option<String>,
}

/// Application-completed input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApplicationCompletedInput {
    /// Ideal duration as `HH:MM:SS`
    #[serde(default)]
    pub ideal_completion_duration: Option<String>,
}

/// Assigned-sector input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssignedSectorInput {
    /// Max angle from the sector center
    pub max_angle_from_center: Option<f64>,
    /// Sector center
    pub point_ref: Option<PointRef>,
    /// Allowed free look time
    #[serde(default)]
    pub free_look_duration: Option<f64>,
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
}

/// AutoTutor conversation input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoTutorInput {
    /// Script object
    pub sko: Option<AutoTutorSko>,
}

/// Avoid-location input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AvoidLocationInput {
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Points to avoid
    #[serde(default)]
    pub point_refs: Vec<PointRef>,
    /// Areas to avoid
    #[serde(default)]
    pub area_refs: Vec<AreaRef>,
    /// Real-time assessment rules
    #[serde(default)]
    pub real_time_rules: Option<RealTimeAssessmentRules>,
    /// Learner must report reaching the location
    #[serde(default)]
    pub require_learner_action: bool,
}

/// Checkpoint pace/progress input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CheckpointInput {
    /// Assessed member
    #[serde(default)]
    pub team_member_ref: Option<String>,
    /// Ordered checkpoints
    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,
}

/// Corridor boundary input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorridorBoundaryInput {
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Buffer width percentage
    pub buffer_width_percent: Option<f64>,
    /// Corridor path
    pub path_ref: Option<PathRef>,
}

/// Corridor posture input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CorridorPostureInput {
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Allowed postures
    #[serde(default)]
    pub postures: Vec<String>,
    /// Corridor path
    pub path_ref: Option<PathRef>,
}

/// Detect-objects input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectObjectsInput {
    /// Field of view in degrees
    #[serde(default)]
    pub field_of_view: Option<i64>,
    /// Orient angle in degrees
    #[serde(default)]
    pub orient_angle: Option<i64>,
    /// Above-expectation reaction time
    #[serde(default)]
    pub above_expectation_upper_bound: Option<f64>,
    /// At-expectation reaction time
    #[serde(default)]
    pub at_expectation_upper_bound: Option<f64>,
    /// View distance
    #[serde(default)]
    pub view_max_distance: Option<i64>,
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Objects to detect
    #[serde(default)]
    pub objects_to_detect: Option<Vec<TargetRef>>,
}

/// Eliminate-hostiles and lifeform-target-accuracy input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntitiesInput {
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Hostile or target entities
    #[serde(default)]
    pub entities: Option<Entities>,
    /// Real-time assessment rules
    #[serde(default)]
    pub real_time_rules: Option<RealTimeAssessmentRules>,
}

/// Weapon cone input shared by engage-targets and negligent-discharge
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeaponConeInput {
    /// Cone angle in degrees
    pub weapon_cone_angle: i64,
    /// Cone reach
    #[serde(default)]
    pub weapon_cone_max_distance: Option<i64>,
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Targets to engage or avoid
    #[serde(default)]
    pub targets: Option<Vec<TargetRef>>,
    /// Above-expectation time, engage-targets only
    #[serde(default)]
    pub above_expectation_upper_bound: Option<f64>,
    /// At-expectation time, engage-targets only
    #[serde(default)]
    pub at_expectation_upper_bound: Option<f64>,
    /// Real-time rules, negligent-discharge only
    #[serde(default)]
    pub real_time_rules: Option<RealTimeAssessmentRules>,
}

/// Enter-area input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnterAreaInput {
    /// Assessed member
    #[serde(default)]
    pub team_member_ref: Option<String>,
    /// Entrances
    #[serde(default)]
    pub entrances: Vec<Entrance>,
}

/// Fire team rate-of-fire input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RateOfFireInput {
    /// At-expectation upper bound
    pub at_expectation_upper_bound: Option<f64>,
    /// Below-expectation upper bound
    pub below_expectation_upper_bound: Option<f64>,
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
}

/// Generic name/value input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenericInput {
    /// Parameters
    #[serde(default)]
    pub pairs: Vec<NameValue>,
}

/// Excavator component input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExcavatorInput {
    /// Components to move
    #[serde(default)]
    pub components: Vec<ExcavatorComponent>,
    /// Maximum assessments
    #[serde(default)]
    pub max_assessments: Option<i64>,
}

/// Identify-POIs input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IdentifyPoisInput {
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Points to identify
    #[serde(default)]
    pub pois: Vec<PointRef>,
    /// Real-time assessment rules
    #[serde(default)]
    pub real_time_rules: Option<RealTimeAssessmentRules>,
}

/// Muzzle flagging input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MuzzleFlaggingInput {
    /// Max angle
    pub max_angle: Option<f64>,
    /// Optional max distance
    #[serde(default)]
    pub max_distance: Option<f64>,
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
}

/// Pace count input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaceCountInput {
    /// Assessed member
    #[serde(default)]
    pub team_member_ref: Option<String>,
    /// Meters to walk
    pub expected_distance: f64,
}

/// PowerPoint dwell input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerPointDwellInput {
    /// Default seconds per slide
    pub default_time: Option<i64>,
    /// Per-slide overrides
    pub slides: Option<Vec<Slide>>,
}

/// External attribute request input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalAttributeInput {
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Attribute kind
    pub attribute_type: Option<ExternalAttributeType>,
    /// Attribute name
    #[serde(default)]
    pub attribute_name: String,
}

/// Rules of engagement input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RulesOfEngagementInput {
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
    /// Weapon control status
    pub wcs: Option<Wcs>,
    /// Real-time assessment rules
    #[serde(default)]
    pub real_time_rules: Option<RealTimeAssessmentRules>,
}

/// SIMILE input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimileInput {
    /// Configuration file
    pub configuration_file: String,
    /// Condition key
    pub condition_key: String,
}

/// Spacing input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpacingInput {
    /// Pairs to assess
    #[serde(default)]
    pub pairs: Vec<SpacingPair>,
}

/// Speed limit input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpeedLimitInput {
    /// Limit
    pub speed_limit: Option<f64>,
    /// Assessed member
    pub team_member_ref: Option<String>,
    /// Real-time assessment rules
    #[serde(default)]
    pub real_time_rules: Option<RealTimeAssessmentRules>,
}

/// Timer input
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimerInput {
    /// Repeat after each interval
    pub repeatable: Option<bool>,
    /// Seconds
    pub interval: Option<f64>,
    /// Assessed members
    #[serde(default)]
    pub team_member_refs: Vec<String>,
}

/// Typed input of a condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionInput {
    /// Training application finished
    ApplicationCompleted(ApplicationCompletedInput),
    /// Stay within an assigned sector
    AssignedSector(AssignedSectorInput),
    /// AutoTutor conversation
    AutoTutor(AutoTutorInput),
    /// Avoid points and areas
    AvoidLocation(AvoidLocationInput),
    /// Reach checkpoints on time
    CheckpointPace(CheckpointInput),
    /// Reach checkpoints in order
    CheckpointProgress(CheckpointInput),
    /// Stay inside a corridor
    CorridorBoundary(CorridorBoundaryInput),
    /// Hold a posture inside a corridor
    CorridorPosture(CorridorPostureInput),
    /// Detect objects in view
    DetectObjects(DetectObjectsInput),
    /// Eliminate hostile entities
    EliminateHostiles(EntitiesInput),
    /// Engage targets
    EngageTargets(WeaponConeInput),
    /// Enter an area through entrances
    EnterArea(EnterAreaInput),
    /// Explosive hazard spot report
    ExplosiveHazardSpotReport(TeamRefsInput),
    /// Fire team rate of fire
    FireTeamRateOfFire(RateOfFireInput),
    /// Generic parameters
    Generic(GenericInput),
    /// Halt in place
    Halt(TeamRulesInput),
    /// Excavator component movement
    HasMovedExcavatorComponent(ExcavatorInput),
    /// Health of members
    Health(TeamRulesInput),
    /// Identify points of interest
    IdentifyPois(IdentifyPoisInput),
    /// Lifeform target accuracy
    LifeformTargetAccuracy(EntitiesInput),
    /// Marksmanship precision
    MarksmanshipPrecision(ShotsInput),
    /// Marksmanship session complete
    MarksmanshipSessionComplete(ShotsInput),
    /// Muzzle flagging
    MuzzleFlagging(MuzzleFlaggingInput),
    /// Negligent discharge
    NegligentDischarge(WeaponConeInput),
    /// Nine-line report
    NineLineReport(TeamRefsInput),
    /// No input
    NoConditionInput,
    /// Number of shots fired
    NumberOfShotsFired(ShotsInput),
    /// Observer-assessed
    ObservedAssessment(TeamRefsInput),
    /// Pace count
    PaceCount(PaceCountInput),
    /// PowerPoint dwell time
    PowerPointDwell(PowerPointDwellInput),
    /// External attribute request
    RequestExternalAttribute(ExternalAttributeInput),
    /// Rules of engagement
    RulesOfEngagement(RulesOfEngagementInput),
    /// SIMILE assessment
    Simile(SimileInput),
    /// Spacing between members
    Spacing(SpacingInput),
    /// Speed limit
    SpeedLimit(SpeedLimitInput),
    /// Spot report
    SpotReport(TeamRefsInput),
    /// Timer
    Timer(TimerInput),
    /// Radio use
    UseRadio(TeamRefsInput),
}

impl ConditionInput {
    /// Display name of the input variant
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ApplicationCompleted(_) => "ApplicationCompleted",
            Self::AssignedSector(_) => "AssignedSector",
            Self::AutoTutor(_) => "AutoTutor",
            Self::AvoidLocation(_) => "AvoidLocation",
            Self::CheckpointPace(_) => "CheckpointPace",
            Self::CheckpointProgress(_) => "CheckpointProgress",
            Self::CorridorBoundary(_) => "CorridorBoundary",
            Self::CorridorPosture(_) => "CorridorPosture",
            Self::DetectObjects(_) => "DetectObjects",
            Self::EliminateHostiles(_) => "EliminateHostiles",
            Self::EngageTargets(_) => "EngageTargets",
            Self::EnterArea(_) => "EnterArea",
            Self::ExplosiveHazardSpotReport(_) => "ExplosiveHazardSpotReport",
            Self::FireTeamRateOfFire(_) => "FireTeamRateOfFire",
            Self::Generic(_) => "Generic",
            Self::Halt(_) => "Halt",
            Self::HasMovedExcavatorComponent(_) => "HasMovedExcavatorComponent",
            Self::Health(_) => "Health",
            Self::IdentifyPois(_) => "IdentifyPois",
            Self::LifeformTargetAccuracy(_) => "LifeformTargetAccuracy",
            Self::MarksmanshipPrecision(_) => "MarksmanshipPrecision",
            Self::MarksmanshipSessionComplete(_) => "MarksmanshipSessionComplete",
            Self::MuzzleFlagging(_) => "MuzzleFlagging",
            Self::NegligentDischarge(_) => "NegligentDischarge",
            Self::NineLineReport(_) => "NineLineReport",
            Self::NoConditionInput => "NoConditionInput",
            Self::NumberOfShotsFired(_) => "NumberOfShotsFired",
            Self::ObservedAssessment(_) => "ObservedAssessment",
            Self::PaceCount(_) => "PaceCount",
            Self::PowerPointDwell(_) => "PowerPointDwell",
            Self::RequestExternalAttribute(_) => "RequestExternalAttribute",
            Self::RulesOfEngagement(_) => "RulesOfEngagement",
            Self::Simile(_) => "Simile",
            Self::Spacing(_) => "Spacing",
            Self::SpeedLimit(_) => "SpeedLimit",
            Self::SpotReport(_) => "SpotReport",
            Self::Timer(_) => "Timer",
            Self::UseRadio(_) => "UseRadio",
        }
    }

    /// Whether this is a pace count input
    #[inline]
    #[must_use]
    pub fn is_pace_count(&self) -> bool {
        matches!(self, Self::PaceCount(_))
    }

    /// Whether this is an avoid-location input that needs a learner action
    #[inline]
    #[must_use]
    pub fn requires_assess_location(&self) -> bool {
        matches!(self, Self::AvoidLocation(input) if input.require_learner_action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_tagged_pace_count() {
        let json = r#"{"type":"pace_count","expected_distance":100.0}"#;
        let input: ConditionInput = serde_json::from_str(json).unwrap();
        assert!(input.is_pace_count());
        assert_eq!(input.kind_name(), "PaceCount");
    }

    #[test]
    fn avoid_location_learner_action_flag() {
        let mut avoid = AvoidLocationInput::default();
        assert!(!ConditionInput::AvoidLocation(avoid.clone()).requires_assess_location());
        avoid.require_learner_action = true;
        assert!(ConditionInput::AvoidLocation(avoid).requires_assess_location());
        assert!(!ConditionInput::NoConditionInput.requires_assess_location());
    }
}
