//! Instructional strategy rules
//!
//! A strategy is valid when its name is set and every activity passes. The
//! environment adaptations are the only activities that look outside the
//! strategy itself: team members, places of interest and other strategies'
//! highlight names.

use super::{ensure, has_min_len, is_blank, is_blank_opt};
use crate::error::{RuleResult, ValidationFailure};
use crate::rules::places::check_coordinate;
use crate::validator::Validator;
use scenario_model::strategy::{
    AssessmentType, AutoTutorSko, Conversation, DwellAssessment, DwellDuration, Feedback,
    FeedbackPresentation, HighlightTarget, LessonMaterial, LtiProperties, Media, MediaProperties,
    SkoScript,
};
use scenario_model::{Activity, CoordinateType, EnvironmentAdaptation, PlaceOfInterest, Strategy};

impl Validator<'_> {
    pub(crate) fn check_strategy(&self, strategy: &Strategy) -> RuleResult {
        ensure(!is_blank(&strategy.name), "Strategy is missing a name")?;
        ensure(
            self.doc
                .strategies
                .iter()
                .filter(|other| other.name == strategy.name)
                .count()
                <= 1,
            "Strategy name is used by more than one strategy",
        )?;
        strategy
            .activities
            .iter()
            .try_for_each(|activity| self.check_activity(activity))
    }

    fn check_activity(&self, activity: &Activity) -> RuleResult {
        let handler = activity
            .handler()
            .ok_or_else(|| ValidationFailure::invalid("Strategy handler is null"))?;
        ensure(!is_blank(&handler.impl_name), "Strategy handler impl is blank")?;
        if let Some(delay) = activity.delay_after() {
            ensure(
                delay.duration.is_some_and(|duration| duration >= 0.01),
                "Delay duration is null or less than 0.01",
            )?;
        }

        match activity {
            Activity::InstructionalIntervention(intervention) => {
                let feedback = intervention
                    .feedback
                    .as_ref()
                    .ok_or_else(|| ValidationFailure::invalid("No feedback"))?;
                self.check_feedback(feedback)
            }
            Activity::MidLessonMedia(media) => match &media.lesson_material {
                Some(material) => check_lesson_material(material),
                None => Ok(()),
            },
            Activity::PerformanceAssessment(assessment) => {
                match assessment
                    .assessment
                    .as_ref()
                    .ok_or_else(|| ValidationFailure::invalid("Assessment type is null"))?
                {
                    AssessmentType::Conversation(Conversation::TreeFile { name }) => ensure(
                        has_min_len(name, 18),
                        "Tree file must be at least 18 characters",
                    ),
                    AssessmentType::Conversation(Conversation::AutoTutor(sko)) => {
                        check_auto_tutor_sko(sko)
                    }
                    AssessmentType::PerformanceNode { node_id } => ensure(
                        node_id.is_some_and(|id| id.is_valid()),
                        "Performance node id is null or less than 0",
                    ),
                }
            }
            Activity::ScenarioAdaptation(adaptation) => match &adaptation.adaptation {
                Some(adaptation) => self.check_adaptation(adaptation),
                None => Ok(()),
            },
        }
    }

    fn check_feedback(&self, feedback: &Feedback) -> RuleResult {
        self.check_members_exist(&feedback.team_refs)?;
        let presentation = feedback
            .presentation
            .as_ref()
            .ok_or_else(|| ValidationFailure::invalid("Feedback does not have a presentation type"))?;
        match presentation {
            FeedbackPresentation::Message { content } => ensure(
                has_min_len(content, 2),
                "Feedback message is less than 2 characters",
            ),
            FeedbackPresentation::Audio { ogg_file, mp3_file } => {
                if let Some(ogg) = ogg_file {
                    ensure(has_min_len(ogg, 5), "OGG file length is less than 5 characters")?;
                }
                ensure(
                    has_min_len(mp3_file, 5),
                    "MP3 file length is less than 5 characters",
                )
            }
            FeedbackPresentation::MediaSemantics {
                avatar,
                key_name,
                message,
            } => {
                ensure(
                    has_min_len(avatar, 6),
                    "Avatar file length is less than 6 characters",
                )?;
                ensure(
                    has_min_len(key_name, 5),
                    "Media key name is less than 5 characters",
                )?;
                match message.as_deref() {
                    Some(message) if !is_blank(message) => ensure(
                        has_min_len(message, 2),
                        "Media message is less than 2 characters",
                    ),
                    _ => Ok(()),
                }
            }
            FeedbackPresentation::File { html } => ensure(
                has_min_len(html, 6),
                "Feedback file length is less than 6 characters",
            ),
        }
    }

    fn check_adaptation(&self, adaptation: &EnvironmentAdaptation) -> RuleResult {
        match adaptation {
            EnvironmentAdaptation::Fog { density } => {
                ensure(density.is_some(), "Fog density is not set")
            }
            EnvironmentAdaptation::TimeOfDay { kind } => {
                ensure(!is_blank_opt(kind.as_deref()), "Time of day is not set")
            }
            EnvironmentAdaptation::Overcast { value } => {
                ensure(value.is_some(), "Overcast value is not set")
            }
            EnvironmentAdaptation::Rain { value } => {
                ensure(value.is_some(), "Rain value is not set")
            }
            EnvironmentAdaptation::CreateActors {
                side,
                actor_type,
                coordinate,
                actor_name,
            } => {
                ensure(!is_blank_opt(side.as_deref()), "The side is not set")?;
                ensure(!is_blank_opt(actor_type.as_deref()), "The type is not set")?;
                ensure(coordinate.is_some(), "The location is not set")?;
                if let Some(name) = actor_name {
                    ensure(
                        name.chars().all(char::is_alphanumeric),
                        "The actor name contains a non-alphanumeric character",
                    )?;
                }
                Ok(())
            }
            EnvironmentAdaptation::Endurance { value, team_member } => {
                ensure(value.is_some(), "The endurance value is not set")?;
                self.check_adaptation_member(team_member.as_deref())
            }
            EnvironmentAdaptation::FatigueRecovery { rate, team_member } => {
                ensure(rate.is_some(), "The recovery rate is not set")?;
                self.check_adaptation_member(team_member.as_deref())
            }
            EnvironmentAdaptation::RemoveActors { actor_name } => {
                ensure(!is_blank(actor_name), "The actor name cannot be blank")
            }
            EnvironmentAdaptation::Teleport {
                coordinate,
                team_member,
            } => {
                let coordinate = coordinate
                    .as_ref()
                    .ok_or_else(|| ValidationFailure::invalid("The location is not set"))?;
                check_coordinate(coordinate)?;
                self.check_adaptation_member(team_member.as_deref())
            }
            EnvironmentAdaptation::Script { value } => ensure(
                !is_blank(value),
                "The content of the scenario adaptation script is missing",
            ),
            EnvironmentAdaptation::HighlightObjects { name, target } => {
                ensure(!is_blank(name), "The highlight name is missing")?;
                match target
                    .as_ref()
                    .ok_or_else(|| ValidationFailure::invalid("The type of object to highlight is not set"))?
                {
                    HighlightTarget::TeamMember(member) => {
                        ensure(!is_blank(member), "The team member to highlight is missing")?;
                        if self.doc.has_team_or_member(member) {
                            Ok(())
                        } else {
                            Err(ValidationFailure::reference(format!(
                                "The team member to highlight '{member}' does not exist in the team organization."
                            )))
                        }
                    }
                    HighlightTarget::Location(place) => self.check_highlight_location(place),
                }
            }
            EnvironmentAdaptation::RemoveHighlightOnObjects { highlight_name } => {
                let exists = self
                    .doc
                    .strategies
                    .iter()
                    .flat_map(Strategy::adaptations)
                    .any(|adaptation| {
                        matches!(
                            adaptation,
                            EnvironmentAdaptation::HighlightObjects { name, .. } if name == highlight_name
                        )
                    });
                if exists {
                    Ok(())
                } else {
                    Err(ValidationFailure::reference(format!(
                        "The highlight name '{highlight_name}' is not an existing highlight object name."
                    )))
                }
            }
            EnvironmentAdaptation::CreateBreadcrumbs {
                place_of_interest,
                team_members,
            } => {
                self.check_breadcrumb_place(place_of_interest)?;
                ensure(
                    !team_members.is_empty(),
                    "Please select one or more team members to see the bread crumb(s).",
                )
            }
            EnvironmentAdaptation::RemoveBreadcrumbs { team_members } => ensure(
                !team_members.is_empty(),
                "Please select one or more team members to remove bread crumb(s) from.",
            ),
        }
    }

    fn check_adaptation_member(&self, member: Option<&str>) -> RuleResult {
        match member {
            Some(member) if !is_blank(member) => self.check_target_member(member),
            _ => Ok(()),
        }
    }

    fn check_highlight_location(&self, place: &str) -> RuleResult {
        match self.doc.place_of_interest(place) {
            None => Err(missing_place(place)),
            Some(PlaceOfInterest::Point { coordinate, .. }) => {
                if self.doc.is_vbs() && !is_agl(coordinate.as_ref()) {
                    return Err(needs_agl(place));
                }
                Ok(())
            }
            Some(_) => Err(ValidationFailure::reference(format!(
                "The place of interest named '{place}' is not a point."
            ))),
        }
    }

    fn check_breadcrumb_place(&self, place: &str) -> RuleResult {
        match self.doc.place_of_interest(place) {
            None => Err(missing_place(place)),
            Some(PlaceOfInterest::Area { .. }) => Err(ValidationFailure::reference(format!(
                "The place of interest named '{place}' is not a point or path."
            ))),
            Some(_) if !self.doc.is_vbs() => Ok(()),
            Some(PlaceOfInterest::Point { coordinate, .. }) => {
                ensure_agl(place, coordinate.as_ref())
            }
            Some(PlaceOfInterest::Path { segments, .. }) => {
                let first = segments.first().ok_or_else(|| {
                    ValidationFailure::invalid(format!(
                        "The place of interest named '{place}' must contain at least two points."
                    ))
                })?;
                ensure_agl(place, first.start.as_ref())
            }
        }
    }
}

fn is_agl(coordinate: Option<&scenario_model::Coordinate>) -> bool {
    coordinate.is_some_and(|coordinate| coordinate.coordinate_type() == CoordinateType::Agl)
}

fn ensure_agl(place: &str, coordinate: Option<&scenario_model::Coordinate>) -> RuleResult {
    if is_agl(coordinate) {
        Ok(())
    } else {
        Err(needs_agl(place))
    }
}

fn missing_place(place: &str) -> ValidationFailure {
    ValidationFailure::reference(format!(
        "The place of interest named '{place}' does not exist. Please select an existing place of interest."
    ))
}

fn needs_agl(place: &str) -> ValidationFailure {
    ValidationFailure::invalid(format!(
        "The place of interest named '{place}' must use the AGL coordinate type for VBS scripting to work.  Either use a different place of interest or change the coordinate type."
    ))
}

fn check_lesson_material(material: &LessonMaterial) -> RuleResult {
    ensure(!material.media.is_empty(), "Lesson material list is empty")?;
    material.media.iter().try_for_each(check_media)?;
    match &material.assessment {
        Some(assessment) => check_dwell_assessment(assessment),
        None => Ok(()),
    }
}

fn check_media(media: &Media) -> RuleResult {
    ensure(!is_blank(&media.name), "Media is missing a name")?;
    ensure(has_min_len(&media.uri, 3), "Media URI is less than 3 characters")?;
    let properties = media
        .properties
        .as_ref()
        .ok_or_else(|| ValidationFailure::invalid("Media type property is null"))?;
    match properties {
        MediaProperties::Pdf
        | MediaProperties::Webpage
        | MediaProperties::Image
        | MediaProperties::Video => Ok(()),
        MediaProperties::YouTube { size } => match size {
            Some(size) => ensure(
                size.height.is_some() && size.width.is_some(),
                "Youtube height or width is null",
            ),
            None => Ok(()),
        },
        MediaProperties::Slideshow {
            display_previous,
            keep_continue,
        } => ensure(
            display_previous.is_some() && keep_continue.is_some(),
            "Slideshow button is null",
        ),
        MediaProperties::Lti(lti) => check_lti(lti),
    }
}

fn check_lti(lti: &LtiProperties) -> RuleResult {
    ensure(!is_blank(&lti.identifier), "Lti identifier is blank")?;
    ensure(lti.allow_score.is_some(), "Allow score is null")?;
    for param in &lti.params {
        ensure(
            !is_blank(&param.name) && !is_blank(&param.value),
            "LTI parameter pair is missing a name or value",
        )?;
    }
    if let Some(min) = lti.slider_min {
        ensure(min >= 0, "Slider min value is less than 0")?;
    }
    if let Some(max) = lti.slider_max {
        ensure(max >= 0, "Slider max value is less than 0")?;
    }
    ensure(lti.display_mode.is_some(), "Display mode is null")?;
    for concept in &lti.concepts {
        ensure(!is_blank(concept), "LTI concept is blank")?;
    }
    Ok(())
}

fn check_dwell_assessment(assessment: &DwellAssessment) -> RuleResult {
    if let Some(underdwell) = &assessment.underdwell {
        ensure(
            underdwell.duration.is_some_and(|duration| duration >= 0),
            "Underdwell duration is null or less than 0",
        )?;
        ensure(
            !is_blank(&underdwell.feedback),
            "Underdwell is missing feedback",
        )?;
    }
    if let Some(overdwell) = &assessment.overdwell {
        match overdwell
            .duration
            .ok_or_else(|| ValidationFailure::invalid("Overdwell duration is null"))?
        {
            DwellDuration::Percent { time, percent } => {
                ensure(
                    time.is_some_and(|time| time >= 0),
                    "Duration time is null or less than 0",
                )?;
                ensure(
                    percent.is_some_and(|percent| percent >= 0),
                    "Duration percent is null or less than 0",
                )?;
            }
            DwellDuration::Time(time) => {
                ensure(time >= 0, "Duration time is less than 0")?;
            }
        }
    }
    Ok(())
}

/// AutoTutor script shared by assessments, inputs and learner actions
pub(crate) fn check_auto_tutor_sko(sko: &AutoTutorSko) -> RuleResult {
    match sko
        .script
        .as_ref()
        .ok_or_else(|| ValidationFailure::invalid("Script is null"))?
    {
        SkoScript::Local { file } => {
            ensure(has_min_len(file, 5), "SKO file must be at least 5 characters")
        }
        SkoScript::Remote { url } => ensure(
            has_min_len(url, 4),
            "Remote SKO URL must be at least 4 characters",
        ),
    }
}
