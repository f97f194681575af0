//! Instructional strategies and their activities

use crate::ids::NodeId;
use crate::place::Coordinate;
use serde::{Deserialize, Serialize};

/// A named instructional strategy
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Strategy {
    /// Unique name
    pub name: String,
    /// Ordered activities
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Strategy {
    /// Strategy with no activities
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activities: Vec::new(),
        }
    }

    /// Builder: append an activity
    #[must_use]
    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activities.push(activity);
        self
    }

    /// Environment adaptations carried by this strategy
    pub fn adaptations(&self) -> impl Iterator<Item = &EnvironmentAdaptation> {
        self.activities.iter().filter_map(|activity| match activity {
            Activity::ScenarioAdaptation(adaptation) => adaptation.adaptation.as_ref(),
            _ => None,
        })
    }
}

/// Handler class that carries out an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyHandler {
    /// Handler implementation name
    pub impl_name: String,
}

/// Pause after an activity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    /// Seconds
    pub duration: Option<f64>,
}

/// One step of a [`Strategy`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Feedback delivered to the learner
    InstructionalIntervention(InstructionalIntervention),
    /// Lesson material shown mid-scenario
    MidLessonMedia(MidLessonMedia),
    /// Conversation or performance node assessment
    PerformanceAssessment(PerformanceAssessment),
    /// Change to the simulated environment
    ScenarioAdaptation(ScenarioAdaptation),
}

impl Activity {
    /// Handler of the activity
    #[must_use]
    pub fn handler(&self) -> Option<&StrategyHandler> {
        match self {
            Self::InstructionalIntervention(a) => a.handler.as_ref(),
            Self::MidLessonMedia(a) => a.handler.as_ref(),
            Self::PerformanceAssessment(a) => a.handler.as_ref(),
            Self::ScenarioAdaptation(a) => a.handler.as_ref(),
        }
    }

    /// Delay after the activity
    #[must_use]
    pub fn delay_after(&self) -> Option<&Delay> {
        match self {
            Self::InstructionalIntervention(a) => a.delay_after.as_ref(),
            Self::MidLessonMedia(a) => a.delay_after.as_ref(),
            Self::PerformanceAssessment(a) => a.delay_after.as_ref(),
            Self::ScenarioAdaptation(a) => a.delay_after.as_ref(),
        }
    }
}

/// Feedback activity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InstructionalIntervention {
    /// Handler
    pub handler: Option<StrategyHandler>,
    /// Delay after delivery
    #[serde(default)]
    pub delay_after: Option<Delay>,
    /// Feedback content
    pub feedback: Option<Feedback>,
}

/// Feedback content and its audience
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feedback {
    /// Teams or members receiving the feedback
    #[serde(default)]
    pub team_refs: Vec<String>,
    /// How the feedback is presented
    pub presentation: Option<FeedbackPresentation>,
}

/// Feedback presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedbackPresentation {
    /// Plain text
    Message {
        /// Text
        content: String,
    },
    /// Audio clip
    Audio {
        /// Optional OGG file
        #[serde(default)]
        ogg_file: Option<String>,
        /// MP3 file
        mp3_file: String,
    },
    /// Avatar-delivered message
    MediaSemantics {
        /// Avatar file
        avatar: String,
        /// Key name
        key_name: String,
        /// Optional spoken message
        #[serde(default)]
        message: Option<String>,
    },
    /// HTML file
    File {
        /// HTML file name
        html: String,
    },
}

/// Lesson material activity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MidLessonMedia {
    /// Handler
    pub handler: Option<StrategyHandler>,
    /// Delay after presentation
    #[serde(default)]
    pub delay_after: Option<Delay>,
    /// Material, when present
    #[serde(default)]
    pub lesson_material: Option<LessonMaterial>,
}

/// Media list with optional dwell assessment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LessonMaterial {
    /// Media items
    #[serde(default)]
    pub media: Vec<Media>,
    /// Dwell-time assessment
    #[serde(default)]
    pub assessment: Option<DwellAssessment>,
}

/// A media item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    /// Name
    pub name: String,
    /// Location
    pub uri: String,
    /// Type-specific properties
    pub properties: Option<MediaProperties>,
}

/// Media type properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MediaProperties {
    /// PDF document
    Pdf,
    /// Web page
    Webpage,
    /// Still image
    Image,
    /// Local video
    Video,
    /// YouTube video
    YouTube {
        /// Optional frame size
        #[serde(default)]
        size: Option<MediaSize>,
    },
    /// Slide show
    Slideshow {
        /// Show a previous-slide button
        display_previous: Option<bool>,
        /// Keep the continue button
        keep_continue: Option<bool>,
    },
    /// LTI tool
    Lti(LtiProperties),
}

/// Frame size of embedded video
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MediaSize {
    /// Height
    pub height: Option<f64>,
    /// Width
    pub width: Option<f64>,
}

/// LTI provider settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LtiProperties {
    /// Provider identifier
    pub identifier: String,
    /// Whether the provider may report a score
    pub allow_score: Option<bool>,
    /// Custom parameters
    #[serde(default)]
    pub params: Vec<NameValue>,
    /// Minimum slider value
    #[serde(default)]
    pub slider_min: Option<i64>,
    /// Maximum slider value
    #[serde(default)]
    pub slider_max: Option<i64>,
    /// Display mode
    pub display_mode: Option<String>,
    /// Course concepts the tool covers
    #[serde(default)]
    pub concepts: Vec<String>,
}

/// Generic name/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    /// Name
    pub name: String,
    /// Value
    pub value: String,
}

impl NameValue {
    /// Pair from two strings
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Dwell-time assessment of lesson material
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DwellAssessment {
    /// Too little time spent
    #[serde(default)]
    pub underdwell: Option<Underdwell>,
    /// Too much time spent
    #[serde(default)]
    pub overdwell: Option<Overdwell>,
}

/// Under-dwell rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Underdwell {
    /// Seconds
    pub duration: Option<i64>,
    /// Feedback when triggered
    pub feedback: String,
}

/// Over-dwell rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overdwell {
    /// Threshold
    pub duration: Option<DwellDuration>,
}

/// Over-dwell threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DwellDuration {
    /// Base time plus a percentage
    Percent {
        /// Seconds
        time: Option<i64>,
        /// Percentage
        percent: Option<i64>,
    },
    /// Absolute seconds
    Time(i64),
}

/// Assessment activity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceAssessment {
    /// Handler
    pub handler: Option<StrategyHandler>,
    /// Delay after the assessment
    #[serde(default)]
    pub delay_after: Option<Delay>,
    /// What is assessed
    pub assessment: Option<AssessmentType>,
}

/// Kind of performance assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentType {
    /// Conversation with the learner
    Conversation(Conversation),
    /// Re-assess a task or concept
    PerformanceNode {
        /// Node id of the task or concept
        node_id: Option<NodeId>,
    },
}

/// Conversation source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conversation {
    /// Conversation tree file
    TreeFile {
        /// File name
        name: String,
    },
    /// AutoTutor script
    AutoTutor(AutoTutorSko),
}

/// AutoTutor script object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AutoTutorSko {
    /// Script source
    pub script: Option<SkoScript>,
}

/// Where the AutoTutor script lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkoScript {
    /// Course-local file
    Local {
        /// File name
        file: String,
    },
    /// Remote script
    Remote {
        /// URL
        url: String,
    },
}

/// Environment change activity
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScenarioAdaptation {
    /// Handler
    pub handler: Option<StrategyHandler>,
    /// Delay after the change
    #[serde(default)]
    pub delay_after: Option<Delay>,
    /// The change itself
    pub adaptation: Option<EnvironmentAdaptation>,
}

/// What to highlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightTarget {
    /// A team member
    TeamMember(String),
    /// A point of interest by name
    Location(String),
}

/// Change to the simulated environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentAdaptation {
    /// Fog density
    Fog {
        /// Density
        density: Option<f64>,
    },
    /// Time of day
    TimeOfDay {
        /// Dawn, midday, dusk, midnight
        kind: Option<String>,
    },
    /// Cloud cover
    Overcast {
        /// Amount
        value: Option<f64>,
    },
    /// Rain
    Rain {
        /// Amount
        value: Option<f64>,
    },
    /// Spawn actors
    CreateActors {
        /// Side
        side: Option<String>,
        /// Actor type
        actor_type: Option<String>,
        /// Location
        coordinate: Option<Coordinate>,
        /// Optional actor name
        #[serde(default)]
        actor_name: Option<String>,
    },
    /// Endurance of a member
    Endurance {
        /// Value
        value: Option<f64>,
        /// Member affected
        #[serde(default)]
        team_member: Option<String>,
    },
    /// Fatigue recovery rate of a member
    FatigueRecovery {
        /// Rate
        rate: Option<f64>,
        /// Member affected
        #[serde(default)]
        team_member: Option<String>,
    },
    /// Remove actors by name
    RemoveActors {
        /// Actor name
        actor_name: String,
    },
    /// Move a member
    Teleport {
        /// Destination
        coordinate: Option<Coordinate>,
        /// Member moved
        #[serde(default)]
        team_member: Option<String>,
    },
    /// Run a script
    Script {
        /// Script text
        value: String,
    },
    /// Highlight an object
    HighlightObjects {
        /// Highlight name, referenced by removal
        name: String,
        /// Object to highlight
        target: Option<HighlightTarget>,
    },
    /// Remove a highlight
    RemoveHighlightOnObjects {
        /// Name of an existing highlight
        highlight_name: String,
    },
    /// Show breadcrumbs toward a place
    CreateBreadcrumbs {
        /// Point or path name
        place_of_interest: String,
        /// Members who see the breadcrumbs
        #[serde(default)]
        team_members: Vec<String>,
    },
    /// Hide breadcrumbs
    RemoveBreadcrumbs {
        /// Members whose breadcrumbs are removed
        #[serde(default)]
        team_members: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_accessors() {
        let activity = Activity::ScenarioAdaptation(ScenarioAdaptation {
            handler: Some(StrategyHandler {
                impl_name: "domain.Adaptation".to_string(),
            }),
            delay_after: Some(Delay {
                duration: Some(1.0),
            }),
            adaptation: Some(EnvironmentAdaptation::Rain { value: Some(0.5) }),
        });
        assert_eq!(activity.handler().unwrap().impl_name, "domain.Adaptation");
        assert_eq!(activity.delay_after().unwrap().duration, Some(1.0));

        let strategy = Strategy::new("Weather").with_activity(activity);
        assert_eq!(strategy.adaptations().count(), 1);
    }
}
