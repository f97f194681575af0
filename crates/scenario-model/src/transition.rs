//! State transitions

use crate::ids::NodeId;
use serde::{Deserialize, Serialize};

/// Rule that applies strategies when a learner or performance state changes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateTransition {
    /// Optional name, non-blank when present
    #[serde(default)]
    pub name: Option<String>,
    /// States that must all hold
    #[serde(default)]
    pub logical_expression: Vec<StateType>,
    /// Strategy names to choose from
    #[serde(default)]
    pub strategy_choices: Vec<String>,
}

impl StateTransition {
    /// Named transition with no states or choices
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Name, or empty when unnamed
    #[inline]
    #[must_use]
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// One state of a logical expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateType {
    /// Learner state attribute change
    LearnerState {
        /// Attribute name, such as `Understanding`
        attribute: String,
        /// Previous value
        #[serde(default)]
        previous: Option<String>,
        /// Current value
        #[serde(default)]
        current: Option<String>,
        /// Course concept, required for concept-scoped attributes
        #[serde(default)]
        concept: Option<String>,
    },
    /// Task or concept assessment change
    PerformanceNode {
        /// Display name of the node
        name: String,
        /// Node id
        node_id: NodeId,
        /// Previous assessment
        #[serde(default)]
        previous: Option<String>,
        /// Current assessment
        #[serde(default)]
        current: Option<String>,
    },
}

/// Display name of a learner state attribute that is tracked per course concept
#[must_use]
pub fn concept_scoped_attribute(attribute: &str) -> Option<&'static str> {
    match attribute {
        "Understanding" => Some("Understanding"),
        "Motivation" => Some("Motivation"),
        "PriorKnowledge" => Some("Prior Knowledge"),
        "Knowledge" => Some("Knowledge"),
        "Skill" => Some("Skill"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concept_scoped_attributes() {
        assert_eq!(concept_scoped_attribute("PriorKnowledge"), Some("Prior Knowledge"));
        assert_eq!(concept_scoped_attribute("Engagement"), None);
    }

    #[test]
    fn unnamed_transition() {
        assert_eq!(StateTransition::default().name_or_empty(), "");
        assert_eq!(StateTransition::new("Escalate").name_or_empty(), "Escalate");
    }
}
