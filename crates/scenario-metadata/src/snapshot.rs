//! Synchronous view of resolved metadata

use crate::source::AssessmentTypeMap;
use scenario_model::{Concept, ConceptChildren};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Already-resolved datasets consumed by the synchronous validator
///
/// A dataset that was never fetched is treated as permissive.
#[derive(Debug, Clone, Default)]
pub struct MetadataSnapshot {
    self_completing: Option<Arc<BTreeSet<String>>>,
    assessment_types: Option<Arc<AssessmentTypeMap>>,
}

impl MetadataSnapshot {
    /// Snapshot with nothing resolved
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the self-completing condition set
    #[must_use]
    pub fn with_self_completing(mut self, set: Arc<BTreeSet<String>>) -> Self {
        self.self_completing = Some(set);
        self
    }

    /// Builder: set the overall assessment type map
    #[must_use]
    pub fn with_assessment_types(mut self, map: Arc<AssessmentTypeMap>) -> Self {
        self.assessment_types = Some(map);
        self
    }

    /// Whether a condition implementation can complete on its own
    ///
    /// True when the set is unknown or empty.
    #[must_use]
    pub fn can_self_complete(&self, impl_name: &str) -> bool {
        match &self.self_completing {
            Some(set) if !set.is_empty() => set.contains(impl_name),
            _ => true,
        }
    }

    /// Whether every condition under `concept` can complete on its own
    #[must_use]
    pub fn concept_can_complete(&self, concept: &Concept) -> bool {
        match &concept.children {
            ConceptChildren::Conditions(conditions) => conditions
                .iter()
                .all(|condition| self.can_self_complete(&condition.condition_impl)),
            ConceptChildren::Concepts(concepts) => {
                concepts.iter().all(|child| self.concept_can_complete(child))
            }
        }
    }

    /// Overall assessment types of a condition implementation, if known
    #[must_use]
    pub fn assessment_types(&self, impl_name: &str) -> Option<&BTreeSet<String>> {
        self.assessment_types.as_ref()?.get(impl_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_model::{Condition, ConditionInput, NodeId};

    fn set(names: &[&str]) -> Arc<BTreeSet<String>> {
        Arc::new(names.iter().map(|n| (*n).to_string()).collect())
    }

    #[test]
    fn unknown_or_empty_set_is_permissive() {
        assert!(MetadataSnapshot::new().can_self_complete("domain.Anything"));
        let empty = MetadataSnapshot::new().with_self_completing(set(&[]));
        assert!(empty.can_self_complete("domain.Anything"));
    }

    #[test]
    fn nested_concepts_need_every_condition() {
        let snapshot = MetadataSnapshot::new().with_self_completing(set(&["domain.Timer"]));
        let timer = Condition::new("domain.Timer", ConditionInput::NoConditionInput);
        let radio = Condition::new("domain.Radio", ConditionInput::NoConditionInput);

        let good = Concept::new("Outer", NodeId(1))
            .with_child(Concept::new("Inner", NodeId(2)).with_condition(timer.clone()));
        assert!(snapshot.concept_can_complete(&good));

        let bad = Concept::new("Outer", NodeId(1)).with_child(
            Concept::new("Inner", NodeId(2))
                .with_condition(timer)
                .with_condition(radio),
        );
        assert!(!snapshot.concept_can_complete(&bad));
    }
}
