//! Recursive validator over a scenario document
//!
//! [`Validator`] borrows the document, the [`ValidityCache`] and a
//! [`MetadataSnapshot`] for the duration of one call. Parents never
//! re-derive a child's validity: they read the cache and only evaluate a child
//! whose state is `Unknown`, storing what they compute. A condition's input
//! is the exception and is re-evaluated every time its condition is.

use crate::cache::{Validity, ValidityCache};
use crate::error::{ContractViolation, RuleResult, ValidationFailure};
use crate::rules::is_blank;
use scenario_metadata::MetadataSnapshot;
use scenario_model::{NodeKey, PerformanceNode, ScenarioDocument, TeamUnit};
use tracing::debug;

/// Default half-width of the window around 1.0 that rollup weights must hit
pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 0.001;

/// Result of validating one node
pub type ValidationOutcome = Result<Option<ValidationFailure>, ContractViolation>;

/// Validator bound to one document state
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    pub(crate) doc: &'a ScenarioDocument,
    cache: &'a ValidityCache,
    pub(crate) metadata: &'a MetadataSnapshot,
    weight_tolerance: f64,
}

impl<'a> Validator<'a> {
    /// Validator over `doc`, storing results in `cache`
    #[must_use]
    pub fn new(
        doc: &'a ScenarioDocument,
        cache: &'a ValidityCache,
        metadata: &'a MetadataSnapshot,
    ) -> Self {
        Self {
            doc,
            cache,
            metadata,
            weight_tolerance: DEFAULT_WEIGHT_TOLERANCE,
        }
    }

    /// Builder: set the rollup weight tolerance
    #[must_use]
    pub fn with_weight_tolerance(mut self, tolerance: f64) -> Self {
        self.weight_tolerance = tolerance.abs();
        self
    }

    /// Validate the node addressed by `key`
    ///
    /// Returns `Ok(None)` when the node passes, `Ok(Some(failure))` with the
    /// first failing rule otherwise. With `validate_children` the outcome is
    /// stored in the cache and children are consulted through it; without,
    /// only the node's own fields are checked and nothing is stored.
    ///
    /// # Errors
    ///
    /// [`ContractViolation`] when `key` does not address a node or carries a
    /// blank name.
    pub fn validate(&self, key: &NodeKey, validate_children: bool) -> ValidationOutcome {
        let outcome = self.evaluate(key, validate_children)?.err();
        if validate_children {
            self.cache.store(key.clone(), outcome.as_ref());
        }
        if let Some(failure) = &outcome {
            debug!(%key, kind = %failure.kind, reason = %failure.reason, "node invalid");
        }
        Ok(outcome)
    }

    /// Validate every node, children before parents, and collect the failures
    #[must_use]
    pub fn validate_all(&self) -> Vec<(NodeKey, ValidationFailure)> {
        document_keys(self.doc)
            .into_iter()
            .filter_map(|key| match self.validate(&key, true) {
                Ok(Some(failure)) => Some((key, failure)),
                Ok(None) | Err(_) => None,
            })
            .collect()
    }

    /// Child validity as seen through the cache, computing it when unknown
    pub(crate) fn cached(&self, key: &NodeKey) -> RuleResult {
        match self.cache.get(key) {
            Validity::Valid => Ok(()),
            Validity::Invalid(failure) => Err(failure),
            Validity::Unknown => self.forced(key),
        }
    }

    /// Child validity recomputed regardless of the cache
    pub(crate) fn forced(&self, key: &NodeKey) -> RuleResult {
        match self.validate(key, true) {
            Ok(None) => Ok(()),
            Ok(Some(failure)) => Err(failure),
            Err(violation) => Err(ValidationFailure::invalid(violation.to_string())),
        }
    }

    /// Check that sibling weights sum to 1.0 when any of them defines one
    pub(crate) fn check_weights(
        &self,
        weights: impl IntoIterator<Item = Option<f64>>,
        reason: &str,
    ) -> RuleResult {
        let (defined, total) = weights
            .into_iter()
            .fold((false, 0.0_f64), |(defined, total), weight| match weight {
                Some(weight) => (true, total + weight),
                None => (defined, total),
            });
        let low = 1.0 - self.weight_tolerance;
        let high = 1.0 + self.weight_tolerance;
        if defined && !(low..=high).contains(&total) {
            return Err(ValidationFailure::invalid(reason));
        }
        Ok(())
    }

    fn evaluate(&self, key: &NodeKey, validate_children: bool) -> Result<RuleResult, ContractViolation> {
        let unknown = || ContractViolation::UnknownNode(key.clone());
        let result = match key {
            NodeKey::Scenario => Ok(()),
            NodeKey::Task(id) => {
                let task = self.doc.find_task(*id).ok_or_else(unknown)?;
                self.check_task(task, validate_children)
            }
            NodeKey::Concept(id) => {
                let concept = self.doc.find_concept(*id).ok_or_else(unknown)?;
                self.check_concept(concept, validate_children)
            }
            NodeKey::Condition { concept, index } => {
                let condition = self.doc.condition(*concept, *index).ok_or_else(unknown)?;
                self.check_condition(*concept, *index, condition)
            }
            NodeKey::ConditionInput { concept, index } => {
                let input = self
                    .doc
                    .condition(*concept, *index)
                    .and_then(|condition| condition.input.as_ref())
                    .ok_or_else(unknown)?;
                self.check_input(input)
            }
            NodeKey::Strategy(name) => {
                require_name(name)?;
                let strategy = self.doc.strategy(name).ok_or_else(unknown)?;
                self.check_strategy(strategy)
            }
            NodeKey::StateTransition(name) => {
                let transition = self
                    .doc
                    .state_transitions
                    .iter()
                    .find(|transition| transition.name_or_empty() == name)
                    .ok_or_else(unknown)?;
                self.check_state_transition(transition)
            }
            NodeKey::PlacesOfInterest => self.check_places_of_interest(),
            NodeKey::PlaceOfInterest(name) => {
                require_name(name)?;
                let place = self.doc.place_of_interest(name).ok_or_else(unknown)?;
                crate::rules::places::check_place_of_interest(place)
            }
            NodeKey::TeamOrganization => {
                let organization = self.doc.team_organization.as_ref().ok_or_else(unknown)?;
                crate::rules::team::check_team_organization(organization)
            }
            NodeKey::Team(name) => {
                require_name(name)?;
                let team = self.doc.team(name).ok_or_else(unknown)?;
                crate::rules::team::check_team(team)
            }
            NodeKey::TeamMember(name) => {
                require_name(name)?;
                let member = self.doc.team_member(name).ok_or_else(unknown)?;
                crate::rules::team::check_team_member(member)
            }
            NodeKey::LearnerId => {
                let learner_id = self.doc.learner_id.as_ref().ok_or_else(unknown)?;
                crate::rules::team::check_learner_id(learner_id)
            }
            NodeKey::LearnerActions => self.check_available_learner_actions(),
            NodeKey::LearnerAction(name) => {
                require_name(name)?;
                let action = self.doc.learner_action(name).ok_or_else(unknown)?;
                self.check_learner_action(action)
            }
            NodeKey::ScenarioEndTriggers => self.check_scenario_end_triggers(),
        };
        Ok(result)
    }
}

fn require_name(name: &str) -> Result<(), ContractViolation> {
    if is_blank(name) {
        Err(ContractViolation::BlankArgument("name"))
    } else {
        Ok(())
    }
}

/// Every validatable key of `doc`, children before their parents
#[must_use]
pub fn document_keys(doc: &ScenarioDocument) -> Vec<NodeKey> {
    let mut keys = Vec::new();

    let nodes = doc.performance_nodes();
    for node in nodes.iter().rev() {
        if let PerformanceNode::Concept(concept) = node {
            for (index, condition) in concept.conditions().iter().enumerate() {
                if condition.input.is_some() {
                    keys.push(NodeKey::ConditionInput {
                        concept: concept.node_id,
                        index,
                    });
                }
                keys.push(NodeKey::Condition {
                    concept: concept.node_id,
                    index,
                });
            }
        }
        keys.push(node.key());
    }

    keys.extend(
        doc.strategies
            .iter()
            .filter(|strategy| !is_blank(&strategy.name))
            .map(|strategy| NodeKey::Strategy(strategy.name.clone())),
    );
    keys.extend(
        doc.state_transitions
            .iter()
            .map(|transition| NodeKey::StateTransition(transition.name_or_empty().to_string())),
    );
    keys.extend(
        doc.places_of_interest
            .iter()
            .filter(|place| !is_blank(place.name()))
            .map(|place| NodeKey::PlaceOfInterest(place.name().to_string())),
    );
    keys.push(NodeKey::PlacesOfInterest);

    if let Some(organization) = &doc.team_organization {
        if let Some(root) = &organization.root {
            collect_team_keys(root, &mut keys);
        }
        keys.push(NodeKey::TeamOrganization);
    }
    if doc.learner_id.is_some() {
        keys.push(NodeKey::LearnerId);
    }

    keys.extend(
        doc.learner_actions
            .list()
            .iter()
            .filter(|action| !is_blank(&action.display_name))
            .map(|action| NodeKey::LearnerAction(action.display_name.clone())),
    );
    keys.push(NodeKey::LearnerActions);
    keys.push(NodeKey::ScenarioEndTriggers);
    keys
}

fn collect_team_keys(team: &scenario_model::Team, keys: &mut Vec<NodeKey>) {
    for unit in &team.units {
        match unit {
            TeamUnit::Team(child) => collect_team_keys(child, keys),
            TeamUnit::Member(member) if !is_blank(&member.name) => {
                keys.push(NodeKey::TeamMember(member.name.clone()));
            }
            TeamUnit::Member(_) => {}
        }
    }
    if !is_blank(&team.name) {
        keys.push(NodeKey::Team(team.name.clone()));
    }
}
