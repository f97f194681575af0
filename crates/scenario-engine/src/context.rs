//! Per-session engine context
//!
//! [`EngineContext`] owns one scenario document together with everything
//! derived from it: the node id allocator, the reference index, the validity
//! cache and the metadata cache. Each editing session gets its own context.
//! Edits take `&mut self`; validation and lookups take `&self`.

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::report::ValidationReport;
use crate::session::SessionId;
use scenario_metadata::{
    AdaptationMap, AssessmentTypeMap, ConditionDescriptor, CourseSurvey, MetadataCache,
    MetadataSnapshot, MetadataSource,
};
use scenario_model::{
    Concept, Namespace, NodeId, NodeIdAllocator, NodeKey, ScenarioDocument, StateTransition,
    Strategy, Task, Team, TeamMember, TrainingApplication,
};
use scenario_refs::{RefKind, ReferenceIndex, ReferenceRecord};
use scenario_validate::{
    document_keys, ContractViolation, ValidationOutcome, Validator, Validity, ValidityCache,
    ValidityStats,
};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Engine state for one editing session
pub struct EngineContext {
    id: SessionId,
    config: EngineConfig,
    doc: ScenarioDocument,
    allocator: NodeIdAllocator,
    references: ReferenceIndex,
    validity: ValidityCache,
    metadata: MetadataCache,
    snapshot: MetadataSnapshot,
}

impl EngineContext {
    /// Open a session over `doc` with default configuration
    #[must_use]
    pub fn new(doc: ScenarioDocument, source: Arc<dyn MetadataSource>) -> Self {
        Self::with_config(doc, source, EngineConfig::default())
    }

    /// Open a session over `doc`
    #[must_use]
    pub fn with_config(
        doc: ScenarioDocument,
        source: Arc<dyn MetadataSource>,
        config: EngineConfig,
    ) -> Self {
        let metadata = match config.metadata_ttl() {
            Some(ttl) => MetadataCache::with_ttl(source, config.metadata_capacity, ttl),
            None => MetadataCache::new(source, config.metadata_capacity),
        };
        let mut context = Self {
            id: SessionId::new(),
            config,
            doc,
            allocator: NodeIdAllocator::new(),
            references: ReferenceIndex::new(),
            validity: ValidityCache::new(),
            metadata,
            snapshot: MetadataSnapshot::new(),
        };
        if context.config.rebuild_references_on_load {
            context.references.rebuild_all(&mut context.doc);
        }
        info!(session = %context.id, tasks = context.doc.tasks.len(), "session opened");
        context
    }

    /// Session id
    #[inline]
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The document being edited
    #[inline]
    #[must_use]
    pub fn document(&self) -> &ScenarioDocument {
        &self.doc
    }

    /// End the session and hand back the document
    #[must_use]
    pub fn close(self) -> ScenarioDocument {
        info!(session = %self.id, "session closed");
        self.doc
    }

    // ---- validation ----

    fn validator(&self) -> Validator<'_> {
        Validator::new(&self.doc, &self.validity, &self.snapshot)
            .with_weight_tolerance(self.config.weight_tolerance)
    }

    /// Validate one node, see [`Validator::validate`]
    ///
    /// # Errors
    /// [`ContractViolation`] when `key` does not address a node
    pub fn validate(&self, key: &NodeKey, validate_children: bool) -> ValidationOutcome {
        self.validator().validate(key, validate_children)
    }

    /// Validate every node, children before parents
    #[must_use]
    pub fn validate_document(&self) -> ValidationReport {
        let checked = document_keys(&self.doc).len();
        let failures = self.validator().validate_all();
        debug!(session = %self.id, checked, failures = failures.len(), "validated document");
        ValidationReport::new(self.id, checked, &failures)
    }

    /// Cached validity of a node
    #[must_use]
    pub fn validity(&self, key: &NodeKey) -> Validity {
        self.validity.get(key)
    }

    /// Validity cache statistics
    #[must_use]
    pub fn validity_stats(&self) -> ValidityStats {
        self.validity.stats()
    }

    /// Forget the cached validity of `key` and of everything that depends on it
    ///
    /// Conditions and inputs dirty their concept chain up to the task. Team,
    /// learner and place-of-interest collection keys feed rules all over the
    /// document and clear the whole cache.
    pub fn mark_dirty(&self, key: &NodeKey) {
        if key.is_document_wide() {
            debug!(%key, "document-wide change, clearing validity cache");
            self.validity.clear();
            return;
        }
        self.validity.mark_dirty(key);

        let concept = match key {
            NodeKey::Condition { concept, .. } => Some(*concept),
            NodeKey::ConditionInput { concept, .. } => {
                if let Some(condition) = key.owning_condition() {
                    self.validity.mark_dirty(&condition);
                }
                Some(*concept)
            }
            NodeKey::Concept(id) => {
                self.validity
                    .mark_all_dirty(&self.doc.ancestors_of(*id));
                None
            }
            NodeKey::PlaceOfInterest(_) => {
                self.validity.mark_dirty(&NodeKey::PlacesOfInterest);
                None
            }
            NodeKey::Scenario
            | NodeKey::Task(_)
            | NodeKey::Strategy(_)
            | NodeKey::StateTransition(_)
            | NodeKey::PlacesOfInterest
            | NodeKey::TeamOrganization
            | NodeKey::Team(_)
            | NodeKey::TeamMember(_)
            | NodeKey::LearnerId
            | NodeKey::LearnerActions
            | NodeKey::LearnerAction(_)
            | NodeKey::ScenarioEndTriggers => None,
        };
        if let Some(concept) = concept {
            self.validity.mark_dirty(&NodeKey::Concept(concept));
            self.validity
                .mark_all_dirty(&self.doc.ancestors_of(concept));
        }
    }

    /// Apply `f` to the document, then mark every `touched` node dirty
    pub fn edit<R>(&mut self, touched: &[NodeKey], f: impl FnOnce(&mut ScenarioDocument) -> R) -> R {
        let result = f(&mut self.doc);
        for key in touched {
            self.mark_dirty(key);
        }
        result
    }

    /// Swap in a new document, resetting every derived structure
    ///
    /// Returns the previous document.
    pub fn replace_document(&mut self, doc: ScenarioDocument) -> ScenarioDocument {
        let previous = std::mem::replace(&mut self.doc, doc);
        self.allocator.reset();
        self.validity.clear();
        self.references = ReferenceIndex::new();
        if self.config.rebuild_references_on_load {
            self.references.rebuild_all(&mut self.doc);
        }
        info!(session = %self.id, "document replaced");
        previous
    }

    // ---- references ----

    /// Rebuild the place-of-interest reference index
    pub fn rebuild_place_of_interest_references(&mut self) {
        self.references.rebuild(RefKind::PlaceOfInterest, &mut self.doc);
    }

    /// Rebuild the team reference index
    pub fn rebuild_team_references(&mut self) {
        self.references.rebuild(RefKind::Team, &mut self.doc);
    }

    /// Nodes referencing `name`, `None` if that index was never built
    #[must_use]
    pub fn referencers_of(&self, kind: RefKind, name: &str) -> Option<Vec<ReferenceRecord>> {
        self.references.lookup_referencers(kind, name)
    }

    fn mark_referrers_dirty(&self, referrers: &[NodeKey]) {
        for key in referrers {
            self.mark_dirty(key);
        }
    }

    /// Rename a place of interest and every reference to it
    ///
    /// Returns the referrers whose fields changed; they, their ancestors and
    /// the place itself are marked dirty. Nodes that already named `new`
    /// while it did not exist are marked dirty as well.
    ///
    /// # Errors
    /// - [`EngineError::Contract`] if either name is blank
    /// - [`EngineError::UnknownEntity`] if no place is called `old`
    /// - [`EngineError::NameTaken`] if another place is called `new`
    pub fn rename_place_of_interest(&mut self, old: &str, new: &str) -> EngineResult<Vec<NodeKey>> {
        require_name(old, "old")?;
        require_name(new, "new")?;
        if old == new {
            return Ok(Vec::new());
        }
        if self.doc.place_of_interest(new).is_some() {
            return Err(EngineError::name_taken(RefKind::PlaceOfInterest, new));
        }
        if self.doc.place_of_interest(old).is_none() {
            return Err(EngineError::unknown_entity(RefKind::PlaceOfInterest, old));
        }
        // edits since the last build may have added references to either name
        self.rebuild_place_of_interest_references();
        let dangling = self
            .references
            .mark_referrers_dirty(RefKind::PlaceOfInterest, new);

        let place = self
            .doc
            .place_of_interest_mut(old)
            .ok_or_else(|| EngineError::unknown_entity(RefKind::PlaceOfInterest, old))?;
        *place.name_mut() = new.to_string();

        let referrers =
            self.references
                .rename_propagate(&mut self.doc, RefKind::PlaceOfInterest, old, new);
        self.mark_dirty(&NodeKey::PlaceOfInterest(old.to_string()));
        self.mark_dirty(&NodeKey::PlaceOfInterest(new.to_string()));
        self.mark_referrers_dirty(&referrers);
        self.mark_referrers_dirty(&dangling);
        debug!(
            session = %self.id,
            old,
            new,
            referrers = referrers.len(),
            dangling = dangling.len(),
            "renamed place of interest"
        );
        Ok(referrers)
    }

    /// Rename a team or team member and every reference to it
    ///
    /// # Errors
    /// - [`EngineError::Contract`] if either name is blank
    /// - [`EngineError::UnknownEntity`] if no team or member is called `old`
    /// - [`EngineError::NameTaken`] if another team or member is called `new`
    pub fn rename_team(&mut self, old: &str, new: &str) -> EngineResult<Vec<NodeKey>> {
        require_name(old, "old")?;
        require_name(new, "new")?;
        if old == new {
            return Ok(Vec::new());
        }
        if self.doc.has_team_or_member(new) {
            return Err(EngineError::name_taken(RefKind::Team, new));
        }
        let renamed = self
            .doc
            .team_root_mut()
            .is_some_and(|root| root.rename_unit(old, new));
        if !renamed {
            return Err(EngineError::unknown_entity(RefKind::Team, old));
        }

        let referrers = self
            .references
            .rename_propagate(&mut self.doc, RefKind::Team, old, new);
        self.mark_dirty(&NodeKey::TeamOrganization);
        debug!(session = %self.id, old, new, referrers = referrers.len(), "renamed team");
        Ok(referrers)
    }

    /// Delete a place of interest and clear every reference to it
    ///
    /// Single references become empty and list entries are dropped.
    ///
    /// # Errors
    /// - [`EngineError::Contract`] if `name` is blank
    /// - [`EngineError::UnknownEntity`] if no place is called `name`
    pub fn remove_place_of_interest(&mut self, name: &str) -> EngineResult<Vec<NodeKey>> {
        require_name(name, "name")?;
        let position = self
            .doc
            .places_of_interest
            .iter()
            .position(|place| place.name() == name)
            .ok_or_else(|| EngineError::unknown_entity(RefKind::PlaceOfInterest, name))?;
        self.doc.places_of_interest.remove(position);

        let referrers =
            self.references
                .rename_propagate(&mut self.doc, RefKind::PlaceOfInterest, name, "");
        self.mark_dirty(&NodeKey::PlaceOfInterest(name.to_string()));
        self.mark_referrers_dirty(&referrers);
        debug!(session = %self.id, name, referrers = referrers.len(), "removed place of interest");
        Ok(referrers)
    }

    /// Delete a team or team member and clear every reference to it
    ///
    /// Removing the root team empties the organization.
    ///
    /// # Errors
    /// - [`EngineError::Contract`] if `name` is blank
    /// - [`EngineError::UnknownEntity`] if no team or member is called `name`
    pub fn remove_team(&mut self, name: &str) -> EngineResult<Vec<NodeKey>> {
        require_name(name, "name")?;
        let organization = self
            .doc
            .team_organization
            .as_mut()
            .ok_or_else(|| EngineError::unknown_entity(RefKind::Team, name))?;
        let is_root = organization
            .root
            .as_ref()
            .is_some_and(|root| root.name == name);
        let removed = if is_root {
            organization.root.take().is_some()
        } else {
            organization
                .root
                .as_mut()
                .and_then(|root| root.remove_unit(name))
                .is_some()
        };
        if !removed {
            return Err(EngineError::unknown_entity(RefKind::Team, name));
        }

        let referrers = self
            .references
            .rename_propagate(&mut self.doc, RefKind::Team, name, "");
        self.mark_dirty(&NodeKey::TeamOrganization);
        debug!(session = %self.id, name, referrers = referrers.len(), "removed team");
        Ok(referrers)
    }

    /// Mark the referrers of a place of interest dirty after one of its
    /// attributes (not its name) changed
    ///
    /// Builds the place-of-interest index first if needed. Returns the
    /// referrers that were marked.
    pub fn place_of_interest_changed(&mut self, name: &str) -> Vec<NodeKey> {
        if !self.references.is_built(RefKind::PlaceOfInterest) {
            self.rebuild_place_of_interest_references();
        }
        let referrers = self
            .references
            .mark_referrers_dirty(RefKind::PlaceOfInterest, name);
        self.mark_dirty(&NodeKey::PlaceOfInterest(name.to_string()));
        self.mark_referrers_dirty(&referrers);
        referrers
    }

    // ---- allocation ----

    /// Next unused Task/Concept node id
    #[must_use]
    pub fn allocate_node_id(&self) -> NodeId {
        self.allocator.next_node_id(&self.doc)
    }

    /// First `prefix`+counter name free in `namespace`
    #[must_use]
    pub fn allocate_unique_name(&self, namespace: Namespace, prefix: &str) -> String {
        self.allocator.unique_name(&self.doc, namespace, prefix)
    }

    /// Default task holding one default concept, not inserted
    #[must_use]
    pub fn generate_new_task(&self) -> Task {
        self.allocator.generate_new_task(&self.doc)
    }

    /// Default concept, not inserted
    #[must_use]
    pub fn generate_new_concept(&self) -> Concept {
        self.allocator.generate_new_concept(&self.doc)
    }

    /// Default strategy, not inserted
    #[must_use]
    pub fn generate_new_strategy(&self) -> Strategy {
        self.allocator.generate_new_strategy(&self.doc)
    }

    /// Default state transition, not inserted
    #[must_use]
    pub fn generate_new_state_transition(&self) -> StateTransition {
        self.allocator.generate_new_state_transition(&self.doc)
    }

    /// Default team, not inserted
    #[must_use]
    pub fn generate_new_team(&self) -> Team {
        self.allocator.generate_new_team(&self.doc)
    }

    /// Default team member, not inserted
    #[must_use]
    pub fn generate_new_team_member(&self) -> TeamMember {
        self.allocator.generate_new_team_member(&self.doc)
    }

    // ---- metadata ----

    /// The session's metadata cache
    #[inline]
    #[must_use]
    pub fn metadata(&self) -> &MetadataCache {
        &self.metadata
    }

    /// Metadata the validator currently sees
    #[inline]
    #[must_use]
    pub fn metadata_snapshot(&self) -> &MetadataSnapshot {
        &self.snapshot
    }

    /// Resolve the datasets validation depends on and drop stale results
    ///
    /// # Errors
    /// [`EngineError::Metadata`] if a dataset cannot be fetched; the previous
    /// snapshot is kept.
    pub async fn prefetch_metadata(&mut self) -> EngineResult<()> {
        self.snapshot = self.metadata.snapshot().await?;
        self.validity.clear();
        debug!(session = %self.id, "metadata snapshot refreshed");
        Ok(())
    }

    /// Descriptor of a condition implementation
    ///
    /// # Errors
    /// [`EngineError::Metadata`] if the fetch fails
    pub async fn condition_descriptor(&self, impl_name: &str) -> EngineResult<Arc<ConditionDescriptor>> {
        Ok(self.metadata.condition_descriptor(impl_name).await?)
    }

    /// Overall assessment types per condition
    ///
    /// # Errors
    /// [`EngineError::Metadata`] if the fetch fails
    pub async fn overall_assessment_types(&self) -> EngineResult<Arc<AssessmentTypeMap>> {
        Ok(self.metadata.overall_assessment_types().await?)
    }

    /// Adaptation types per training application
    ///
    /// # Errors
    /// [`EngineError::Metadata`] if the fetch fails
    pub async fn scenario_adaptations(&self) -> EngineResult<Arc<AdaptationMap>> {
        Ok(self.metadata.scenario_adaptations().await?)
    }

    /// Conditions that complete on their own
    ///
    /// # Errors
    /// [`EngineError::Metadata`] if the fetch fails
    pub async fn self_completing_conditions(&self) -> EngineResult<Arc<BTreeSet<String>>> {
        Ok(self.metadata.self_completing_conditions().await?)
    }

    /// Surveys of a survey context
    ///
    /// # Errors
    /// [`EngineError::Metadata`] if the fetch fails
    pub async fn course_surveys(&self, survey_context_id: &str) -> EngineResult<Arc<Vec<CourseSurvey>>> {
        Ok(self.metadata.course_surveys(survey_context_id).await?)
    }

    /// Conditions supported by a training application
    ///
    /// # Errors
    /// [`EngineError::Metadata`] if the fetch fails
    pub async fn conditions_for_application(
        &self,
        application: TrainingApplication,
    ) -> EngineResult<Arc<BTreeSet<String>>> {
        Ok(self.metadata.conditions_for_application(application).await?)
    }
}

impl fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineContext")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("validity", &self.validity.stats())
            .field("metadata", &self.metadata.stats())
            .finish_non_exhaustive()
    }
}

fn require_name(name: &str, parameter: &'static str) -> Result<(), ContractViolation> {
    if name.trim().is_empty() {
        Err(ContractViolation::BlankArgument(parameter))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scenario_test_utils::{permissive_mock, valid_document};

    fn context() -> EngineContext {
        EngineContext::new(valid_document(), Arc::new(permissive_mock()))
    }

    #[test]
    fn condition_dirt_reaches_the_task() {
        let ctx = context();
        assert!(ctx.validate_document().is_valid());
        let condition = NodeKey::Condition {
            concept: NodeId(2),
            index: 1,
        };
        assert_eq!(ctx.validity(&NodeKey::Task(NodeId(1))), Validity::Valid);

        ctx.mark_dirty(&condition);
        assert_eq!(ctx.validity(&condition), Validity::Unknown);
        assert_eq!(ctx.validity(&NodeKey::Concept(NodeId(2))), Validity::Unknown);
        assert_eq!(ctx.validity(&NodeKey::Task(NodeId(1))), Validity::Unknown);
        assert_eq!(ctx.validity(&NodeKey::Strategy("Hint".into())), Validity::Valid);
    }

    #[test]
    fn team_dirt_clears_everything() {
        let ctx = context();
        let _ = ctx.validate_document();
        assert!(ctx.validity_stats().valid > 0);

        ctx.mark_dirty(&NodeKey::TeamMember("Alpha".into()));
        assert_eq!(ctx.validity(&NodeKey::Strategy("Hint".into())), Validity::Unknown);
        assert_eq!(ctx.validity(&NodeKey::Task(NodeId(1))), Validity::Unknown);
    }

    #[test]
    fn blank_names_are_contract_violations() {
        let mut ctx = context();
        let err = ctx.rename_place_of_interest(" ", "Ford").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Contract(ContractViolation::BlankArgument("old"))
        ));
        assert!(matches!(
            ctx.remove_team("").unwrap_err(),
            EngineError::Contract(_)
        ));
    }

    #[test]
    fn rename_to_existing_name_is_refused() {
        let mut ctx = context();
        assert!(matches!(
            ctx.rename_place_of_interest("Route", "Zone").unwrap_err(),
            EngineError::NameTaken { .. }
        ));
        assert!(matches!(
            ctx.rename_team("Alpha", "Bravo").unwrap_err(),
            EngineError::NameTaken { .. }
        ));
        assert!(matches!(
            ctx.rename_team("Charlie", "Delta").unwrap_err(),
            EngineError::UnknownEntity { .. }
        ));
    }

    #[test]
    fn edit_marks_touched_nodes() {
        let mut ctx = context();
        let _ = ctx.validate_document();
        ctx.edit(&[NodeKey::Concept(NodeId(2))], |doc| {
            if let Some(concept) = doc.find_concept_mut(NodeId(2)) {
                concept.priority = Some(0);
            }
        });
        assert_eq!(ctx.validity(&NodeKey::Task(NodeId(1))), Validity::Unknown);
        let failure = ctx
            .validate(&NodeKey::Task(NodeId(1)), true)
            .unwrap()
            .unwrap();
        assert_eq!(
            failure.reason,
            "Concept Movement returned invalid from the cache: Concept priority is less than 1"
        );
    }

    #[test]
    fn replace_document_resets_state() {
        let mut ctx = context();
        assert_eq!(ctx.allocate_node_id(), NodeId(3));
        let _ = ctx.validate_document();

        let previous = ctx.replace_document(ScenarioDocument::new());
        assert_eq!(previous.tasks.len(), 1);
        assert_eq!(ctx.validity_stats(), ValidityStats::default());
        assert_eq!(ctx.allocate_node_id(), NodeId(1));
        assert_eq!(ctx.referencers_of(RefKind::Team, "Alpha"), Some(vec![]));
    }

    #[test]
    fn generated_nodes_use_free_names() {
        let ctx = context();
        assert_eq!(ctx.generate_new_strategy().name, "New Strategy 1");
        assert_eq!(
            ctx.allocate_unique_name(Namespace::PlaceOfInterest, "Zone"),
            "Zone1"
        );
        let task = ctx.generate_new_task();
        assert_eq!(task.name, "New Task 1");
        assert_eq!(task.concepts.len(), 1);
    }
}
