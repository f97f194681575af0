//! Reference index
//!
//! Maps each place-of-interest and team/team-member name to the nodes that
//! reference it. Built by gathering over [`walk_node_references`] and kept
//! current by [`ReferenceIndex::rename_propagate`].

use crate::walk::{referrer_keys, walk_node_references, RefKind, RefSlot, ReferenceVisitor};
use dashmap::DashMap;
use scenario_model::{NodeKey, ScenarioDocument};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, trace};

/// One referrer of a name and how many of its fields hold that name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRecord {
    /// Node holding the reference
    pub referrer: NodeKey,
    /// Number of fields in that node naming the entity
    pub count: usize,
}

/// Name-to-referrers map for one [`RefKind`]
#[derive(Debug, Default)]
struct KindIndex {
    built: AtomicBool,
    entries: DashMap<String, Vec<ReferenceRecord>>,
}

impl KindIndex {
    fn is_built(&self) -> bool {
        self.built.load(Ordering::Acquire)
    }

    fn record(&self, name: &str, referrer: &NodeKey) {
        let mut records = self.entries.entry(name.to_string()).or_default();
        match records.iter_mut().find(|r| &r.referrer == referrer) {
            Some(record) => record.count += 1,
            None => records.push(ReferenceRecord {
                referrer: referrer.clone(),
                count: 1,
            }),
        }
    }
}

/// Reference index for places of interest and teams
///
/// Lookups take `&self`. Building and renaming need the document mutably
/// because the walk hands out mutable field slots.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    places: KindIndex,
    teams: KindIndex,
}

impl ReferenceIndex {
    /// Empty, unbuilt index
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn kind(&self, kind: RefKind) -> &KindIndex {
        match kind {
            RefKind::PlaceOfInterest => &self.places,
            RefKind::Team => &self.teams,
        }
    }

    /// Whether `kind` has been built at least once
    #[must_use]
    pub fn is_built(&self, kind: RefKind) -> bool {
        self.kind(kind).is_built()
    }

    /// Rebuild every kind
    pub fn rebuild_all(&self, doc: &mut ScenarioDocument) {
        for kind in RefKind::ALL {
            self.rebuild(kind, doc);
        }
    }

    /// Clear and rebuild one kind from the whole document
    ///
    /// Every existing entity name is seeded with an empty list so that an
    /// unreferenced entity reports `Some(vec![])` rather than `None`.
    pub fn rebuild(&self, kind: RefKind, doc: &mut ScenarioDocument) {
        let index = self.kind(kind);
        index.entries.clear();

        let names: Vec<String> = match kind {
            RefKind::PlaceOfInterest => doc
                .places_of_interest
                .iter()
                .map(|poi| poi.name().to_string())
                .collect(),
            RefKind::Team => doc.team_names().into_iter().map(str::to_string).collect(),
        };
        for name in names {
            index.entries.entry(name).or_default();
        }

        for key in referrer_keys(doc) {
            let mut gather = Gather {
                kind,
                index,
                referrer: &key,
            };
            walk_node_references(doc, &key, &mut gather);
        }
        index.built.store(true, Ordering::Release);

        debug!(
            kind = kind.label(),
            names = index.entries.len(),
            "rebuilt reference index"
        );
    }

    /// Record one more reference from `referrer` to `name`
    pub fn record_reference(&self, kind: RefKind, name: &str, referrer: &NodeKey) {
        self.kind(kind).record(name, referrer);
    }

    /// Referrers of `name`, or `None` if `kind` was never built
    #[must_use]
    pub fn lookup_referencers(&self, kind: RefKind, name: &str) -> Option<Vec<ReferenceRecord>> {
        let index = self.kind(kind);
        if !index.is_built() {
            return None;
        }
        trace!(kind = kind.label(), name, "reference lookup");
        Some(
            index
                .entries
                .get(name)
                .map(|records| records.value().clone())
                .unwrap_or_default(),
        )
    }

    /// Rewrite every reference to `old` so it names `new`
    ///
    /// A blank `new` clears single references and drops list entries. Only
    /// the referrers recorded under `old` are visited. Returns the referrers
    /// that changed, which the caller must mark dirty. The index for `kind`
    /// is rebuilt afterwards.
    pub fn rename_propagate(
        &self,
        doc: &mut ScenarioDocument,
        kind: RefKind,
        old: &str,
        new: &str,
    ) -> Vec<NodeKey> {
        if old.trim().is_empty() || old == new {
            return Vec::new();
        }
        let index = self.kind(kind);
        if !index.is_built() {
            self.rebuild(kind, doc);
        }

        let records = index
            .entries
            .remove(old)
            .map(|(_, records)| records)
            .unwrap_or_default();

        let mut dirty = Vec::with_capacity(records.len());
        for record in records {
            let mut rename = Rename {
                kind,
                old,
                new,
                changed: false,
            };
            if walk_node_references(doc, &record.referrer, &mut rename) && rename.changed {
                dirty.push(record.referrer);
            }
        }

        debug!(
            kind = kind.label(),
            old,
            new,
            referrers = dirty.len(),
            "propagated rename"
        );
        self.rebuild(kind, doc);
        dirty
    }

    /// Referrers of `name` that must be revalidated after it changed
    #[must_use]
    pub fn mark_referrers_dirty(&self, kind: RefKind, name: &str) -> Vec<NodeKey> {
        self.lookup_referencers(kind, name)
            .unwrap_or_default()
            .into_iter()
            .map(|record| record.referrer)
            .collect()
    }
}

struct Gather<'a> {
    kind: RefKind,
    index: &'a KindIndex,
    referrer: &'a NodeKey,
}

impl ReferenceVisitor for Gather<'_> {
    fn visit(&mut self, kind: RefKind, slot: RefSlot<'_>) {
        if kind != self.kind {
            return;
        }
        for name in slot.names(kind) {
            self.index.record(name, self.referrer);
        }
    }
}

struct Rename<'a> {
    kind: RefKind,
    old: &'a str,
    new: &'a str,
    changed: bool,
}

impl ReferenceVisitor for Rename<'_> {
    fn visit(&mut self, kind: RefKind, mut slot: RefSlot<'_>) {
        if kind == self.kind {
            self.changed |= slot.rename(kind, self.old, self.new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scenario_model::input::{AvoidLocationInput, PaceCountInput, TeamRefsInput};
    use scenario_model::{
        Concept, Condition, ConditionInput, Coordinate, NodeId, PlaceOfInterest, PointRef, Task,
        Team, TeamMember, TeamOrganization,
    };

    fn doc() -> ScenarioDocument {
        let avoid = ConditionInput::AvoidLocation(AvoidLocationInput {
            team_member_refs: vec!["Alpha".into()],
            point_refs: vec![PointRef::new("Hill"), PointRef::new("Hill")],
            ..AvoidLocationInput::default()
        });
        let radio = ConditionInput::UseRadio(TeamRefsInput {
            team_member_refs: vec!["Alpha".into(), "Bravo".into()],
        });
        let concept = Concept::new("Move", NodeId(2))
            .with_condition(Condition::new("domain.Avoid", avoid))
            .with_condition(Condition::new("domain.Radio", radio));
        ScenarioDocument {
            tasks: vec![Task::new("Patrol", NodeId(1)).with_concept(concept)],
            places_of_interest: vec![
                PlaceOfInterest::Point {
                    name: "Hill".into(),
                    coordinate: Some(Coordinate::gcc(0.0, 0.0, 0.0)),
                },
                PlaceOfInterest::Point {
                    name: "Ford".into(),
                    coordinate: None,
                },
            ],
            team_organization: Some(TeamOrganization::new(
                Team::new("Squad")
                    .with_member(TeamMember::with_marking("Alpha", "A1"))
                    .with_member(TeamMember::with_marking("Bravo", "B1")),
            )),
            ..ScenarioDocument::default()
        }
    }

    fn condition(index: usize) -> NodeKey {
        NodeKey::Condition {
            concept: NodeId(2),
            index,
        }
    }

    #[test]
    fn unbuilt_index_returns_none() {
        let index = ReferenceIndex::new();
        assert_eq!(index.lookup_referencers(RefKind::Team, "Alpha"), None);
        assert!(index.mark_referrers_dirty(RefKind::Team, "Alpha").is_empty());
    }

    #[test]
    fn rebuild_counts_and_seeds() {
        let mut doc = doc();
        let index = ReferenceIndex::new();
        index.rebuild_all(&mut doc);

        assert_eq!(
            index.lookup_referencers(RefKind::PlaceOfInterest, "Hill"),
            Some(vec![ReferenceRecord {
                referrer: condition(0),
                count: 2
            }])
        );
        assert_eq!(
            index.lookup_referencers(RefKind::PlaceOfInterest, "Ford"),
            Some(vec![])
        );
        assert_eq!(
            index.lookup_referencers(RefKind::PlaceOfInterest, "Nowhere"),
            Some(vec![])
        );
        let alpha: Vec<NodeKey> = index
            .lookup_referencers(RefKind::Team, "Alpha")
            .unwrap()
            .into_iter()
            .map(|r| r.referrer)
            .collect();
        assert_eq!(alpha, vec![condition(0), condition(1)]);
        assert_eq!(index.lookup_referencers(RefKind::Team, "Squad"), Some(vec![]));
    }

    #[test]
    fn rename_rewrites_only_referrers() {
        let mut doc = doc();
        let index = ReferenceIndex::new();
        index.rebuild_all(&mut doc);

        let dirty = index.rename_propagate(&mut doc, RefKind::Team, "Bravo", "Charlie");
        assert_eq!(dirty, vec![condition(1)]);
        match &doc.condition(NodeId(2), 1).unwrap().input {
            Some(ConditionInput::UseRadio(input)) => {
                assert_eq!(input.team_member_refs, vec!["Alpha", "Charlie"]);
            }
            other => panic!("unexpected input {other:?}"),
        }
        let charlie = index.lookup_referencers(RefKind::Team, "Charlie").unwrap();
        assert_eq!(charlie.len(), 1);
        assert_eq!(index.lookup_referencers(RefKind::Team, "Bravo"), Some(vec![]));
    }

    #[test]
    fn rename_is_noop_for_blank_or_same() {
        let mut doc = doc();
        let before = doc.clone();
        let index = ReferenceIndex::new();
        assert!(index.rename_propagate(&mut doc, RefKind::Team, "", "X").is_empty());
        assert!(index
            .rename_propagate(&mut doc, RefKind::Team, "Alpha", "Alpha")
            .is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn rename_is_idempotent() {
        let mut doc = doc();
        let index = ReferenceIndex::new();
        index.rebuild_all(&mut doc);
        index.rename_propagate(&mut doc, RefKind::PlaceOfInterest, "Hill", "Ridge");
        let once = doc.clone();
        let dirty = index.rename_propagate(&mut doc, RefKind::PlaceOfInterest, "Hill", "Ridge");
        assert!(dirty.is_empty());
        assert_eq!(doc, once);
    }

    #[test]
    fn blank_rename_deletes_references() {
        let mut doc = doc();
        let index = ReferenceIndex::new();
        index.rebuild_all(&mut doc);

        let dirty = index.rename_propagate(&mut doc, RefKind::PlaceOfInterest, "Hill", "");
        assert_eq!(dirty, vec![condition(0)]);
        match &doc.condition(NodeId(2), 0).unwrap().input {
            Some(ConditionInput::AvoidLocation(input)) => assert!(input.point_refs.is_empty()),
            other => panic!("unexpected input {other:?}"),
        }
    }

    #[test]
    fn optional_member_ref_is_cleared() {
        let mut doc = doc();
        let pace = ConditionInput::PaceCount(PaceCountInput {
            team_member_ref: Some("Alpha".into()),
            expected_distance: 100.0,
        });
        doc.tasks[0].concepts[0] = Concept::new("Move", NodeId(2))
            .with_condition(Condition::new("domain.Pace", pace));
        let index = ReferenceIndex::new();

        let dirty = index.rename_propagate(&mut doc, RefKind::Team, "Alpha", "");
        assert_eq!(dirty, vec![condition(0)]);
        match &doc.condition(NodeId(2), 0).unwrap().input {
            Some(ConditionInput::PaceCount(input)) => assert_eq!(input.team_member_ref, None),
            other => panic!("unexpected input {other:?}"),
        }
    }
}
