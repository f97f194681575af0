//! Property tests for rename propagation

use proptest::prelude::*;
use scenario_model::input::{PaceCountInput, TeamRefsInput};
use scenario_model::{
    Concept, Condition, ConditionInput, NodeId, ScenarioDocument, Task, Team, TeamMember,
    TeamOrganization,
};
use scenario_refs::{RefKind, ReferenceIndex};

const POOL: [&str; 4] = ["Alpha", "Bravo", "Charlie", "Delta"];

/// One condition per entry; each entry lists indices into `POOL`
fn doc_from(refs: &[Vec<usize>], pace: Option<usize>) -> ScenarioDocument {
    let mut concept = Concept::new("Comms", NodeId(2));
    for names in refs {
        let input = ConditionInput::UseRadio(TeamRefsInput {
            team_member_refs: names.iter().map(|i| POOL[*i].to_string()).collect(),
        });
        concept = concept.with_condition(Condition::new("domain.Radio", input));
    }
    if let Some(i) = pace {
        let input = ConditionInput::PaceCount(PaceCountInput {
            team_member_ref: Some(POOL[i].to_string()),
            expected_distance: 50.0,
        });
        concept = concept.with_condition(Condition::new("domain.Pace", input));
    }
    let mut squad = Team::new("Squad");
    for name in POOL {
        squad = squad.with_member(TeamMember::with_marking(name, name));
    }
    ScenarioDocument {
        tasks: vec![Task::new("Patrol", NodeId(1)).with_concept(concept)],
        team_organization: Some(TeamOrganization::new(squad)),
        ..ScenarioDocument::default()
    }
}

fn refs_strategy() -> impl Strategy<Value = (Vec<Vec<usize>>, Option<usize>)> {
    (
        prop::collection::vec(prop::collection::vec(0..POOL.len(), 0..4), 0..6),
        prop::option::of(0..POOL.len()),
    )
}

proptest! {
    /// Renaming A to B then B to C matches renaming A to C directly
    #[test]
    fn rename_chain_converges((refs, pace) in refs_strategy()) {
        let mut chained = doc_from(&refs, pace);
        let chained_index = ReferenceIndex::new();
        chained_index.rebuild_all(&mut chained);
        chained_index.rename_propagate(&mut chained, RefKind::Team, "Alpha", "Interim");
        chained_index.rename_propagate(&mut chained, RefKind::Team, "Interim", "Echo");

        let mut direct = doc_from(&refs, pace);
        let direct_index = ReferenceIndex::new();
        direct_index.rebuild_all(&mut direct);
        direct_index.rename_propagate(&mut direct, RefKind::Team, "Alpha", "Echo");

        prop_assert_eq!(&chained, &direct);
        prop_assert_eq!(
            chained_index.lookup_referencers(RefKind::Team, "Echo"),
            direct_index.lookup_referencers(RefKind::Team, "Echo")
        );
    }

    /// After a rename nothing refers to the old name and every former
    /// referrer of it was reported dirty
    #[test]
    fn rename_leaves_no_stale_references((refs, pace) in refs_strategy()) {
        let mut doc = doc_from(&refs, pace);
        let index = ReferenceIndex::new();
        index.rebuild_all(&mut doc);
        let before: Vec<_> = index
            .lookup_referencers(RefKind::Team, "Bravo")
            .unwrap_or_default()
            .into_iter()
            .map(|record| record.referrer)
            .collect();

        let dirty = index.rename_propagate(&mut doc, RefKind::Team, "Bravo", "Foxtrot");

        prop_assert_eq!(dirty, before);
        prop_assert_eq!(index.lookup_referencers(RefKind::Team, "Bravo"), Some(vec![]));
    }

    /// Applying the same rename twice changes nothing the second time
    #[test]
    fn rename_is_idempotent((refs, pace) in refs_strategy()) {
        let mut doc = doc_from(&refs, pace);
        let index = ReferenceIndex::new();
        index.rebuild_all(&mut doc);
        index.rename_propagate(&mut doc, RefKind::Team, "Charlie", "Golf");
        let once = doc.clone();

        let dirty = index.rename_propagate(&mut doc, RefKind::Team, "Charlie", "Golf");
        prop_assert!(dirty.is_empty());
        prop_assert_eq!(doc, once);
    }
}
