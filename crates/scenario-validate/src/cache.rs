//! Per-node validity cache
//!
//! Each node is `Unknown` until validated with its children, then `Valid` or
//! `Invalid`. A dirty notification moves it back to `Unknown`.

use crate::error::ValidationFailure;
use dashmap::DashMap;
use scenario_model::NodeKey;
use tracing::trace;

/// Cached validation state of one node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Validity {
    /// Not validated since the last change
    #[default]
    Unknown,
    /// Passed every rule
    Valid,
    /// Failed with the recorded reason
    Invalid(ValidationFailure),
}

impl Validity {
    /// State for a validation outcome
    #[must_use]
    pub fn from_outcome(outcome: Option<&ValidationFailure>) -> Self {
        outcome.map_or(Self::Valid, |failure| Self::Invalid(failure.clone()))
    }

    /// Whether the state is known
    #[inline]
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidityStats {
    /// Nodes known to be valid
    pub valid: usize,
    /// Nodes known to be invalid
    pub invalid: usize,
}

/// Concurrent map from node key to validity
#[derive(Debug, Default)]
pub struct ValidityCache {
    entries: DashMap<NodeKey, Validity>,
}

impl ValidityCache {
    /// Empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a node; `Unknown` when never stored
    #[must_use]
    pub fn get(&self, key: &NodeKey) -> Validity {
        self.entries
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Record a validation outcome
    pub fn store(&self, key: NodeKey, outcome: Option<&ValidationFailure>) {
        trace!(%key, valid = outcome.is_none(), "validity stored");
        self.entries.insert(key, Validity::from_outcome(outcome));
    }

    /// Move a node back to `Unknown`
    pub fn mark_dirty(&self, key: &NodeKey) {
        if self.entries.remove(key).is_some() {
            trace!(%key, "validity dirtied");
        }
    }

    /// Move many nodes back to `Unknown`
    pub fn mark_all_dirty<'a>(&self, keys: impl IntoIterator<Item = &'a NodeKey>) {
        for key in keys {
            self.mark_dirty(key);
        }
    }

    /// Forget every stored result
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of known nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Valid/invalid counts
    #[must_use]
    pub fn stats(&self) -> ValidityStats {
        self.entries
            .iter()
            .fold(ValidityStats::default(), |mut stats, entry| {
                match entry.value() {
                    Validity::Valid => stats.valid += 1,
                    Validity::Invalid(_) => stats.invalid += 1,
                    Validity::Unknown => {}
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_model::NodeId;

    #[test]
    fn unknown_until_stored() {
        let cache = ValidityCache::new();
        let key = NodeKey::Concept(NodeId(3));
        assert_eq!(cache.get(&key), Validity::Unknown);

        cache.store(key.clone(), None);
        assert_eq!(cache.get(&key), Validity::Valid);

        let failure = ValidationFailure::invalid("Concept is missing a name");
        cache.store(key.clone(), Some(&failure));
        assert_eq!(cache.get(&key), Validity::Invalid(failure));
    }

    #[test]
    fn dirty_returns_to_unknown() {
        let cache = ValidityCache::new();
        let a = NodeKey::Task(NodeId(1));
        let b = NodeKey::Strategy("Hint".into());
        cache.store(a.clone(), None);
        cache.store(b.clone(), Some(&ValidationFailure::invalid("x")));
        assert_eq!(cache.stats(), ValidityStats { valid: 1, invalid: 1 });

        cache.mark_all_dirty([&a]);
        assert!(!cache.get(&a).is_known());
        assert!(cache.get(&b).is_known());

        cache.clear();
        assert!(cache.is_empty());
    }
}
