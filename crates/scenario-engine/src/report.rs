//! Whole-document validation report

use crate::session::SessionId;
use scenario_model::NodeKey;
use scenario_validate::{FailureKind, ValidationFailure};
use serde::Serialize;
use std::fmt;

/// One invalid node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// Address of the node
    pub node: String,
    /// Failure category
    pub kind: String,
    /// Reason shown to the author
    pub reason: String,
}

impl ReportEntry {
    fn new(key: &NodeKey, failure: &ValidationFailure) -> Self {
        Self {
            node: key.to_string(),
            kind: failure.kind.to_string(),
            reason: failure.reason.clone(),
        }
    }
}

/// Every invalid node of a document, children before parents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Session that produced the report
    pub session: SessionId,
    /// Number of nodes validated
    pub checked: usize,
    /// Invalid nodes
    pub failures: Vec<ReportEntry>,
}

impl ValidationReport {
    pub(crate) fn new(
        session: SessionId,
        checked: usize,
        failures: &[(NodeKey, ValidationFailure)],
    ) -> Self {
        Self {
            session,
            checked,
            failures: failures
                .iter()
                .map(|(key, failure)| ReportEntry::new(key, failure))
                .collect(),
        }
    }

    /// Whether no node failed
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures of one kind
    pub fn of_kind(&self, kind: FailureKind) -> impl Iterator<Item = &ReportEntry> {
        let label = kind.to_string();
        self.failures.iter().filter(move |entry| entry.kind == label)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Report ({})", self.session)?;
        writeln!(f, "  Nodes checked: {}", self.checked)?;
        writeln!(f, "  Invalid nodes: {}", self.failures.len())?;
        for entry in &self.failures {
            writeln!(f, "  - {} [{}]: {}", entry.node, entry.kind, entry.reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_model::NodeId;

    #[test]
    fn text_lists_each_failure() {
        let failures = vec![(
            NodeKey::Task(NodeId(1)),
            ValidationFailure::invalid("Task must have at least 1 end trigger"),
        )];
        let report = ValidationReport::new(SessionId::new(), 4, &failures);
        assert!(!report.is_valid());
        let text = report.to_string();
        assert!(text.contains("Nodes checked: 4"));
        assert!(text.contains("- task#1 [invalid]: Task must have at least 1 end trigger"));
        assert_eq!(report.of_kind(FailureKind::Invalid).count(), 1);
        assert_eq!(report.of_kind(FailureKind::DependencyPairing).count(), 0);
    }
}
