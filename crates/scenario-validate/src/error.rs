//! Validation outcomes and contract errors
//!
//! An authoring mistake is a [`ValidationFailure`] value: it is reported,
//! cached and fixed by editing the document. A caller bug (asking about a
//! node that does not exist) is a [`ContractViolation`] and comes back as the
//! `Err` side of [`Validator::validate`](crate::Validator::validate).

use scenario_model::NodeKey;
use std::fmt;

/// Category of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A local structural or range rule failed
    Invalid,
    /// A name resolves to nothing, or to the wrong kind of entity
    ReferenceIntegrity,
    /// One half of a required two-part configuration is missing
    DependencyPairing,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Invalid => "invalid",
            Self::ReferenceIntegrity => "reference integrity",
            Self::DependencyPairing => "dependency pairing",
        };
        f.write_str(label)
    }
}

/// User-facing reason a node is invalid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable reason
    pub reason: String,
}

impl ValidationFailure {
    /// Failure of the given kind
    #[must_use]
    pub fn new(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }

    /// Local rule failure
    #[inline]
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::Invalid, reason)
    }

    /// Unresolvable or mistyped reference
    #[inline]
    #[must_use]
    pub fn reference(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::ReferenceIntegrity, reason)
    }

    /// Missing half of a paired configuration
    #[inline]
    #[must_use]
    pub fn dependency(reason: impl Into<String>) -> Self {
        Self::new(FailureKind::DependencyPairing, reason)
    }

    /// Same kind, reason prefixed with `context`
    #[must_use]
    pub fn with_context(self, context: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            reason: format!("{context}{}", self.reason),
        }
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Outcome of a single rule
pub type RuleResult = Result<(), ValidationFailure>;

/// Programming error on the caller's side
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractViolation {
    /// The key does not address a node of the document
    #[error("no node addressed by '{0}'")]
    UnknownNode(NodeKey),

    /// A required name argument was blank
    #[error("the parameter '{0}' cannot be blank")]
    BlankArgument(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_model::NodeId;

    #[test]
    fn context_keeps_kind() {
        let failure = ValidationFailure::dependency("missing action").with_context("Concept A: ");
        assert_eq!(failure.kind, FailureKind::DependencyPairing);
        assert_eq!(failure.reason, "Concept A: missing action");
        assert_eq!(failure.to_string(), "Concept A: missing action");
    }

    #[test]
    fn contract_violation_messages() {
        let err = ContractViolation::UnknownNode(NodeKey::Task(NodeId(9)));
        assert_eq!(err.to_string(), "no node addressed by 'task#9'");
        assert_eq!(
            ContractViolation::BlankArgument("name").to_string(),
            "the parameter 'name' cannot be blank"
        );
    }
}
