//! Rule catalogue, one module per node family
//!
//! Every rule returns at the first failure. Rules that need document-wide
//! context are methods on [`Validator`](crate::Validator); the rest are free
//! functions over a single value.

pub(crate) mod actions;
pub(crate) mod dependency;
pub(crate) mod inputs;
pub(crate) mod performance;
pub(crate) mod places;
pub(crate) mod refs;
pub(crate) mod strategy;
pub(crate) mod team;
pub(crate) mod transition;
pub(crate) mod triggers;

use crate::error::{RuleResult, ValidationFailure};

/// Fail with `reason` unless `condition` holds
#[inline]
pub(crate) fn ensure(condition: bool, reason: &str) -> RuleResult {
    if condition {
        Ok(())
    } else {
        Err(ValidationFailure::invalid(reason))
    }
}

/// Empty or whitespace only
#[inline]
pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Absent, empty or whitespace only
#[inline]
pub(crate) fn is_blank_opt(value: Option<&str>) -> bool {
    value.map_or(true, is_blank)
}

/// Non-blank and at least `min` characters long
#[inline]
pub(crate) fn has_min_len(value: &str, min: usize) -> bool {
    !is_blank(value) && value.chars().count() >= min
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_length_helpers() {
        assert!(is_blank("  "));
        assert!(is_blank_opt(None));
        assert!(!is_blank_opt(Some("x")));
        assert!(has_min_len("audio.mp3", 5));
        assert!(!has_min_len("a.mp", 5));
        assert!(!has_min_len("     ", 2));
        assert!(ensure(false, "nope").is_err());
    }
}
