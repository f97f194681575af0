//! Team member reference checks shared by inputs, triggers and strategies

use crate::error::{RuleResult, ValidationFailure};
use crate::validator::Validator;

impl Validator<'_> {
    /// Every referenced team or member exists; the first missing name is
    /// reported
    pub(crate) fn check_members_exist(&self, refs: &[String]) -> RuleResult {
        refs.iter().try_for_each(|name| self.check_target_member(name))
    }

    /// A single referenced team or member exists
    pub(crate) fn check_member_exists(&self, name: &str) -> RuleResult {
        if self.doc.has_team_or_member(name) {
            Ok(())
        } else {
            Err(ValidationFailure::reference(format!(
                "{name} does not exist in the team organization."
            )))
        }
    }

    /// Target member of a trigger or adaptation exists
    pub(crate) fn check_target_member(&self, name: &str) -> RuleResult {
        if self.doc.has_team_or_member(name) {
            Ok(())
        } else {
            Err(ValidationFailure::reference(format!(
                "The member {name} does not exist in the team organization."
            )))
        }
    }

    /// At least one reference once the organization has members, all existing
    pub(crate) fn check_required_team_refs(&self, refs: &[String]) -> RuleResult {
        if refs.is_empty() && self.doc.any_member_name().is_some() {
            return Err(ValidationFailure::invalid("A team member must be specified."));
        }
        self.check_members_exist(refs)
    }

    /// Location-based inputs need either a member or a scenario start location
    pub(crate) fn check_learner_location(&self, has_member_ref: bool) -> RuleResult {
        if !has_member_ref && self.doc.learner_start_location_needed() {
            return Err(ValidationFailure::invalid(
                "No team member reference or learner start location has been provided.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::ValidityCache;
    use crate::error::FailureKind;
    use crate::validator::Validator;
    use pretty_assertions::assert_eq;
    use scenario_metadata::MetadataSnapshot;
    use scenario_model::{
        ScenarioDocument, Team, TeamMember, TeamOrganization, TrainingApplication,
    };

    fn doc() -> ScenarioDocument {
        let mut doc = ScenarioDocument::new();
        doc.team_organization = Some(TeamOrganization::new(
            Team::new("Platoon").with_member(TeamMember::with_marking("Lead", "lead")),
        ));
        doc
    }

    #[test]
    fn first_missing_member_is_reported() {
        let doc = doc();
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        let validator = Validator::new(&doc, &cache, &metadata);

        let refs = ["Ghost", "Lead", "Phantom", "Ghost"].map(String::from);
        let failure = validator.check_members_exist(&refs).unwrap_err();
        assert_eq!(failure.kind, FailureKind::ReferenceIntegrity);
        assert_eq!(
            failure.reason,
            "The member Ghost does not exist in the team organization."
        );
        assert!(validator.check_members_exist(&["Platoon".into()]).is_ok());
    }

    #[test]
    fn required_refs_only_once_members_exist() {
        let populated = doc();
        let empty = ScenarioDocument::new();
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();

        let failure = Validator::new(&populated, &cache, &metadata)
            .check_required_team_refs(&[])
            .unwrap_err();
        assert_eq!(failure.reason, "A team member must be specified.");
        assert!(Validator::new(&empty, &cache, &metadata)
            .check_required_team_refs(&[])
            .is_ok());
    }

    #[test]
    fn learner_location_needed_for_vbs() {
        let mut doc = ScenarioDocument::new();
        doc.training_application = Some(TrainingApplication::Vbs);
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        let validator = Validator::new(&doc, &cache, &metadata);
        assert!(validator.check_learner_location(false).is_err());
        assert!(validator.check_learner_location(true).is_ok());
    }
}
