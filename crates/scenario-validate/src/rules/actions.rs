//! Learner action rules

use super::{ensure, has_min_len, is_blank};
use crate::error::{RuleResult, ValidationFailure};
use crate::rules::strategy::check_auto_tutor_sko;
use crate::validator::Validator;
use scenario_model::{LearnerAction, LearnerActionParams, LearnerActionType, TutorMeConfiguration};

impl Validator<'_> {
    pub(crate) fn check_available_learner_actions(&self) -> RuleResult {
        let available = &self.doc.learner_actions;
        for file in &available.files {
            ensure(has_min_len(file, 5), "File must be at least 5 characters")?;
        }
        let Some(actions) = &available.actions else {
            return Ok(());
        };
        self.check_pace_count_dependency(true)?;
        self.check_avoid_location_dependency(true)?;
        actions
            .iter()
            .try_for_each(|action| self.check_learner_action(action))
    }

    pub(crate) fn check_learner_action(&self, action: &LearnerAction) -> RuleResult {
        let action_type = action
            .action_type
            .ok_or_else(|| ValidationFailure::invalid("Learner action type is null"))?;
        ensure(
            !is_blank(&action.display_name),
            "Learner action is missing a display name",
        )?;
        if let Some(description) = &action.description {
            ensure(
                !is_blank(description),
                "Description must have at least 1 character",
            )?;
        }

        match (action_type, &action.params) {
            (LearnerActionType::TutorMe, params) => {
                let configuration = match params {
                    Some(LearnerActionParams::TutorMe {
                        configuration: Some(configuration),
                    }) => configuration,
                    _ => {
                        return Err(ValidationFailure::invalid(
                            "Configuration is null or unknown",
                        ))
                    }
                };
                match configuration {
                    TutorMeConfiguration::TreeFile { name } => ensure(
                        has_min_len(name, 18),
                        "Tree file name must be at least 18 characters",
                    ),
                    TutorMeConfiguration::AutoTutor(sko) => check_auto_tutor_sko(sko),
                }
            }
            (_, Some(LearnerActionParams::StrategyReference(name))) => {
                if is_blank(name) {
                    return Err(ValidationFailure::invalid(format!(
                        "Malformed strategy reference name: '{name}'"
                    )));
                }
                if self.doc.strategy(name).is_none() {
                    return Err(ValidationFailure::reference(format!(
                        "The strategy '{name}' is not an existing strategy."
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
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
        LearnerAction, LearnerActionParams, LearnerActionType, ScenarioDocument,
        TutorMeConfiguration,
    };

    fn check(doc: &ScenarioDocument, action: &LearnerAction) -> Option<(FailureKind, String)> {
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        Validator::new(doc, &cache, &metadata)
            .check_learner_action(action)
            .err()
            .map(|failure| (failure.kind, failure.reason))
    }

    #[test]
    fn tutor_me_needs_configuration() {
        let doc = ScenarioDocument::new();
        let mut action = LearnerAction::new(LearnerActionType::TutorMe, "Tutor");
        assert_eq!(
            check(&doc, &action).map(|(_, reason)| reason).as_deref(),
            Some("Configuration is null or unknown")
        );
        action.params = Some(LearnerActionParams::TutorMe {
            configuration: Some(TutorMeConfiguration::TreeFile {
                name: "short.xml".into(),
            }),
        });
        assert_eq!(
            check(&doc, &action).map(|(_, reason)| reason).as_deref(),
            Some("Tree file name must be at least 18 characters")
        );
    }

    #[test]
    fn strategy_reference_must_exist() {
        let doc = ScenarioDocument::new();
        let mut action = LearnerAction::new(LearnerActionType::ApplyStrategy, "Ask for help");
        action.params = Some(LearnerActionParams::StrategyReference("Hint".into()));
        assert_eq!(
            check(&doc, &action),
            Some((
                FailureKind::ReferenceIntegrity,
                "The strategy 'Hint' is not an existing strategy.".to_string()
            ))
        );
    }

    #[test]
    fn blank_description_rejected() {
        let doc = ScenarioDocument::new();
        let mut action = LearnerAction::new(LearnerActionType::Radio, "Radio");
        action.description = Some(String::new());
        assert_eq!(
            check(&doc, &action).map(|(_, reason)| reason).as_deref(),
            Some("Description must have at least 1 character")
        );
    }

    #[test]
    fn short_file_names_rejected() {
        let mut doc = ScenarioDocument::new();
        doc.learner_actions.files.push("a.xm".into());
        let cache = ValidityCache::new();
        let metadata = MetadataSnapshot::new();
        let failure = Validator::new(&doc, &cache, &metadata)
            .check_available_learner_actions()
            .unwrap_err();
        assert_eq!(failure.reason, "File must be at least 5 characters");
    }
}
