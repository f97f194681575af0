//! Team organization rules

use super::{ensure, is_blank};
use crate::error::{RuleResult, ValidationFailure};
use crate::rules::places::check_start_location;
use scenario_model::{LearnerId, Team, TeamMember, TeamOrganization, TeamUnit};

pub(crate) fn check_team_organization(organization: &TeamOrganization) -> RuleResult {
    let root = organization
        .root
        .as_ref()
        .ok_or_else(|| ValidationFailure::invalid("The root team is null"))?;
    ensure(
        root.any_member_name().is_some(),
        "The root team does not contain any team member",
    )?;
    check_team(root)
}

pub(crate) fn check_team(team: &Team) -> RuleResult {
    ensure(!is_blank(&team.name), "Team's name is null")?;
    team.units.iter().try_for_each(|unit| match unit {
        TeamUnit::Team(child) => check_team(child),
        TeamUnit::Member(member) => check_team_member(member),
    })
}

pub(crate) fn check_team_member(member: &TeamMember) -> RuleResult {
    ensure(!is_blank(&member.name), "Team member's name is null")?;
    let learner_id = member
        .learner_id
        .as_ref()
        .ok_or_else(|| ValidationFailure::invalid("Team member's learner ID is null"))?;
    check_learner_id(learner_id)
}

pub(crate) fn check_learner_id(learner_id: &LearnerId) -> RuleResult {
    match learner_id {
        LearnerId::StartLocation(start) => check_start_location(start),
        LearnerId::EntityMarking(marking) => {
            ensure(!is_blank(marking), "Learner Id entity marking is missing")
        }
    }
}
