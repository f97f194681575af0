//! Team organization
//!
//! Recursive tree of teams and team members. Every node is uniquely named
//! across the whole organization.

use crate::place::StartLocation;
use serde::{Deserialize, Serialize};

/// How a learner is identified in the training application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearnerId {
    /// Identified by where the learner starts
    StartLocation(StartLocation),
    /// Identified by the entity marking shown in the simulation
    EntityMarking(String),
}

/// Leaf of the team organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Unique name
    pub name: String,
    /// Learner identity, required for every member
    pub learner_id: Option<LearnerId>,
}

impl TeamMember {
    /// Member identified by an entity marking
    #[must_use]
    pub fn with_marking(name: impl Into<String>, marking: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            learner_id: Some(LearnerId::EntityMarking(marking.into())),
        }
    }
}

/// Child of a [`Team`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamUnit {
    /// Nested team
    Team(Team),
    /// Team member
    Member(TeamMember),
}

impl TeamUnit {
    /// Name of the unit
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Team(team) => &team.name,
            Self::Member(member) => &member.name,
        }
    }
}

/// Team node of the organization tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Team {
    /// Unique name
    pub name: String,
    /// Ordered child units
    #[serde(default)]
    pub units: Vec<TeamUnit>,
}

impl Team {
    /// Empty team
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: Vec::new(),
        }
    }

    /// Builder: append a member
    #[must_use]
    pub fn with_member(mut self, member: TeamMember) -> Self {
        self.units.push(TeamUnit::Member(member));
        self
    }

    /// Builder: append a sub-team
    #[must_use]
    pub fn with_team(mut self, team: Team) -> Self {
        self.units.push(TeamUnit::Team(team));
        self
    }

    /// Whether this team or any descendant is named `name`
    #[must_use]
    pub fn has_team_or_member(&self, name: &str) -> bool {
        self.name == name
            || self.units.iter().any(|unit| match unit {
                TeamUnit::Team(team) => team.has_team_or_member(name),
                TeamUnit::Member(member) => member.name == name,
            })
    }

    /// Depth-first list of all members
    #[must_use]
    pub fn members(&self) -> Vec<&TeamMember> {
        let mut out = Vec::new();
        self.collect_members(&mut out);
        out
    }

    fn collect_members<'a>(&'a self, out: &mut Vec<&'a TeamMember>) {
        for unit in &self.units {
            match unit {
                TeamUnit::Team(team) => team.collect_members(out),
                TeamUnit::Member(member) => out.push(member),
            }
        }
    }

    /// First member found depth-first
    #[must_use]
    pub fn any_member_name(&self) -> Option<&str> {
        self.units.iter().find_map(|unit| match unit {
            TeamUnit::Team(team) => team.any_member_name(),
            TeamUnit::Member(member) => Some(member.name.as_str()),
        })
    }

    /// Names of this team and all descendants, depth-first
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        for unit in &self.units {
            match unit {
                TeamUnit::Team(team) => out.extend(team.names()),
                TeamUnit::Member(member) => out.push(member.name.as_str()),
            }
        }
        out
    }

    /// Find a member by name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&TeamMember> {
        self.units.iter().find_map(|unit| match unit {
            TeamUnit::Team(team) => team.member(name),
            TeamUnit::Member(member) => (member.name == name).then_some(member),
        })
    }

    /// Find a team by name, including this one
    #[must_use]
    pub fn team(&self, name: &str) -> Option<&Team> {
        if self.name == name {
            return Some(self);
        }
        self.units.iter().find_map(|unit| match unit {
            TeamUnit::Team(team) => team.team(name),
            TeamUnit::Member(_) => None,
        })
    }

    /// Rename the team or member called `old`. Returns true on a hit.
    pub fn rename_unit(&mut self, old: &str, new: &str) -> bool {
        if self.name == old {
            self.name = new.to_string();
            return true;
        }
        self.units.iter_mut().any(|unit| match unit {
            TeamUnit::Team(team) => team.rename_unit(old, new),
            TeamUnit::Member(member) if member.name == old => {
                member.name = new.to_string();
                true
            }
            TeamUnit::Member(_) => false,
        })
    }

    /// Remove the descendant team or member called `name`
    pub fn remove_unit(&mut self, name: &str) -> Option<TeamUnit> {
        if let Some(pos) = self.units.iter().position(|unit| unit.name() == name) {
            return Some(self.units.remove(pos));
        }
        self.units.iter_mut().find_map(|unit| match unit {
            TeamUnit::Team(team) => team.remove_unit(name),
            TeamUnit::Member(_) => None,
        })
    }
}

/// Root of the team tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeamOrganization {
    /// Root team
    pub root: Option<Team>,
}

impl TeamOrganization {
    /// Organization rooted at `team`
    #[inline]
    #[must_use]
    pub fn new(team: Team) -> Self {
        Self { root: Some(team) }
    }
}
