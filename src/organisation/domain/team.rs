//! Team aggregate and its membership rules.

use super::{OrganisationDomainError, ProjectId, TeamId};
use crate::identifier::bounded_text;
use crate::worker::domain::{Requester, WorkerId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Validated team name, 1 to 200 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamName(String);

impl TeamName {
    /// Creates a validated team name.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationDomainError::EmptyTeamName`] or
    /// [`OrganisationDomainError::TeamNameTooLong`].
    pub fn new(value: &str) -> Result<Self, OrganisationDomainError> {
        bounded_text(
            value,
            200,
            || OrganisationDomainError::EmptyTeamName,
            OrganisationDomainError::TeamNameTooLong,
        )
        .map(Self)
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated input for creating or editing a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDraft {
    /// Team name.
    pub name: TeamName,
    /// Owning project, if any.
    pub project: Option<ProjectId>,
    /// Member set.
    pub members: BTreeSet<WorkerId>,
}

impl TeamDraft {
    /// Validates raw form input.
    ///
    /// # Errors
    ///
    /// Returns the name validation error.
    pub fn new(
        name: &str,
        project: Option<ProjectId>,
        members: impl IntoIterator<Item = WorkerId>,
    ) -> Result<Self, OrganisationDomainError> {
        Ok(Self {
            name: TeamName::new(name)?,
            project,
            members: members.into_iter().collect(),
        })
    }
}

/// A group of workers, optionally attached to a project.
///
/// A worker may belong to any number of teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    id: TeamId,
    name: TeamName,
    project: Option<ProjectId>,
    members: BTreeSet<WorkerId>,
    created_by: Option<WorkerId>,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTeamData {
    /// Persisted identifier.
    pub id: TeamId,
    /// Persisted name.
    pub name: TeamName,
    /// Persisted project reference.
    pub project: Option<ProjectId>,
    /// Persisted members.
    pub members: BTreeSet<WorkerId>,
    /// Persisted creator.
    pub created_by: Option<WorkerId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Creates a team owned by `creator`.
    #[must_use]
    pub fn new(draft: TeamDraft, creator: WorkerId, clock: &impl Clock) -> Self {
        Self {
            id: TeamId::new(),
            name: draft.name,
            project: draft.project,
            members: draft.members,
            created_by: Some(creator),
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a team from storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTeamData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            project: data.project,
            members: data.members,
            created_by: data.created_by,
            created_at: data.created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> TeamId {
        self.id
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &TeamName {
        &self.name
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project(&self) -> Option<ProjectId> {
        self.project
    }

    /// Returns the members.
    #[must_use]
    pub const fn members(&self) -> &BTreeSet<WorkerId> {
        &self.members
    }

    /// Returns the creator, when known.
    #[must_use]
    pub const fn created_by(&self) -> Option<WorkerId> {
        self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns `true` when `worker` is a member.
    #[must_use]
    pub fn has_member(&self, worker: WorkerId) -> bool {
        self.members.contains(&worker)
    }

    /// Returns `true` when the requester may edit the team or its
    /// membership: its creator, a member, or staff.
    #[must_use]
    pub fn can_be_managed_by(&self, requester: &Requester) -> bool {
        requester.is_staff()
            || self.created_by == Some(requester.worker_id())
            || self.has_member(requester.worker_id())
    }

    /// Applies edited fields.
    pub fn apply(&mut self, draft: TeamDraft) {
        self.name = draft.name;
        self.project = draft.project;
        self.members = draft.members;
    }

    /// Adds a member; returns `false` when already present.
    pub fn add_member(&mut self, worker: WorkerId) -> bool {
        self.members.insert(worker)
    }

    /// Removes a member; returns `false` when absent.
    pub fn remove_member(&mut self, worker: WorkerId) -> bool {
        self.members.remove(&worker)
    }

    /// Attaches the team to a project or detaches it.
    pub const fn set_project(&mut self, project: Option<ProjectId>) {
        self.project = project;
    }
}
