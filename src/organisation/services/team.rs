//! Team lifecycle and membership.

use super::{OrganisationError, OrganisationResult};
use crate::organisation::{
    domain::{Team, TeamDraft, TeamId},
    ports::TeamRepository,
};
use crate::worker::domain::{AccessDenied, Requester, WorkerId};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Creates teams and manages their membership.
///
/// Editing, deleting and changing the members of a team is reserved for
/// its creator, its members and staff.
pub struct TeamService<R, C>
where
    R: TeamRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TeamService<R, C>
where
    R: TeamRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TeamService<R, C>
where
    R: TeamRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new team service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a team owned by the requester.
    ///
    /// # Errors
    ///
    /// Returns repository errors for unknown projects or members.
    pub async fn create(&self, requester: &Requester, draft: TeamDraft) -> OrganisationResult<Team> {
        let team = Team::new(draft, requester.worker_id(), &*self.clock);
        self.repository.store_team(&team).await?;
        info!(team_id = %team.id(), actor = %requester.worker_id(), "team created");
        Ok(team)
    }

    /// Replaces a team's name, project and members.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::TeamNotFound`] when absent and
    /// [`OrganisationError::AccessDenied`] unless the requester may manage
    /// the team.
    pub async fn update(
        &self,
        requester: &Requester,
        id: TeamId,
        draft: TeamDraft,
    ) -> OrganisationResult<Team> {
        let mut team = self.managed(requester, id, "edit this team").await?;
        team.apply(draft);
        self.repository.update_team(&team).await?;
        info!(team_id = %id, actor = %requester.worker_id(), "team updated");
        Ok(team)
    }

    /// Deletes a team. Its members keep their accounts.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::TeamNotFound`] when absent and
    /// [`OrganisationError::AccessDenied`] unless the requester may manage
    /// the team.
    pub async fn delete(&self, requester: &Requester, id: TeamId) -> OrganisationResult<()> {
        self.managed(requester, id, "delete this team").await?;
        self.repository.delete_team(id).await?;
        info!(team_id = %id, actor = %requester.worker_id(), "team deleted");
        Ok(())
    }

    /// Loads a team.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::TeamNotFound`] when absent.
    pub async fn get(&self, id: TeamId) -> OrganisationResult<Team> {
        self.repository
            .find_team(id)
            .await?
            .ok_or(OrganisationError::TeamNotFound(id))
    }

    /// Lists teams by name, optionally filtered by a name substring.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::Repository`] when the lookup fails.
    pub async fn list(&self, search: Option<&str>) -> OrganisationResult<Vec<Team>> {
        Ok(self.repository.list_teams(search).await?)
    }

    /// Lists the teams a worker belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::Repository`] when the lookup fails.
    pub async fn member_teams(&self, worker: WorkerId) -> OrganisationResult<Vec<Team>> {
        Ok(self.repository.list_member_teams(worker).await?)
    }

    /// Adds a worker to the team; adding an existing member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::AccessDenied`] unless the requester may
    /// manage the team, and repository errors for unknown workers.
    pub async fn add_member(
        &self,
        requester: &Requester,
        id: TeamId,
        worker: WorkerId,
    ) -> OrganisationResult<Team> {
        let mut team = self.managed(requester, id, "change team members").await?;
        if team.add_member(worker) {
            self.repository.update_team(&team).await?;
            info!(team_id = %id, worker_id = %worker, "team member added");
        }
        Ok(team)
    }

    /// Removes a worker from the team; removing a non-member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::AccessDenied`] unless the requester may
    /// manage the team.
    pub async fn remove_member(
        &self,
        requester: &Requester,
        id: TeamId,
        worker: WorkerId,
    ) -> OrganisationResult<Team> {
        let mut team = self.managed(requester, id, "change team members").await?;
        if team.remove_member(worker) {
            self.repository.update_team(&team).await?;
            info!(team_id = %id, worker_id = %worker, "team member removed");
        }
        Ok(team)
    }

    async fn managed(
        &self,
        requester: &Requester,
        id: TeamId,
        action: &str,
    ) -> OrganisationResult<Team> {
        let team = self.get(id).await?;
        if !team.can_be_managed_by(requester) {
            warn!(team_id = %id, actor = %requester.worker_id(), action, "team access denied");
            return Err(AccessDenied::new(action).into());
        }
        Ok(team)
    }
}
