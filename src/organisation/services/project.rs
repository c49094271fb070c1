//! Project lifecycle and team attachment.

use super::{OrganisationError, OrganisationResult};
use crate::organisation::{
    domain::{Project, ProjectDraft, ProjectId, Team, TeamId},
    ports::{ProjectRepository, TeamRepository},
};
use crate::worker::domain::{AccessDenied, Requester};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Creates, edits and deletes projects.
///
/// Any signed-in worker may create or edit a project; deletion needs staff.
pub struct ProjectService<R, C>
where
    R: ProjectRepository + TeamRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for ProjectService<R, C>
where
    R: ProjectRepository + TeamRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> ProjectService<R, C>
where
    R: ProjectRepository + TeamRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new project service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::Repository`] when the write fails.
    pub async fn create(
        &self,
        requester: &Requester,
        draft: ProjectDraft,
    ) -> OrganisationResult<Project> {
        let project = Project::new(draft, &*self.clock);
        self.repository.store_project(&project).await?;
        info!(project_id = %project.id(), actor = %requester.worker_id(), "project created");
        Ok(project)
    }

    /// Replaces a project's name and description.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::ProjectNotFound`] when absent.
    pub async fn update(
        &self,
        requester: &Requester,
        id: ProjectId,
        draft: ProjectDraft,
    ) -> OrganisationResult<Project> {
        let mut project = self.get(id).await?;
        project.apply(draft);
        self.repository.update_project(&project).await?;
        info!(project_id = %id, actor = %requester.worker_id(), "project updated");
        Ok(project)
    }

    /// Deletes a project, detaching its teams and tasks.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::AccessDenied`] for non-staff requesters.
    pub async fn delete(&self, requester: &Requester, id: ProjectId) -> OrganisationResult<()> {
        requester.ensure_staff("delete projects")?;
        self.repository.delete_project(id).await?;
        info!(project_id = %id, actor = %requester.worker_id(), "project deleted");
        Ok(())
    }

    /// Loads a project.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::ProjectNotFound`] when absent.
    pub async fn get(&self, id: ProjectId) -> OrganisationResult<Project> {
        self.repository
            .find_project(id)
            .await?
            .ok_or(OrganisationError::ProjectNotFound(id))
    }

    /// Lists projects newest first, optionally filtered by a substring of
    /// the name or description.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::Repository`] when the lookup fails.
    pub async fn list(&self, search: Option<&str>) -> OrganisationResult<Vec<Project>> {
        Ok(self.repository.list_projects(search).await?)
    }

    /// Lists the teams attached to a project.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationError::Repository`] when the lookup fails.
    pub async fn teams(&self, id: ProjectId) -> OrganisationResult<Vec<Team>> {
        Ok(self.repository.list_project_teams(id).await?)
    }

    /// Attaches a team to the project, moving it from any previous one.
    ///
    /// # Errors
    ///
    /// Returns not-found errors for the project or team, and
    /// [`OrganisationError::AccessDenied`] unless the requester may manage
    /// the team.
    pub async fn add_team(
        &self,
        requester: &Requester,
        id: ProjectId,
        team: TeamId,
    ) -> OrganisationResult<Team> {
        self.get(id).await?;
        let mut team = self.managed_team(requester, team).await?;
        team.set_project(Some(id));
        self.repository.update_team(&team).await?;
        info!(project_id = %id, team_id = %team.id(), "team attached to project");
        Ok(team)
    }

    /// Detaches a team from the project.
    ///
    /// A team attached elsewhere is left untouched.
    ///
    /// # Errors
    ///
    /// Returns not-found errors for the team and
    /// [`OrganisationError::AccessDenied`] unless the requester may manage
    /// the team.
    pub async fn remove_team(
        &self,
        requester: &Requester,
        id: ProjectId,
        team: TeamId,
    ) -> OrganisationResult<Team> {
        let mut team = self.managed_team(requester, team).await?;
        if team.project() == Some(id) {
            team.set_project(None);
            self.repository.update_team(&team).await?;
            info!(project_id = %id, team_id = %team.id(), "team detached from project");
        }
        Ok(team)
    }

    async fn managed_team(&self, requester: &Requester, id: TeamId) -> OrganisationResult<Team> {
        let team = self
            .repository
            .find_team(id)
            .await?
            .ok_or(OrganisationError::TeamNotFound(id))?;
        if !team.can_be_managed_by(requester) {
            warn!(team_id = %id, actor = %requester.worker_id(), "team management denied");
            return Err(AccessDenied::new("manage this team").into());
        }
        Ok(team)
    }
}
