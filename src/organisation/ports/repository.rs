//! Repository ports for projects, teams, tags and task types.

use crate::organisation::domain::{Project, ProjectId, Tag, TagId, TaskType, TaskTypeId, Team, TeamId};
use crate::persistence::StoreFailure;
use crate::worker::domain::WorkerId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for organisation repository operations.
pub type OrganisationRepositoryResult<T> = Result<T, OrganisationRepositoryError>;

/// Project persistence contract.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Stores a new project.
    async fn store_project(&self, project: &Project) -> OrganisationRepositoryResult<()>;

    /// Persists edited project fields.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::ProjectNotFound`] when absent.
    async fn update_project(&self, project: &Project) -> OrganisationRepositoryResult<()>;

    /// Deletes a project, detaching its teams and tasks.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::ProjectNotFound`] when absent.
    async fn delete_project(&self, id: ProjectId) -> OrganisationRepositoryResult<()>;

    /// Finds a project by identifier.
    async fn find_project(&self, id: ProjectId) -> OrganisationRepositoryResult<Option<Project>>;

    /// Lists projects, newest first, optionally filtered by a case-insensitive
    /// substring over name and description.
    async fn list_projects(&self, search: Option<&str>) -> OrganisationRepositoryResult<Vec<Project>>;

    /// Returns at most `limit` projects, newest first.
    async fn newest_projects(&self, limit: usize) -> OrganisationRepositoryResult<Vec<Project>>;
}

/// Team persistence contract.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Stores a new team with its members.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::ProjectNotFound`] or
    /// [`OrganisationRepositoryError::UnknownWorker`] for dangling references.
    async fn store_team(&self, team: &Team) -> OrganisationRepositoryResult<()>;

    /// Persists name, project and membership changes.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::TeamNotFound`] plus the
    /// reference errors of [`TeamRepository::store_team`].
    async fn update_team(&self, team: &Team) -> OrganisationRepositoryResult<()>;

    /// Deletes a team and its membership rows.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::TeamNotFound`] when absent.
    async fn delete_team(&self, id: TeamId) -> OrganisationRepositoryResult<()>;

    /// Finds a team by identifier.
    async fn find_team(&self, id: TeamId) -> OrganisationRepositoryResult<Option<Team>>;

    /// Lists teams ordered by name, optionally filtered by a case-insensitive
    /// name substring.
    async fn list_teams(&self, search: Option<&str>) -> OrganisationRepositoryResult<Vec<Team>>;

    /// Lists the teams attached to `project`, ordered by name.
    async fn list_project_teams(&self, project: ProjectId) -> OrganisationRepositoryResult<Vec<Team>>;

    /// Lists the teams `worker` belongs to, ordered by name.
    async fn list_member_teams(&self, worker: WorkerId) -> OrganisationRepositoryResult<Vec<Team>>;
}

/// Tag and task type persistence contract.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Stores a new tag.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::DuplicateTag`] when the name is
    /// taken.
    async fn store_tag(&self, tag: &Tag) -> OrganisationRepositoryResult<()>;

    /// Renames a tag.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::TagNotFound`] or
    /// [`OrganisationRepositoryError::DuplicateTag`].
    async fn update_tag(&self, tag: &Tag) -> OrganisationRepositoryResult<()>;

    /// Deletes a tag and unlinks it from every task.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::TagNotFound`] when absent.
    async fn delete_tag(&self, id: TagId) -> OrganisationRepositoryResult<()>;

    /// Finds a tag by identifier.
    async fn find_tag(&self, id: TagId) -> OrganisationRepositoryResult<Option<Tag>>;

    /// Lists tags ordered by name, optionally filtered by a case-insensitive
    /// name substring.
    async fn list_tags(&self, search: Option<&str>) -> OrganisationRepositoryResult<Vec<Tag>>;

    /// Stores a new task type.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::DuplicateTaskType`] when the
    /// name is taken.
    async fn store_task_type(&self, task_type: &TaskType) -> OrganisationRepositoryResult<()>;

    /// Renames a task type.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::TaskTypeNotFound`] or
    /// [`OrganisationRepositoryError::DuplicateTaskType`].
    async fn update_task_type(&self, task_type: &TaskType) -> OrganisationRepositoryResult<()>;

    /// Deletes a task type and clears it from every task.
    ///
    /// # Errors
    ///
    /// Returns [`OrganisationRepositoryError::TaskTypeNotFound`] when absent.
    async fn delete_task_type(&self, id: TaskTypeId) -> OrganisationRepositoryResult<()>;

    /// Finds a task type by identifier.
    async fn find_task_type(&self, id: TaskTypeId) -> OrganisationRepositoryResult<Option<TaskType>>;

    /// Lists task types ordered by name.
    async fn list_task_types(&self) -> OrganisationRepositoryResult<Vec<TaskType>>;
}

/// Errors returned by organisation repositories.
#[derive(Debug, Clone, Error)]
pub enum OrganisationRepositoryError {
    /// The project was not found.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// The team was not found.
    #[error("team not found: {0}")]
    TeamNotFound(TeamId),

    /// The tag was not found.
    #[error("tag not found: {0}")]
    TagNotFound(TagId),

    /// The task type was not found.
    #[error("task type not found: {0}")]
    TaskTypeNotFound(TaskTypeId),

    /// A referenced worker does not exist.
    #[error("worker not found: {0}")]
    UnknownWorker(WorkerId),

    /// The tag name is already used.
    #[error("a tag named '{0}' already exists")]
    DuplicateTag(String),

    /// The task type name is already used.
    #[error("a task type named '{0}' already exists")]
    DuplicateTaskType(String),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl OrganisationRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<StoreFailure> for OrganisationRepositoryError {
    fn from(err: StoreFailure) -> Self {
        Self::persistence(err)
    }
}
