//! Errors shared by the organisation services.

use crate::organisation::{
    domain::{OrganisationDomainError, ProjectId, TagId, TaskTypeId, TeamId},
    ports::OrganisationRepositoryError,
};
use crate::worker::domain::AccessDenied;
use thiserror::Error;

/// Service-level errors for projects, teams and catalogues.
#[derive(Debug, Error)]
pub enum OrganisationError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] OrganisationDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(OrganisationRepositoryError),
    /// The requester lacks the privilege.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),
    /// The project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),
    /// The team does not exist.
    #[error("team not found: {0}")]
    TeamNotFound(TeamId),
    /// The tag does not exist.
    #[error("tag not found: {0}")]
    TagNotFound(TagId),
    /// The task type does not exist.
    #[error("task type not found: {0}")]
    TaskTypeNotFound(TaskTypeId),
}

/// Result type for organisation services.
pub type OrganisationResult<T> = Result<T, OrganisationError>;

impl From<OrganisationRepositoryError> for OrganisationError {
    fn from(err: OrganisationRepositoryError) -> Self {
        match err {
            OrganisationRepositoryError::ProjectNotFound(id) => Self::ProjectNotFound(id),
            OrganisationRepositoryError::TeamNotFound(id) => Self::TeamNotFound(id),
            OrganisationRepositoryError::TagNotFound(id) => Self::TagNotFound(id),
            OrganisationRepositoryError::TaskTypeNotFound(id) => Self::TaskTypeNotFound(id),
            other => Self::Repository(other),
        }
    }
}
