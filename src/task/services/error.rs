//! Errors shared by the task services.

use crate::organisation::ports::OrganisationRepositoryError;
use crate::task::{
    domain::{CommentId, NotificationId, TaskDomainError, TaskId},
    ports::TaskRepositoryError,
};
use crate::worker::domain::AccessDenied;
use crate::worker::ports::WorkerRepositoryError;
use thiserror::Error;

/// Service-level errors for tasks, comments and notifications.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Task storage failed or rejected the change set.
    #[error(transparent)]
    Repository(TaskRepositoryError),
    /// Project lookup failed.
    #[error(transparent)]
    Organisation(#[from] OrganisationRepositoryError),
    /// Worker lookup failed.
    #[error(transparent)]
    Workers(#[from] WorkerRepositoryError),
    /// The requester lacks the privilege.
    #[error(transparent)]
    AccessDenied(#[from] AccessDenied),
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),
    /// The comment does not exist.
    #[error("comment not found: {0}")]
    CommentNotFound(CommentId),
    /// The notification does not exist or belongs to someone else.
    #[error("notification not found: {0}")]
    NotificationNotFound(NotificationId),
}

impl From<TaskRepositoryError> for TaskError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::NotFound(id),
            TaskRepositoryError::CommentNotFound(id) => Self::CommentNotFound(id),
            other => Self::Repository(other),
        }
    }
}

/// Result type for task services.
pub type TaskResult<T> = Result<T, TaskError>;
