//! Repository ports for workers and their positions.

use crate::persistence::StoreFailure;
use crate::worker::domain::{Position, PositionId, Username, Worker, WorkerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for worker repository operations.
pub type WorkerRepositoryResult<T> = Result<T, WorkerRepositoryError>;

/// Listing options for workers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerQuery {
    /// Case-insensitive substring over username, names and email.
    pub search: Option<String>,
    /// Excludes deactivated accounts when set.
    pub active_only: bool,
}

impl WorkerQuery {
    /// Query for every active worker.
    #[must_use]
    pub fn active() -> Self {
        Self {
            search: None,
            active_only: true,
        }
    }

    /// Returns `true` when `worker` satisfies the query.
    #[must_use]
    pub fn matches(&self, worker: &Worker) -> bool {
        if self.active_only && !worker.is_active() {
            return false;
        }
        let Some(needle) = self.search.as_deref().map(str::to_lowercase) else {
            return true;
        };
        [
            worker.username().as_str(),
            worker.first_name(),
            worker.last_name(),
            worker.email().as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Worker persistence contract.
#[async_trait]
pub trait WorkerRepository: Send + Sync {
    /// Stores a new worker.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerRepositoryError::DuplicateUsername`] or
    /// [`WorkerRepositoryError::DuplicateEmail`] when a unique field is taken
    /// and [`WorkerRepositoryError::PositionNotFound`] for an unknown
    /// position.
    async fn store(&self, worker: &Worker) -> WorkerRepositoryResult<()>;

    /// Persists profile, credential, privilege and activity changes.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerRepositoryError::NotFound`] when the worker does not
    /// exist, plus the uniqueness and position errors of
    /// [`WorkerRepository::store`].
    async fn update(&self, worker: &Worker) -> WorkerRepositoryResult<()>;

    /// Finds a worker by identifier.
    async fn find_by_id(&self, id: WorkerId) -> WorkerRepositoryResult<Option<Worker>>;

    /// Finds a worker by exact username.
    async fn find_by_username(&self, username: &Username)
    -> WorkerRepositoryResult<Option<Worker>>;

    /// Returns the workers among `ids` that exist, in username order.
    async fn find_many(&self, ids: &[WorkerId]) -> WorkerRepositoryResult<Vec<Worker>>;

    /// Lists workers matching `query`, newest registration first.
    async fn list(&self, query: &WorkerQuery) -> WorkerRepositoryResult<Vec<Worker>>;
}

/// Position persistence contract.
#[async_trait]
pub trait PositionRepository: Send + Sync {
    /// Stores a new position.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerRepositoryError::DuplicatePosition`] when the name is
    /// taken.
    async fn store_position(&self, position: &Position) -> WorkerRepositoryResult<()>;

    /// Renames a position.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerRepositoryError::PositionNotFound`] or
    /// [`WorkerRepositoryError::DuplicatePosition`].
    async fn update_position(&self, position: &Position) -> WorkerRepositoryResult<()>;

    /// Deletes a position and clears it from every worker holding it.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerRepositoryError::PositionNotFound`] when absent.
    async fn delete_position(&self, id: PositionId) -> WorkerRepositoryResult<()>;

    /// Finds a position by identifier.
    async fn find_position(&self, id: PositionId) -> WorkerRepositoryResult<Option<Position>>;

    /// Lists positions ordered by name.
    async fn list_positions(&self) -> WorkerRepositoryResult<Vec<Position>>;
}

/// Errors returned by worker and position repositories.
#[derive(Debug, Clone, Error)]
pub enum WorkerRepositoryError {
    /// The username is already registered.
    #[error("a worker with username '{0}' already exists")]
    DuplicateUsername(String),

    /// The email address is already registered.
    #[error("a worker with email '{0}' already exists")]
    DuplicateEmail(String),

    /// The position name is already used.
    #[error("a position named '{0}' already exists")]
    DuplicatePosition(String),

    /// The worker was not found.
    #[error("worker not found: {0}")]
    NotFound(WorkerId),

    /// The position was not found.
    #[error("position not found: {0}")]
    PositionNotFound(PositionId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl WorkerRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<StoreFailure> for WorkerRepositoryError {
    fn from(err: StoreFailure) -> Self {
        Self::persistence(err)
    }
}
