//! Storage shared by every bounded context.
//!
//! Each context defines its own repository ports; the two stores here hold
//! the tables those ports read and write. [`InMemoryStore`] keeps everything
//! behind one lock and backs tests and database-less runs, while
//! [`PostgresStore`] wraps a Diesel connection pool.

pub mod memory;
pub mod paging;
pub mod postgres;

pub use memory::InMemoryStore;
pub use paging::{PageRequest, Paged};
pub use postgres::{PgPool, PostgresStore, apply_schema, connect};

use crate::organisation::ports::{CatalogRepository, ProjectRepository, TeamRepository};
use crate::task::ports::{ActivityLogRepository, NotificationRepository, TaskRepository};
use crate::worker::ports::{PositionRepository, WorkerRepository};
use thiserror::Error;

/// Infrastructure failure below the repository contracts.
#[derive(Debug, Error)]
pub enum StoreFailure {
    /// A thread panicked while holding the in-memory lock.
    #[error("in-memory store lock poisoned")]
    Poisoned,

    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// The blocking database task was cancelled or panicked.
    #[error("blocking database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// A query failed.
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),

    /// A row could not be mapped to a domain value.
    #[error("corrupt row in {table}: {reason}")]
    CorruptRow {
        /// Table the row came from.
        table: &'static str,
        /// Why mapping failed.
        reason: String,
    },
}

impl StoreFailure {
    /// Builds a [`StoreFailure::CorruptRow`].
    pub fn corrupt(table: &'static str, reason: impl ToString) -> Self {
        Self::CorruptRow {
            table,
            reason: reason.to_string(),
        }
    }
}

/// Every repository port the application needs, from one store.
pub trait TrackerStore:
    WorkerRepository
    + PositionRepository
    + ProjectRepository
    + TeamRepository
    + CatalogRepository
    + TaskRepository
    + ActivityLogRepository
    + NotificationRepository
{
}

impl<T> TrackerStore for T where
    T: WorkerRepository
        + PositionRepository
        + ProjectRepository
        + TeamRepository
        + CatalogRepository
        + TaskRepository
        + ActivityLogRepository
        + NotificationRepository
{
}
