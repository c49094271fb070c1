//! Port contracts for worker and position storage.

mod repository;

pub use repository::{
    PositionRepository, WorkerQuery, WorkerRepository, WorkerRepositoryError,
    WorkerRepositoryResult,
};
