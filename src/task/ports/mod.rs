//! Port contracts for task, activity and notification storage.

mod repository;

pub use repository::{
    ActivityLogRepository, ActivityQuery, NotificationQuery, NotificationRepository,
    TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskStatistics,
};

#[cfg(test)]
pub use repository::MockTaskRepository;
