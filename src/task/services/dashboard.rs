//! Aggregate statistics for the landing page.

use super::TaskResult;
use crate::organisation::domain::Project;
use crate::organisation::ports::ProjectRepository;
use crate::task::{
    domain::{ActivityLog, Priority, Task},
    ports::{ActivityLogRepository, TaskRepository},
};
use crate::worker::domain::WorkerId;
use chrono::Duration;
use mockable::Clock;
use std::sync::Arc;

const UPCOMING_WINDOW_DAYS: i64 = 7;
const UPCOMING_LIMIT: usize = 5;
const RECENT_ACTIVITY_LIMIT: usize = 10;
const PROJECT_LIMIT: usize = 5;

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    /// All tasks.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Open tasks.
    pub incomplete: usize,
    /// Open tasks past their deadline.
    pub overdue: usize,
    /// Open tasks assigned to the viewer.
    pub my_open: usize,
    /// Completed tasks assigned to the viewer.
    pub my_completed: usize,
    /// Open tasks due within the next week, soonest first.
    pub upcoming: Vec<Task>,
    /// Open tasks per priority, most pressing first.
    pub open_by_priority: Vec<(Priority, usize)>,
    /// Latest activity across all tasks.
    pub recent_activity: Vec<ActivityLog>,
    /// Newest projects.
    pub projects: Vec<Project>,
}

/// Computes [`DashboardStats`].
pub struct DashboardService<R, C>
where
    R: TaskRepository + ActivityLogRepository + ProjectRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for DashboardService<R, C>
where
    R: TaskRepository + ActivityLogRepository + ProjectRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> DashboardService<R, C>
where
    R: TaskRepository + ActivityLogRepository + ProjectRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new dashboard service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Computes the statistics as seen by `viewer`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Repository`](super::TaskError::Repository) or
    /// [`TaskError::Organisation`](super::TaskError::Organisation) when a
    /// lookup fails.
    pub async fn stats(&self, viewer: WorkerId) -> TaskResult<DashboardStats> {
        let now = self.clock.utc();
        let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);
        let counts = self.repository.statistics(viewer, now).await?;
        let upcoming = self
            .repository
            .due_between(now, horizon, UPCOMING_LIMIT)
            .await?;
        let recent_activity = self
            .repository
            .list_recent(RECENT_ACTIVITY_LIMIT)
            .await?;
        let projects = self.repository.newest_projects(PROJECT_LIMIT).await?;

        Ok(DashboardStats {
            total: counts.total,
            completed: counts.completed,
            incomplete: counts.total.saturating_sub(counts.completed),
            overdue: counts.overdue,
            my_open: counts.my_open,
            my_completed: counts.my_completed,
            upcoming,
            open_by_priority: counts.open_by_priority,
            recent_activity,
            projects,
        })
    }
}
