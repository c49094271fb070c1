//! Repository ports for the task aggregate and its audit trail.

use crate::organisation::domain::{ProjectId, TagId, TaskTypeId};
use crate::persistence::{PageRequest, Paged, StoreFailure};
use crate::task::domain::{
    ActivityId, ActivityKind, ActivityLog, Comment, CommentId, Notification, NotificationFilter,
    NotificationId, NotificationKind, Priority, Task, TaskChangeSet, TaskFilter, TaskId,
};
use crate::worker::domain::WorkerId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task aggregate persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Commits a change set atomically: the primary write, every activity
    /// row and every notification, or nothing.
    ///
    /// # Errors
    ///
    /// Returns the first integrity violation found (duplicate or missing
    /// task or comment, dangling worker, project, tag or task type
    /// reference) or a persistence failure. Nothing is written on error.
    async fn apply(&self, change_set: TaskChangeSet) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    async fn find_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns the tasks matching `filter`, newest first.
    async fn search(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns one page of [`search`](Self::search) and the total match
    /// count.
    async fn search_page(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> TaskRepositoryResult<Paged<Task>>;

    /// Counts tasks by state, as seen by `viewer` at `now`.
    async fn statistics(
        &self,
        viewer: WorkerId,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<TaskStatistics>;

    /// Returns at most `limit` open tasks due within `from..=until`,
    /// soonest first.
    async fn due_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: usize,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Finds a comment by identifier.
    async fn find_comment(&self, id: CommentId) -> TaskRepositoryResult<Option<Comment>>;

    /// Returns the comments on `task`, newest first.
    async fn list_comments(&self, task: TaskId) -> TaskRepositoryResult<Vec<Comment>>;
}

/// Task counts behind the dashboard cards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStatistics {
    /// All tasks.
    pub total: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Open tasks past their deadline.
    pub overdue: usize,
    /// Open tasks assigned to the viewer.
    pub my_open: usize,
    /// Completed tasks assigned to the viewer.
    pub my_completed: usize,
    /// Open tasks per priority, most pressing first, zero counts omitted.
    pub open_by_priority: Vec<(Priority, usize)>,
}

impl TaskStatistics {
    /// Orders per-priority counts for display.
    #[must_use]
    pub fn priority_breakdown(counts: &HashMap<Priority, usize>) -> Vec<(Priority, usize)> {
        Priority::ALL
            .iter()
            .filter_map(|priority| {
                counts
                    .get(priority)
                    .filter(|count| **count > 0)
                    .map(|count| (*priority, *count))
            })
            .collect()
    }
}

/// Audit-console filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityQuery {
    /// Restricts to one kind of action.
    pub kind: Option<ActivityKind>,
    /// Case-insensitive substring over the description, the task name and
    /// the actor's username.
    pub search: Option<String>,
}

impl ActivityQuery {
    /// Returns the search needle, lower-cased, when it is not blank.
    #[must_use]
    pub fn needle(&self) -> Option<String> {
        needle(self.search.as_deref())
    }
}

fn needle(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

/// Read access to the append-only activity log.
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Returns the activity for `task`, newest first.
    async fn list_for_task(&self, task: TaskId) -> TaskRepositoryResult<Vec<ActivityLog>>;

    /// Returns the latest `limit` rows across all tasks.
    async fn list_recent(&self, limit: usize) -> TaskRepositoryResult<Vec<ActivityLog>>;

    /// Returns one page of the rows matching `query`, newest first.
    async fn search_activity(
        &self,
        query: &ActivityQuery,
        page: PageRequest,
    ) -> TaskRepositoryResult<Paged<ActivityLog>>;

    /// Finds a single row.
    async fn find_activity(&self, id: ActivityId) -> TaskRepositoryResult<Option<ActivityLog>>;
}

/// Notification listing filters shared by the inbox and the admin console.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationQuery {
    /// Restricts to one recipient.
    pub recipient: Option<WorkerId>,
    /// Restricts to a read state.
    pub is_read: Option<bool>,
    /// Restricts to one kind of event.
    pub kind: Option<NotificationKind>,
    /// Case-insensitive substring over the title, the message and the
    /// recipient's username.
    pub search: Option<String>,
}

impl NotificationQuery {
    /// A recipient's inbox.
    #[must_use]
    pub fn inbox(recipient: WorkerId, filter: NotificationFilter) -> Self {
        Self {
            recipient: Some(recipient),
            is_read: match filter {
                NotificationFilter::All => None,
                NotificationFilter::Unread => Some(false),
            },
            ..Self::default()
        }
    }

    /// Returns the search needle, lower-cased, when it is not blank.
    #[must_use]
    pub fn needle(&self) -> Option<String> {
        needle(self.search.as_deref())
    }

    /// Returns `true` when `notification`, sent to `recipient_username`,
    /// satisfies the query.
    #[must_use]
    pub fn matches(&self, notification: &Notification, recipient_username: &str) -> bool {
        let text_ok = self.needle().is_none_or(|needle| {
            [notification.title(), notification.message(), recipient_username]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        });
        text_ok
            && self
                .recipient
                .is_none_or(|recipient| notification.recipient() == recipient)
            && self
                .is_read
                .is_none_or(|read| notification.is_read() == read)
            && self.kind.is_none_or(|kind| notification.kind() == kind)
    }
}

/// Notification storage; only read state is mutable.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Returns one page of the notifications matching `query`, newest
    /// first.
    async fn list_notifications(
        &self,
        query: &NotificationQuery,
        page: PageRequest,
    ) -> TaskRepositoryResult<Paged<Notification>>;

    /// Counts the recipient's unread notifications.
    async fn unread_count(&self, recipient: WorkerId) -> TaskRepositoryResult<usize>;

    /// Finds a notification by identifier.
    async fn find_notification(
        &self,
        id: NotificationId,
    ) -> TaskRepositoryResult<Option<Notification>>;

    /// Sets the read flag of the given notifications; returns how many
    /// changed. Unknown identifiers are skipped.
    async fn set_read_state(
        &self,
        ids: &[NotificationId],
        read: bool,
    ) -> TaskRepositoryResult<usize>;

    /// Marks every unread notification of `recipient` as read; returns how
    /// many changed.
    async fn mark_all_read(&self, recipient: WorkerId) -> TaskRepositoryResult<usize>;
}

/// Errors returned by task-context repositories.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A comment with the same identifier already exists.
    #[error("duplicate comment identifier: {0}")]
    DuplicateComment(CommentId),

    /// The comment was not found.
    #[error("comment not found: {0}")]
    CommentNotFound(CommentId),

    /// A referenced worker does not exist.
    #[error("worker not found: {0}")]
    UnknownWorker(WorkerId),

    /// A referenced project does not exist.
    #[error("project not found: {0}")]
    UnknownProject(ProjectId),

    /// A referenced tag does not exist.
    #[error("tag not found: {0}")]
    UnknownTag(TagId),

    /// A referenced task type does not exist.
    #[error("task type not found: {0}")]
    UnknownTaskType(TaskTypeId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<StoreFailure> for TaskRepositoryError {
    fn from(err: StoreFailure) -> Self {
        Self::persistence(err)
    }
}
