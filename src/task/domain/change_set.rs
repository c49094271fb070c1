//! Unit of work for the task aggregate.

use super::{ActivityLog, Comment, CommentId, Notification, Task, TaskId};

/// The primary write of a change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskWrite {
    /// Insert a new task with its tag and assignee links.
    InsertTask(Task),
    /// Replace an existing task's fields and links.
    UpdateTask(Task),
    /// Delete a task, its comments and links; detach activity and
    /// notifications.
    DeleteTask(TaskId),
    /// Insert a comment.
    InsertComment(Comment),
    /// Replace a comment's content.
    UpdateComment(Comment),
    /// Delete a comment.
    DeleteComment(CommentId),
}

/// A primary write plus the side effects that must commit with it.
///
/// Repositories persist all of it or none of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChangeSet {
    /// The triggering write.
    pub write: TaskWrite,
    /// Audit rows to append.
    pub activity: Vec<ActivityLog>,
    /// Notifications to create.
    pub notifications: Vec<Notification>,
}

impl TaskChangeSet {
    /// A change set with no side effects.
    #[must_use]
    pub const fn bare(write: TaskWrite) -> Self {
        Self {
            write,
            activity: Vec::new(),
            notifications: Vec::new(),
        }
    }
}
