//! Domain model for tasks, comments, activity and notifications.

mod activity;
mod change_set;
mod comment;
mod diff;
mod error;
mod filter;
mod ids;
mod notification;
mod priority;
mod task;

pub use activity::{ActivityKind, ActivityLog};
pub use change_set::{TaskChangeSet, TaskWrite};
pub use comment::{Comment, CommentContent};
pub use diff::{FieldChange, TaskDiff};
pub use error::TaskDomainError;
pub use filter::{CompletionStatus, TaskFilter};
pub use ids::{ActivityId, CommentId, NotificationId, TaskId};
pub use notification::{
    Notification, NotificationFilter, NotificationKind, PersistedNotificationData,
};
pub use priority::Priority;
pub use task::{PersistedTaskData, Task, TaskDraft, TaskName};
