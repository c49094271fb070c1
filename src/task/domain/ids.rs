//! Identifiers for task-context entities.

use crate::identifier::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a task.
    TaskId
);

uuid_identifier!(
    /// Unique identifier for a comment.
    CommentId
);

uuid_identifier!(
    /// Unique identifier for an activity log row.
    ActivityId
);

uuid_identifier!(
    /// Unique identifier for a notification.
    NotificationId
);
