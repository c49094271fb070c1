//! Per-recipient notifications with read state.

use super::{NotificationId, TaskDomainError, TaskId};
use crate::worker::domain::WorkerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The recipient was assigned to a task.
    TaskAssigned,
    /// A task the recipient works on was completed.
    TaskCompleted,
    /// Someone commented on a task the recipient follows.
    TaskCommented,
    /// Deadline or priority of a task changed, or it was reopened.
    TaskUpdated,
}

impl NotificationKind {
    /// Every kind, in console order.
    pub const ALL: [Self; 4] = [
        Self::TaskAssigned,
        Self::TaskCompleted,
        Self::TaskCommented,
        Self::TaskUpdated,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskAssigned => "task_assigned",
            Self::TaskCompleted => "task_completed",
            Self::TaskCommented => "task_commented",
            Self::TaskUpdated => "task_updated",
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TaskAssigned => "Task Assigned",
            Self::TaskCompleted => "Task Completed",
            Self::TaskCommented => "New Comment",
            Self::TaskUpdated => "Task Updated",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "task_assigned" => Ok(Self::TaskAssigned),
            "task_completed" => Ok(Self::TaskCompleted),
            "task_commented" => Ok(Self::TaskCommented),
            "task_updated" => Ok(Self::TaskUpdated),
            _ => Err(TaskDomainError::UnknownNotificationKind(value.to_owned())),
        }
    }
}

/// Which notifications a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationFilter {
    /// Read and unread.
    #[default]
    All,
    /// Unread only.
    Unread,
}

impl NotificationFilter {
    /// Parses the `filter` query value; anything but `unread` means all.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("unread") => Self::Unread,
            _ => Self::All,
        }
    }

    /// Returns the query value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unread => "unread",
        }
    }
}

/// A message for one recipient.
///
/// Created only by the mutation pipeline; afterwards only the read flag
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    recipient: WorkerId,
    kind: NotificationKind,
    title: String,
    message: String,
    task: Option<TaskId>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedNotificationData {
    /// Persisted identifier.
    pub id: NotificationId,
    /// Persisted recipient.
    pub recipient: WorkerId,
    /// Persisted kind.
    pub kind: NotificationKind,
    /// Persisted title.
    pub title: String,
    /// Persisted message.
    pub message: String,
    /// Persisted task reference.
    pub task: Option<TaskId>,
    /// Persisted read flag.
    pub is_read: bool,
    /// Persisted timestamp.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification.
    #[must_use]
    pub fn unread(
        recipient: WorkerId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        task: Option<TaskId>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            recipient,
            kind,
            title: title.into(),
            message: message.into(),
            task,
            is_read: false,
            created_at: at,
        }
    }

    /// Reconstructs a notification from storage.
    #[must_use]
    pub fn from_persisted(data: PersistedNotificationData) -> Self {
        Self {
            id: data.id,
            recipient: data.recipient,
            kind: data.kind,
            title: data.title,
            message: data.message,
            task: data.task,
            is_read: data.is_read,
            created_at: data.created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn recipient(&self) -> WorkerId {
        self.recipient
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the related task, unless it has since been deleted.
    #[must_use]
    pub const fn task(&self) -> Option<TaskId> {
        self.task
    }

    /// Returns the read flag.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.is_read
    }

    /// Returns the timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sets the read flag; returns `true` when it changed.
    pub const fn set_read(&mut self, read: bool) -> bool {
        let changed = self.is_read != read;
        self.is_read = read;
        changed
    }

    /// Drops the task reference after the task is deleted.
    pub(crate) const fn detach_task(&mut self) {
        self.task = None;
    }
}
