//! Append-only audit rows describing task actions.

use super::{ActivityId, TaskDomainError, TaskId};
use crate::worker::domain::WorkerId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// The task was created.
    Created,
    /// Fields other than completion alone or assignees alone changed.
    Updated,
    /// The task was marked complete.
    Completed,
    /// A completed task was reopened.
    Reopened,
    /// Workers were added to the task.
    Assigned,
    /// Workers were removed from the task.
    Unassigned,
    /// A comment was posted.
    Commented,
    /// The task was deleted.
    Deleted,
}

impl ActivityKind {
    /// Every kind, in lifecycle order.
    pub const ALL: [Self; 8] = [
        Self::Created,
        Self::Updated,
        Self::Completed,
        Self::Reopened,
        Self::Assigned,
        Self::Unassigned,
        Self::Commented,
        Self::Deleted,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Completed => "completed",
            Self::Reopened => "reopened",
            Self::Assigned => "assigned",
            Self::Unassigned => "unassigned",
            Self::Commented => "commented",
            Self::Deleted => "deleted",
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::Completed => "Completed",
            Self::Reopened => "Reopened",
            Self::Assigned => "Assigned",
            Self::Unassigned => "Unassigned",
            Self::Commented => "Commented",
            Self::Deleted => "Deleted",
        }
    }
}

impl TryFrom<&str> for ActivityKind {
    type Error = TaskDomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "completed" => Ok(Self::Completed),
            "reopened" => Ok(Self::Reopened),
            "assigned" => Ok(Self::Assigned),
            "unassigned" => Ok(Self::Unassigned),
            "commented" => Ok(Self::Commented),
            "deleted" => Ok(Self::Deleted),
            _ => Err(TaskDomainError::UnknownActivityKind(value.to_owned())),
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One audit row. Never edited once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
    id: ActivityId,
    task: Option<TaskId>,
    actor: Option<WorkerId>,
    kind: ActivityKind,
    description: String,
    created_at: DateTime<Utc>,
}

impl ActivityLog {
    /// Records a new action.
    #[must_use]
    pub fn record(
        task: Option<TaskId>,
        actor: Option<WorkerId>,
        kind: ActivityKind,
        description: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActivityId::new(),
            task,
            actor,
            kind,
            description: description.into(),
            created_at: at,
        }
    }

    /// Reconstructs a row from storage.
    #[must_use]
    pub const fn from_persisted(
        id: ActivityId,
        task: Option<TaskId>,
        actor: Option<WorkerId>,
        kind: ActivityKind,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task,
            actor,
            kind,
            description,
            created_at,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> ActivityId {
        self.id
    }

    /// Returns the task, unless it has since been deleted.
    #[must_use]
    pub const fn task(&self) -> Option<TaskId> {
        self.task
    }

    /// Returns the acting worker; `None` for system actions.
    #[must_use]
    pub const fn actor(&self) -> Option<WorkerId> {
        self.actor
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> ActivityKind {
        self.kind
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Drops the task reference after the task is deleted.
    pub(crate) const fn detach_task(&mut self) {
        self.task = None;
    }
}
