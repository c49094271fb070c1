//! Search and filter criteria over tasks.

use super::{Priority, Task};
use crate::organisation::domain::{ProjectId, TagId, TaskTypeId};
use crate::worker::domain::WorkerId;

/// Completion state filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// Completed tasks only.
    Completed,
    /// Open tasks only.
    Incomplete,
}

impl CompletionStatus {
    /// Parses the `status` query value; unknown values mean no filter.
    #[must_use]
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "completed" => Some(Self::Completed),
            "incomplete" => Some(Self::Incomplete),
            _ => None,
        }
    }

    /// Returns the query value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
        }
    }
}

/// Substring search plus equality filters. Every set criterion must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Case-insensitive substring over name and description.
    pub search: Option<String>,
    /// Completion state.
    pub status: Option<CompletionStatus>,
    /// Exact priority.
    pub priority: Option<Priority>,
    /// Exact task type.
    pub task_type: Option<TaskTypeId>,
    /// Tag that must be attached.
    pub tag: Option<TagId>,
    /// Worker who must be assigned.
    pub assignee: Option<WorkerId>,
    /// Owning project.
    pub project: Option<ProjectId>,
}

impl TaskFilter {
    /// Tasks assigned to `worker` with the given completion state.
    #[must_use]
    pub fn assigned_to(worker: WorkerId, status: CompletionStatus) -> Self {
        Self {
            assignee: Some(worker),
            status: Some(status),
            ..Self::default()
        }
    }

    /// Returns the search needle, lower-cased, when it is not blank.
    #[must_use]
    pub fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_lowercase)
    }

    /// Returns `true` when `task` satisfies every criterion.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(needle) = self.needle() {
            let hit = task.name().as_str().to_lowercase().contains(&needle)
                || task.description().to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        let status_ok = match self.status {
            Some(CompletionStatus::Completed) => task.is_completed(),
            Some(CompletionStatus::Incomplete) => !task.is_completed(),
            None => true,
        };
        status_ok
            && self.priority.is_none_or(|priority| task.priority() == priority)
            && self
                .task_type
                .is_none_or(|task_type| task.task_type() == Some(task_type))
            && self.tag.is_none_or(|tag| task.tags().contains(&tag))
            && self
                .assignee
                .is_none_or(|worker| task.is_assigned_to(worker))
            && self
                .project
                .is_none_or(|project| task.project() == Some(project))
    }
}
