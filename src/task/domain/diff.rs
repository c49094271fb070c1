//! Field-level comparison of a task before and after an edit.

use super::{Priority, Task, TaskName};
use crate::worker::domain::WorkerId;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// One meaningful change between two versions of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// The name changed.
    Name {
        /// Previous name.
        from: TaskName,
        /// New name.
        to: TaskName,
    },
    /// The description changed.
    Description,
    /// The deadline changed.
    Deadline {
        /// Previous deadline.
        from: Option<DateTime<Utc>>,
        /// New deadline.
        to: Option<DateTime<Utc>>,
    },
    /// The priority changed.
    Priority {
        /// Previous priority.
        from: Priority,
        /// New priority.
        to: Priority,
    },
    /// The completion flag flipped.
    Completion {
        /// New completion state.
        completed: bool,
    },
    /// The task type changed.
    TaskType,
    /// The tag set changed.
    Tags,
    /// The project changed.
    Project,
    /// The assignee set changed.
    Assignees {
        /// Workers added.
        added: BTreeSet<WorkerId>,
        /// Workers removed.
        removed: BTreeSet<WorkerId>,
    },
}

impl FieldChange {
    /// Returns `true` for changes current assignees are notified about.
    #[must_use]
    pub const fn concerns_assignees(&self) -> bool {
        matches!(
            self,
            Self::Deadline { .. } | Self::Priority { .. } | Self::Completion { .. }
        )
    }
}

/// Ordered list of the changes between a persisted task and its edit.
///
/// Timestamps are ignored, so re-saving an unchanged task yields an empty
/// diff.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDiff {
    changes: Vec<FieldChange>,
}

impl TaskDiff {
    /// Compares `before` with `after`.
    #[must_use]
    pub fn between(before: &Task, after: &Task) -> Self {
        let mut changes = Vec::new();
        if before.name() != after.name() {
            changes.push(FieldChange::Name {
                from: before.name().clone(),
                to: after.name().clone(),
            });
        }
        if before.description() != after.description() {
            changes.push(FieldChange::Description);
        }
        if before.deadline() != after.deadline() {
            changes.push(FieldChange::Deadline {
                from: before.deadline(),
                to: after.deadline(),
            });
        }
        if before.priority() != after.priority() {
            changes.push(FieldChange::Priority {
                from: before.priority(),
                to: after.priority(),
            });
        }
        if before.is_completed() != after.is_completed() {
            changes.push(FieldChange::Completion {
                completed: after.is_completed(),
            });
        }
        if before.task_type() != after.task_type() {
            changes.push(FieldChange::TaskType);
        }
        if before.tags() != after.tags() {
            changes.push(FieldChange::Tags);
        }
        if before.project() != after.project() {
            changes.push(FieldChange::Project);
        }
        if before.assignees() != after.assignees() {
            changes.push(FieldChange::Assignees {
                added: after.assignees().difference(before.assignees()).copied().collect(),
                removed: before.assignees().difference(after.assignees()).copied().collect(),
            });
        }
        Self { changes }
    }

    /// Returns `true` when nothing meaningful changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns the changes in field order.
    #[must_use]
    pub fn changes(&self) -> &[FieldChange] {
        &self.changes
    }

    /// Returns the new completion state when it flipped.
    #[must_use]
    pub fn completion(&self) -> Option<bool> {
        self.changes.iter().find_map(|change| match change {
            FieldChange::Completion { completed } => Some(*completed),
            _ => None,
        })
    }

    /// Returns `true` when the task went from open to completed.
    #[must_use]
    pub fn became_completed(&self) -> bool {
        self.completion() == Some(true)
    }

    /// Returns the added and removed assignees.
    #[must_use]
    pub fn assignee_changes(&self) -> (BTreeSet<WorkerId>, BTreeSet<WorkerId>) {
        self.changes
            .iter()
            .find_map(|change| match change {
                FieldChange::Assignees { added, removed } => Some((added.clone(), removed.clone())),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Returns `true` when completion is the only change.
    #[must_use]
    pub fn only_completion(&self) -> bool {
        matches!(self.changes.as_slice(), [FieldChange::Completion { .. }])
    }

    /// Returns `true` when the assignee set is the only change.
    #[must_use]
    pub fn only_assignees(&self) -> bool {
        matches!(self.changes.as_slice(), [FieldChange::Assignees { .. }])
    }

    /// Returns the deadline, priority and completion changes.
    #[must_use]
    pub fn assignee_facing(&self) -> Vec<&FieldChange> {
        self.changes
            .iter()
            .filter(|change| change.concerns_assignees())
            .collect()
    }
}
