//! Activity and notification generation for task-aggregate writes.
//!
//! Each method turns one triggering write into a [`TaskChangeSet`] holding
//! exactly one activity row and at most one notification per recipient.
//! Nothing here performs I/O; the caller commits the change set through
//! [`TaskRepository::apply`](crate::task::ports::TaskRepository::apply).

use crate::task::domain::{
    ActivityKind, ActivityLog, Comment, FieldChange, Notification, NotificationKind, Task,
    TaskChangeSet, TaskDiff, TaskWrite,
};
use crate::worker::domain::WorkerId;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::collections::{BTreeSet, HashMap};

/// Display format for deadlines in activity and notification text.
pub const DEADLINE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Builds the side effects of task and comment writes.
#[derive(Debug, Clone, Copy)]
pub struct MutationHooks {
    zone: Tz,
}

impl MutationHooks {
    /// Creates hooks rendering timestamps in `zone`.
    #[must_use]
    pub const fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Returns the display time zone.
    #[must_use]
    pub const fn zone(&self) -> Tz {
        self.zone
    }

    /// A new task: one `created` row and a `task_assigned` notification per
    /// assignee.
    #[must_use]
    pub fn task_created(&self, task: Task, actor: Option<WorkerId>, at: DateTime<Utc>) -> TaskChangeSet {
        let activity = ActivityLog::record(
            Some(task.id()),
            actor,
            ActivityKind::Created,
            format!("Task \"{}\" created", task.name()),
            at,
        );
        let notifications = assignment_notices(&task, task.assignees(), at);
        TaskChangeSet {
            write: TaskWrite::InsertTask(task),
            activity: vec![activity],
            notifications,
        }
    }

    /// An edited task, or `None` when nothing meaningful changed.
    ///
    /// `names` maps added and removed assignees to display names.
    #[must_use]
    pub fn task_updated(
        &self,
        before: &Task,
        after: Task,
        actor: Option<WorkerId>,
        names: &HashMap<WorkerId, String>,
        at: DateTime<Utc>,
    ) -> Option<TaskChangeSet> {
        let diff = TaskDiff::between(before, &after);
        if diff.is_empty() {
            return None;
        }
        let (added, removed) = diff.assignee_changes();
        let (kind, description) = if diff.only_completion() {
            if diff.became_completed() {
                (ActivityKind::Completed, format!("Task \"{}\" completed", after.name()))
            } else {
                (ActivityKind::Reopened, format!("Task \"{}\" reopened", after.name()))
            }
        } else if diff.only_assignees() {
            self.assignment_activity(&added, &removed, names)
        } else {
            let summary: Vec<String> = diff
                .changes()
                .iter()
                .map(|change| self.describe(change))
                .collect();
            (
                ActivityKind::Updated,
                format!("Task \"{}\" updated: {}", after.name(), summary.join("; ")),
            )
        };
        let activity = ActivityLog::record(Some(after.id()), actor, kind, description, at);

        let mut notifications = assignment_notices(&after, &added, at);
        let facing = diff.assignee_facing();
        if !facing.is_empty() {
            let notice_kind = if diff.became_completed() {
                NotificationKind::TaskCompleted
            } else {
                NotificationKind::TaskUpdated
            };
            let summary: Vec<String> = facing.iter().map(|change| self.describe(change)).collect();
            let message = format!("Task \"{}\": {}", after.name(), summary.join("; "));
            notifications.extend(
                after
                    .assignees()
                    .iter()
                    .filter(|worker| !added.contains(worker))
                    .map(|worker| {
                        Notification::unread(
                            *worker,
                            notice_kind,
                            notice_kind.label(),
                            message.clone(),
                            Some(after.id()),
                            at,
                        )
                    }),
            );
        }

        Some(TaskChangeSet {
            write: TaskWrite::UpdateTask(after),
            activity: vec![activity],
            notifications,
        })
    }

    /// A deleted task: one `deleted` row without a task reference.
    #[must_use]
    pub fn task_deleted(&self, task: &Task, actor: Option<WorkerId>, at: DateTime<Utc>) -> TaskChangeSet {
        TaskChangeSet {
            write: TaskWrite::DeleteTask(task.id()),
            activity: vec![ActivityLog::record(
                None,
                actor,
                ActivityKind::Deleted,
                format!("Task \"{}\" deleted", task.name()),
                at,
            )],
            notifications: Vec::new(),
        }
    }

    /// A new comment: one `commented` row, a notification for every
    /// assignee except the author, and one for the creator when they are
    /// neither the author nor an assignee.
    #[must_use]
    pub fn comment_added(
        &self,
        task: &Task,
        comment: Comment,
        author_name: &str,
        at: DateTime<Utc>,
    ) -> TaskChangeSet {
        let author = comment.author();
        let activity = ActivityLog::record(
            Some(task.id()),
            Some(author),
            ActivityKind::Commented,
            format!("{author_name} added a comment"),
            at,
        );
        let mut notifications: Vec<Notification> = task
            .assignees()
            .iter()
            .filter(|worker| **worker != author)
            .map(|worker| {
                Notification::unread(
                    *worker,
                    NotificationKind::TaskCommented,
                    NotificationKind::TaskCommented.label(),
                    format!("{author_name} commented on task: {}", task.name()),
                    Some(task.id()),
                    at,
                )
            })
            .collect();
        if let Some(creator) = task
            .created_by()
            .filter(|creator| *creator != author && !task.is_assigned_to(*creator))
        {
            notifications.push(Notification::unread(
                creator,
                NotificationKind::TaskCommented,
                NotificationKind::TaskCommented.label(),
                format!("{author_name} commented on your task: {}", task.name()),
                Some(task.id()),
                at,
            ));
        }
        TaskChangeSet {
            write: TaskWrite::InsertComment(comment),
            activity: vec![activity],
            notifications,
        }
    }

    /// Formats a timestamp in the display zone.
    #[must_use]
    pub fn format_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.zone).format(DEADLINE_FORMAT).to_string()
    }

    fn assignment_activity(
        &self,
        added: &BTreeSet<WorkerId>,
        removed: &BTreeSet<WorkerId>,
        names: &HashMap<WorkerId, String>,
    ) -> (ActivityKind, String) {
        let list = |ids: &BTreeSet<WorkerId>| {
            ids.iter()
                .map(|id| names.get(id).cloned().unwrap_or_else(|| id.to_string()))
                .collect::<Vec<_>>()
                .join(", ")
        };
        match (added.is_empty(), removed.is_empty()) {
            (false, true) => (ActivityKind::Assigned, format!("{} assigned to task", list(added))),
            (true, false) => (
                ActivityKind::Unassigned,
                format!("{} removed from task", list(removed)),
            ),
            _ => (
                ActivityKind::Assigned,
                format!(
                    "{} assigned to task; {} removed from task",
                    list(added),
                    list(removed)
                ),
            ),
        }
    }

    fn describe(&self, change: &FieldChange) -> String {
        match change {
            FieldChange::Name { from, to } => format!("name changed from \"{from}\" to \"{to}\""),
            FieldChange::Description => "description changed".to_owned(),
            FieldChange::Deadline { from, to } => format!(
                "deadline changed from {} to {}",
                self.deadline_text(*from),
                self.deadline_text(*to)
            ),
            FieldChange::Priority { from, to } => {
                format!("priority changed from {from} to {to}")
            }
            FieldChange::Completion { completed: true } => "marked as completed".to_owned(),
            FieldChange::Completion { completed: false } => "marked as incomplete".to_owned(),
            FieldChange::TaskType => "task type changed".to_owned(),
            FieldChange::Tags => "tags changed".to_owned(),
            FieldChange::Project => "project changed".to_owned(),
            FieldChange::Assignees { .. } => "assignees changed".to_owned(),
        }
    }

    fn deadline_text(&self, deadline: Option<DateTime<Utc>>) -> String {
        deadline.map_or_else(|| "none".to_owned(), |at| self.format_time(at))
    }
}

fn assignment_notices(
    task: &Task,
    recipients: &BTreeSet<WorkerId>,
    at: DateTime<Utc>,
) -> Vec<Notification> {
    recipients
        .iter()
        .map(|worker| {
            Notification::unread(
                *worker,
                NotificationKind::TaskAssigned,
                "New Task",
                format!("You have been assigned a task: {}", task.name()),
                Some(task.id()),
                at,
            )
        })
        .collect()
}
