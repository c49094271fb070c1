//! Task aggregate root.

use super::{Priority, TaskDomainError, TaskId};
use crate::identifier::bounded_text;
use crate::organisation::domain::{ProjectId, TagId, TaskTypeId};
use crate::worker::domain::{Requester, WorkerId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Validated task name, 1 to 200 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskName(String);

impl TaskName {
    /// Creates a validated task name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyName`] or
    /// [`TaskDomainError::NameTooLong`].
    pub fn new(value: &str) -> Result<Self, TaskDomainError> {
        bounded_text(
            value,
            200,
            || TaskDomainError::EmptyName,
            TaskDomainError::NameTooLong,
        )
        .map(Self)
    }

    /// Returns the name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Editable task fields as submitted by a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Task name.
    pub name: TaskName,
    /// Free-form description.
    pub description: String,
    /// Optional due date.
    pub deadline: Option<DateTime<Utc>>,
    /// Priority level.
    pub priority: Priority,
    /// Optional category.
    pub task_type: Option<TaskTypeId>,
    /// Attached tags.
    pub tags: BTreeSet<TagId>,
    /// Responsible workers.
    pub assignees: BTreeSet<WorkerId>,
    /// Owning project.
    pub project: Option<ProjectId>,
}

impl TaskDraft {
    /// Creates a draft with medium priority and no references.
    ///
    /// # Errors
    ///
    /// Returns the name validation error.
    pub fn new(name: &str, description: &str) -> Result<Self, TaskDomainError> {
        Ok(Self {
            name: TaskName::new(name)?,
            description: description.trim().to_owned(),
            deadline: None,
            priority: Priority::default(),
            task_type: None,
            tags: BTreeSet::new(),
            assignees: BTreeSet::new(),
            project: None,
        })
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the task type.
    #[must_use]
    pub const fn with_task_type(mut self, task_type: Option<TaskTypeId>) -> Self {
        self.task_type = task_type;
        self
    }

    /// Sets the tags.
    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Sets the assignees.
    #[must_use]
    pub fn with_assignees(mut self, assignees: impl IntoIterator<Item = WorkerId>) -> Self {
        self.assignees = assignees.into_iter().collect();
        self
    }

    /// Sets the project.
    #[must_use]
    pub const fn with_project(mut self, project: Option<ProjectId>) -> Self {
        self.project = project;
        self
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: TaskName,
    description: String,
    deadline: Option<DateTime<Utc>>,
    priority: Priority,
    is_completed: bool,
    task_type: Option<TaskTypeId>,
    tags: BTreeSet<TagId>,
    assignees: BTreeSet<WorkerId>,
    project: Option<ProjectId>,
    created_by: Option<WorkerId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted identifier.
    pub id: TaskId,
    /// Persisted editable fields.
    pub draft: TaskDraft,
    /// Persisted completion flag.
    pub is_completed: bool,
    /// Persisted creator.
    pub created_by: Option<WorkerId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted last-write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates an open task on behalf of `creator`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DeadlineInPast`] when the deadline is
    /// earlier than the clock's current time.
    pub fn create(
        draft: TaskDraft,
        creator: WorkerId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let now = clock.utc();
        ensure_deadline_not_past(draft.deadline, now)?;
        Ok(Self {
            id: TaskId::new(),
            name: draft.name,
            description: draft.description,
            deadline: draft.deadline,
            priority: draft.priority,
            is_completed: false,
            task_type: draft.task_type,
            tags: draft.tags,
            assignees: draft.assignees,
            project: draft.project,
            created_by: Some(creator),
            created_at: now,
            updated_at: now,
        })
    }

    /// Reconstructs a task from storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        let PersistedTaskData {
            id,
            draft,
            is_completed,
            created_by,
            created_at,
            updated_at,
        } = data;
        Self {
            id,
            name: draft.name,
            description: draft.description,
            deadline: draft.deadline,
            priority: draft.priority,
            is_completed,
            task_type: draft.task_type,
            tags: draft.tags,
            assignees: draft.assignees,
            project: draft.project,
            created_by,
            created_at,
            updated_at,
        }
    }

    /// Returns the edited copy of this task.
    ///
    /// A deadline that is unchanged is accepted even when it has passed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DeadlineInPast`] when a new or changed
    /// deadline is earlier than the clock's current time.
    pub fn revised(&self, draft: TaskDraft, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let now = clock.utc();
        if draft.deadline != self.deadline {
            ensure_deadline_not_past(draft.deadline, now)?;
        }
        Ok(Self {
            name: draft.name,
            description: draft.description,
            deadline: draft.deadline,
            priority: draft.priority,
            task_type: draft.task_type,
            tags: draft.tags,
            assignees: draft.assignees,
            project: draft.project,
            updated_at: now,
            ..self.clone()
        })
    }

    /// Returns a copy with the completion flag set to `completed`.
    #[must_use]
    pub fn with_completion(&self, completed: bool, clock: &impl Clock) -> Self {
        Self {
            is_completed: completed,
            updated_at: clock.utc(),
            ..self.clone()
        }
    }

    /// Returns the editable fields as a draft.
    #[must_use]
    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            deadline: self.deadline,
            priority: self.priority,
            task_type: self.task_type,
            tags: self.tags.clone(),
            assignees: self.assignees.clone(),
            project: self.project,
        }
    }

    /// Returns the identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the deadline.
    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the completion flag.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.is_completed
    }

    /// Returns the task type.
    #[must_use]
    pub const fn task_type(&self) -> Option<TaskTypeId> {
        self.task_type
    }

    /// Returns the tags.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<TagId> {
        &self.tags
    }

    /// Returns the assignees.
    #[must_use]
    pub const fn assignees(&self) -> &BTreeSet<WorkerId> {
        &self.assignees
    }

    /// Returns the project.
    #[must_use]
    pub const fn project(&self) -> Option<ProjectId> {
        self.project
    }

    /// Returns the creator, when known.
    #[must_use]
    pub const fn created_by(&self) -> Option<WorkerId> {
        self.created_by
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-write timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// 100 when completed, otherwise 0.
    #[must_use]
    pub const fn completion_percentage(&self) -> u8 {
        if self.is_completed { 100 } else { 0 }
    }

    /// Returns `true` for an open task whose deadline has passed.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_completed && self.deadline.is_some_and(|deadline| deadline < now)
    }

    /// Returns `true` when `worker` is assigned.
    #[must_use]
    pub fn is_assigned_to(&self, worker: WorkerId) -> bool {
        self.assignees.contains(&worker)
    }

    /// Returns `true` when the requester may edit, toggle or delete the
    /// task: its creator, an assignee, or staff.
    #[must_use]
    pub fn can_be_managed_by(&self, requester: &Requester) -> bool {
        requester.is_staff()
            || self.created_by == Some(requester.worker_id())
            || self.is_assigned_to(requester.worker_id())
    }

    pub(crate) const fn detach_project(&mut self) {
        self.project = None;
    }

    pub(crate) const fn detach_task_type(&mut self) {
        self.task_type = None;
    }

    pub(crate) fn remove_tag(&mut self, tag: TagId) {
        self.tags.remove(&tag);
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.priority)
    }
}

fn ensure_deadline_not_past(
    deadline: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), TaskDomainError> {
    match deadline {
        Some(value) if value < now => Err(TaskDomainError::DeadlineInPast),
        _ => Ok(()),
    }
}
