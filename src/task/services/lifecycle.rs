//! Task creation, editing, completion and deletion.

use super::{MutationHooks, TaskError, TaskResult};
use crate::persistence::{PageRequest, Paged};
use crate::task::{
    domain::{ActivityLog, CompletionStatus, Task, TaskDraft, TaskFilter, TaskId},
    ports::{ActivityLogRepository, ActivityQuery, TaskRepository},
};
use crate::worker::domain::{AccessDenied, Requester, WorkerId};
use crate::worker::ports::WorkerRepository;
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Task lifecycle orchestration.
///
/// Every write goes through [`MutationHooks`] so the activity log and
/// notifications commit together with the task.
pub struct TaskService<R, C>
where
    R: TaskRepository + ActivityLogRepository + WorkerRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    hooks: MutationHooks,
}

impl<R, C> Clone for TaskService<R, C>
where
    R: TaskRepository + ActivityLogRepository + WorkerRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
            hooks: self.hooks,
        }
    }
}

impl<R, C> TaskService<R, C>
where
    R: TaskRepository + ActivityLogRepository + WorkerRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, hooks: MutationHooks) -> Self {
        Self {
            repository,
            clock,
            hooks,
        }
    }

    /// Creates a task owned by the requester.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Domain`] for a past deadline and repository
    /// errors for dangling references.
    pub async fn create(&self, requester: &Requester, draft: TaskDraft) -> TaskResult<Task> {
        let task = Task::create(draft, requester.worker_id(), &*self.clock)?;
        let change_set =
            self.hooks
                .task_created(task.clone(), Some(requester.worker_id()), self.clock.utc());
        self.repository.apply(change_set).await?;
        info!(
            task_id = %task.id(),
            actor = %requester.worker_id(),
            assignees = task.assignees().len(),
            "task created"
        );
        Ok(task)
    }

    /// Replaces a task's editable fields.
    ///
    /// Saving without a meaningful change writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`], [`TaskError::AccessDenied`] unless
    /// the requester is the creator, an assignee or staff, and
    /// [`TaskError::Domain`] for a changed deadline in the past.
    pub async fn update(
        &self,
        requester: &Requester,
        id: TaskId,
        draft: TaskDraft,
    ) -> TaskResult<Task> {
        let before = self.managed(requester, id, "edit this task").await?;
        let after = before.revised(draft, &*self.clock)?;
        self.commit_update(requester, &before, after).await
    }

    /// Flips the completion flag.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] and [`TaskError::AccessDenied`] as
    /// for [`Self::update`].
    pub async fn toggle_completion(&self, requester: &Requester, id: TaskId) -> TaskResult<Task> {
        let before = self.managed(requester, id, "change this task's status").await?;
        let after = before.with_completion(!before.is_completed(), &*self.clock);
        self.commit_update(requester, &before, after).await
    }

    /// Deletes a task with its comments. Activity rows and notifications
    /// survive without the task reference.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] and [`TaskError::AccessDenied`] as
    /// for [`Self::update`].
    pub async fn delete(&self, requester: &Requester, id: TaskId) -> TaskResult<Task> {
        let task = self.managed(requester, id, "delete this task").await?;
        let change_set =
            self.hooks
                .task_deleted(&task, Some(requester.worker_id()), self.clock.utc());
        self.repository.apply(change_set).await?;
        info!(task_id = %id, actor = %requester.worker_id(), "task deleted");
        Ok(task)
    }

    /// Loads a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] when absent.
    pub async fn get(&self, id: TaskId) -> TaskResult<Task> {
        self.repository
            .find_task(id)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    /// Searches tasks, newest first. A filter matching nothing yields an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Repository`] when the lookup fails.
    pub async fn search(&self, filter: &TaskFilter) -> TaskResult<Vec<Task>> {
        Ok(self.repository.search(filter).await?)
    }

    /// One page of [`search`](Self::search) results plus the total count.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Repository`] when the lookup fails.
    pub async fn search_page(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> TaskResult<Paged<Task>> {
        Ok(self.repository.search_page(filter, page).await?)
    }

    /// Lists a worker's assigned tasks with the given status.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Repository`] when the lookup fails.
    pub async fn assigned_to(
        &self,
        worker: WorkerId,
        status: CompletionStatus,
    ) -> TaskResult<Vec<Task>> {
        self.search(&TaskFilter::assigned_to(worker, status)).await
    }

    /// Returns a task's activity, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] for an unknown task.
    pub async fn activity(&self, id: TaskId) -> TaskResult<Vec<ActivityLog>> {
        self.get(id).await?;
        Ok(self.repository.list_for_task(id).await?)
    }

    /// One page of activity across all tasks, newest first, for the
    /// read-only audit console.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::AccessDenied`] unless the requester is staff.
    pub async fn audit_trail(
        &self,
        requester: &Requester,
        query: &ActivityQuery,
        page: PageRequest,
    ) -> TaskResult<Paged<ActivityLog>> {
        requester.ensure_staff("view the activity log")?;
        Ok(self.repository.search_activity(query, page).await?)
    }

    async fn commit_update(
        &self,
        requester: &Requester,
        before: &Task,
        after: Task,
    ) -> TaskResult<Task> {
        let names = self.assignee_names(before, &after).await?;
        let Some(change_set) = self.hooks.task_updated(
            before,
            after.clone(),
            Some(requester.worker_id()),
            &names,
            self.clock.utc(),
        ) else {
            info!(task_id = %before.id(), "task saved without changes");
            return Ok(before.clone());
        };
        self.repository.apply(change_set).await?;
        info!(task_id = %after.id(), actor = %requester.worker_id(), "task updated");
        Ok(after)
    }

    async fn assignee_names(
        &self,
        before: &Task,
        after: &Task,
    ) -> TaskResult<HashMap<WorkerId, String>> {
        let changed: Vec<WorkerId> = before
            .assignees()
            .symmetric_difference(after.assignees())
            .copied()
            .collect();
        if changed.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(self
            .repository
            .find_many(&changed)
            .await?
            .into_iter()
            .map(|worker| (worker.id(), worker.full_name()))
            .collect())
    }

    async fn managed(&self, requester: &Requester, id: TaskId, action: &str) -> TaskResult<Task> {
        let task = self.get(id).await?;
        if !task.can_be_managed_by(requester) {
            warn!(task_id = %id, actor = %requester.worker_id(), action, "task access denied");
            return Err(AccessDenied::new(action).into());
        }
        Ok(task)
    }
}
