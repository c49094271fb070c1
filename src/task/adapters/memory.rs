//! Task ports over the in-memory store.
//!
//! [`TaskRepository::apply`] validates a whole change set under the write
//! lock before mutating anything, so a rejected change set leaves every
//! table untouched.

use crate::persistence::memory::{Tables, newest_first};
use crate::persistence::{InMemoryStore, PageRequest, Paged};
use crate::task::{
    domain::{
        ActivityId, ActivityLog, Comment, CommentId, Notification, NotificationId, Priority, Task,
        TaskChangeSet, TaskFilter, TaskId, TaskWrite,
    },
    ports::{
        ActivityLogRepository, ActivityQuery, NotificationQuery, NotificationRepository,
        TaskRepository, TaskRepositoryError, TaskRepositoryResult, TaskStatistics,
    },
};
use crate::worker::domain::WorkerId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

fn check_worker(tables: &Tables, worker: WorkerId) -> TaskRepositoryResult<()> {
    if tables.workers.contains_key(&worker) {
        Ok(())
    } else {
        Err(TaskRepositoryError::UnknownWorker(worker))
    }
}

fn check_task_references(tables: &Tables, task: &Task) -> TaskRepositoryResult<()> {
    if let Some(creator) = task.created_by() {
        check_worker(tables, creator)?;
    }
    for assignee in task.assignees() {
        check_worker(tables, *assignee)?;
    }
    if let Some(project) = task.project() {
        if !tables.projects.contains_key(&project) {
            return Err(TaskRepositoryError::UnknownProject(project));
        }
    }
    if let Some(task_type) = task.task_type() {
        if !tables.task_types.contains_key(&task_type) {
            return Err(TaskRepositoryError::UnknownTaskType(task_type));
        }
    }
    if let Some(tag) = task.tags().iter().find(|tag| !tables.tags.contains_key(tag)) {
        return Err(TaskRepositoryError::UnknownTag(*tag));
    }
    Ok(())
}

fn validate_write(tables: &Tables, write: &TaskWrite) -> TaskRepositoryResult<()> {
    match write {
        TaskWrite::InsertTask(task) => {
            if tables.tasks.contains_key(&task.id()) {
                return Err(TaskRepositoryError::DuplicateTask(task.id()));
            }
            check_task_references(tables, task)
        }
        TaskWrite::UpdateTask(task) => {
            if !tables.tasks.contains_key(&task.id()) {
                return Err(TaskRepositoryError::NotFound(task.id()));
            }
            check_task_references(tables, task)
        }
        TaskWrite::DeleteTask(id) => {
            if tables.tasks.contains_key(id) {
                Ok(())
            } else {
                Err(TaskRepositoryError::NotFound(*id))
            }
        }
        TaskWrite::InsertComment(comment) => {
            if tables.comments.contains_key(&comment.id()) {
                return Err(TaskRepositoryError::DuplicateComment(comment.id()));
            }
            if !tables.tasks.contains_key(&comment.task()) {
                return Err(TaskRepositoryError::NotFound(comment.task()));
            }
            check_worker(tables, comment.author())
        }
        TaskWrite::UpdateComment(comment) => {
            if tables.comments.contains_key(&comment.id()) {
                Ok(())
            } else {
                Err(TaskRepositoryError::CommentNotFound(comment.id()))
            }
        }
        TaskWrite::DeleteComment(id) => {
            if tables.comments.contains_key(id) {
                Ok(())
            } else {
                Err(TaskRepositoryError::CommentNotFound(*id))
            }
        }
    }
}

fn validate(tables: &Tables, change_set: &TaskChangeSet) -> TaskRepositoryResult<()> {
    validate_write(tables, &change_set.write)?;
    for row in &change_set.activity {
        if let Some(actor) = row.actor() {
            check_worker(tables, actor)?;
        }
    }
    for notification in &change_set.notifications {
        check_worker(tables, notification.recipient())?;
    }
    Ok(())
}

fn commit(tables: &mut Tables, change_set: TaskChangeSet) {
    match change_set.write {
        TaskWrite::InsertTask(task) | TaskWrite::UpdateTask(task) => {
            tables.tasks.insert(task.id(), task);
        }
        TaskWrite::DeleteTask(id) => {
            tables.tasks.remove(&id);
            tables.comments.retain(|_, comment| comment.task() != id);
            for row in tables.activity.iter_mut().filter(|row| row.task() == Some(id)) {
                row.detach_task();
            }
            for notification in tables
                .notifications
                .values_mut()
                .filter(|notification| notification.task() == Some(id))
            {
                notification.detach_task();
            }
        }
        TaskWrite::InsertComment(comment) | TaskWrite::UpdateComment(comment) => {
            tables.comments.insert(comment.id(), comment);
        }
        TaskWrite::DeleteComment(id) => {
            tables.comments.remove(&id);
        }
    }
    tables.activity.extend(change_set.activity);
    tables.notifications.extend(
        change_set
            .notifications
            .into_iter()
            .map(|notification| (notification.id(), notification)),
    );
}

/// Activity rows newest first; rows sharing a timestamp keep reverse
/// insertion order.
fn recent_activity<'a>(rows: impl DoubleEndedIterator<Item = &'a ActivityLog>) -> Vec<ActivityLog> {
    let mut rows: Vec<ActivityLog> = rows.rev().cloned().collect();
    newest_first(&mut rows, ActivityLog::created_at);
    rows
}

fn matching_tasks(tables: &Tables, filter: &TaskFilter) -> Vec<Task> {
    let mut tasks: Vec<Task> = tables
        .tasks
        .values()
        .filter(|task| filter.matches(task))
        .cloned()
        .collect();
    tasks.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| left.id().cmp(&right.id()))
    });
    tasks
}

fn username(tables: &Tables, worker: Option<WorkerId>) -> String {
    worker
        .and_then(|id| tables.workers.get(&id))
        .map(|worker| worker.username().as_str().to_owned())
        .unwrap_or_default()
}

fn activity_matches(tables: &Tables, query: &ActivityQuery, row: &ActivityLog) -> bool {
    if query.kind.is_some_and(|kind| row.kind() != kind) {
        return false;
    }
    let Some(needle) = query.needle() else {
        return true;
    };
    let task_name = row
        .task()
        .and_then(|id| tables.tasks.get(&id))
        .map(|task| task.name().as_str().to_owned())
        .unwrap_or_default();
    [row.description(), task_name.as_str(), username(tables, row.actor()).as_str()]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn sorted_notifications<'a>(rows: impl Iterator<Item = &'a Notification>) -> Vec<Notification> {
    let mut rows: Vec<Notification> = rows.cloned().collect();
    rows.sort_by(|left, right| {
        right
            .created_at()
            .cmp(&left.created_at())
            .then_with(|| left.id().cmp(&right.id()))
    });
    rows
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn apply(&self, change_set: TaskChangeSet) -> TaskRepositoryResult<()> {
        let mut tables = self.write()?;
        validate(&tables, &change_set)?;
        commit(&mut tables, change_set);
        Ok(())
    }

    async fn find_task(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn search(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>> {
        Ok(matching_tasks(&*self.read()?, filter))
    }

    async fn search_page(
        &self,
        filter: &TaskFilter,
        page: PageRequest,
    ) -> TaskRepositoryResult<Paged<Task>> {
        Ok(Paged::slice(matching_tasks(&*self.read()?, filter), page))
    }

    async fn statistics(
        &self,
        viewer: WorkerId,
        now: DateTime<Utc>,
    ) -> TaskRepositoryResult<TaskStatistics> {
        let tables = self.read()?;
        let mut stats = TaskStatistics::default();
        let mut open_counts: HashMap<Priority, usize> = HashMap::new();
        for task in tables.tasks.values() {
            stats.total += 1;
            let mine = task.is_assigned_to(viewer);
            if task.is_completed() {
                stats.completed += 1;
                stats.my_completed += usize::from(mine);
            } else {
                stats.overdue += usize::from(task.is_overdue(now));
                stats.my_open += usize::from(mine);
                *open_counts.entry(task.priority()).or_default() += 1;
            }
        }
        stats.open_by_priority = TaskStatistics::priority_breakdown(&open_counts);
        Ok(stats)
    }

    async fn due_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        limit: usize,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let tables = self.read()?;
        let mut due: Vec<Task> = tables
            .tasks
            .values()
            .filter(|task| {
                !task.is_completed()
                    && task
                        .deadline()
                        .is_some_and(|deadline| deadline >= from && deadline <= until)
            })
            .cloned()
            .collect();
        due.sort_by(|left, right| {
            left.deadline()
                .cmp(&right.deadline())
                .then_with(|| left.id().cmp(&right.id()))
        });
        due.truncate(limit);
        Ok(due)
    }

    async fn find_comment(&self, id: CommentId) -> TaskRepositoryResult<Option<Comment>> {
        Ok(self.read()?.comments.get(&id).cloned())
    }

    async fn list_comments(&self, task: TaskId) -> TaskRepositoryResult<Vec<Comment>> {
        let tables = self.read()?;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|comment| comment.task() == task)
            .cloned()
            .collect();
        newest_first(&mut comments, Comment::created_at);
        Ok(comments)
    }
}

#[async_trait]
impl ActivityLogRepository for InMemoryStore {
    async fn list_for_task(&self, task: TaskId) -> TaskRepositoryResult<Vec<ActivityLog>> {
        let tables = self.read()?;
        let rows: Vec<&ActivityLog> = tables
            .activity
            .iter()
            .filter(|row| row.task() == Some(task))
            .collect();
        Ok(recent_activity(rows.into_iter()))
    }

    async fn list_recent(&self, limit: usize) -> TaskRepositoryResult<Vec<ActivityLog>> {
        let mut rows = recent_activity(self.read()?.activity.iter());
        rows.truncate(limit);
        Ok(rows)
    }

    async fn search_activity(
        &self,
        query: &ActivityQuery,
        page: PageRequest,
    ) -> TaskRepositoryResult<Paged<ActivityLog>> {
        let tables = self.read()?;
        let rows: Vec<&ActivityLog> = tables
            .activity
            .iter()
            .filter(|row| activity_matches(&tables, query, row))
            .collect();
        Ok(Paged::slice(recent_activity(rows.into_iter()), page))
    }

    async fn find_activity(&self, id: ActivityId) -> TaskRepositoryResult<Option<ActivityLog>> {
        Ok(self
            .read()?
            .activity
            .iter()
            .find(|row| row.id() == id)
            .cloned())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryStore {
    async fn list_notifications(
        &self,
        query: &NotificationQuery,
        page: PageRequest,
    ) -> TaskRepositoryResult<Paged<Notification>> {
        let tables = self.read()?;
        let rows = sorted_notifications(tables.notifications.values().filter(|notification| {
            query.matches(notification, &username(&tables, Some(notification.recipient())))
        }));
        Ok(Paged::slice(rows, page))
    }

    async fn unread_count(&self, recipient: WorkerId) -> TaskRepositoryResult<usize> {
        Ok(self
            .read()?
            .notifications
            .values()
            .filter(|notification| notification.recipient() == recipient && !notification.is_read())
            .count())
    }

    async fn find_notification(
        &self,
        id: NotificationId,
    ) -> TaskRepositoryResult<Option<Notification>> {
        Ok(self.read()?.notifications.get(&id).cloned())
    }

    async fn set_read_state(
        &self,
        ids: &[NotificationId],
        read: bool,
    ) -> TaskRepositoryResult<usize> {
        let mut tables = self.write()?;
        let mut changed = 0;
        for id in ids {
            if let Some(notification) = tables.notifications.get_mut(id) {
                if notification.set_read(read) {
                    changed += 1;
                }
            }
        }
        Ok(changed)
    }

    async fn mark_all_read(&self, recipient: WorkerId) -> TaskRepositoryResult<usize> {
        let mut tables = self.write()?;
        Ok(tables
            .notifications
            .values_mut()
            .filter(|notification| notification.recipient() == recipient)
            .map(|notification| notification.set_read(true))
            .filter(|changed| *changed)
            .count())
    }
}
