//! Request handlers and the view models they render.

pub(super) mod admin;
pub(super) mod auth;
pub(super) mod catalog;
pub(super) mod comments;
pub(super) mod dashboard;
pub(super) mod notifications;
pub(super) mod organisation;
pub(super) mod tasks;
pub(super) mod workers;

use super::{AppState, CurrentWorker, WebError, csrf::CsrfToken, session::{Flash, FlashLevel}};
use crate::organisation::domain::{ProjectId, TagId, TaskTypeId};
use crate::task::{
    domain::{ActivityLog, Notification, Task},
    services::DEADLINE_FORMAT,
};
use crate::worker::domain::{Worker, WorkerId};
use axum::response::{IntoResponse, Redirect, Response};
use chrono::{DateTime, Utc};
use minijinja::Value;
use mockable::Clock;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Layout data every page needs.
#[derive(Debug, Serialize)]
pub(super) struct Chrome {
    user: Option<UserBadge>,
    unread_count: usize,
    csrf_token: String,
    flashes: Vec<Flash>,
    poll_seconds: u64,
    language_code: String,
}

#[derive(Debug, Serialize)]
struct UserBadge {
    id: String,
    username: String,
    full_name: String,
    is_staff: bool,
    is_superuser: bool,
}

/// An identifier with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(super) struct Named {
    pub(super) id: String,
    pub(super) name: String,
}

impl Named {
    pub(super) fn new(id: impl ToString, name: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            name: name.into(),
        }
    }
}

/// Picker entry for forms with a current selection.
#[derive(Debug, Serialize)]
pub(super) struct Choice {
    id: String,
    name: String,
    selected: bool,
}

impl Choice {
    pub(super) fn new(id: impl ToString, name: impl Into<String>, selected: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.into(),
            selected,
        }
    }
}

impl AppState {
    /// Layout data for a signed-in worker; consumes pending flashes.
    pub(super) async fn chrome(
        &self,
        current: &CurrentWorker,
        csrf: &CsrfToken,
    ) -> Result<Chrome, WebError> {
        let worker = &current.worker;
        let unread_count = self.notifications.unread_count(worker.id()).await?;
        Ok(Chrome {
            user: Some(UserBadge {
                id: worker.id().to_string(),
                username: worker.username().to_string(),
                full_name: worker.full_name(),
                is_staff: worker.is_staff(),
                is_superuser: worker.is_superuser(),
            }),
            unread_count,
            csrf_token: csrf.0.clone(),
            flashes: self.sessions.take_flashes(&current.session),
            poll_seconds: self.config.poll_seconds,
            language_code: self.config.language_code.clone(),
        })
    }

    /// Layout data for the sign-in and registration pages.
    pub(super) fn anonymous_chrome(&self, csrf: &CsrfToken) -> Chrome {
        Chrome {
            user: None,
            unread_count: 0,
            csrf_token: csrf.0.clone(),
            flashes: Vec::new(),
            poll_seconds: self.config.poll_seconds,
            language_code: self.config.language_code.clone(),
        }
    }

    pub(super) fn render(&self, name: &str, context: Value) -> Result<Response, WebError> {
        Ok(self.templates.render(name, context)?.into_response())
    }

    /// Queues a toast and redirects.
    pub(super) fn redirect_with(
        &self,
        current: &CurrentWorker,
        level: FlashLevel,
        message: impl Into<String>,
        to: &str,
    ) -> Response {
        self.sessions.flash(&current.session, level, message);
        Redirect::to(to).into_response()
    }

    /// Formats a timestamp in the configured zone.
    pub(super) fn time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.config.zone)
            .format(DEADLINE_FORMAT)
            .to_string()
    }

    pub(super) fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }
}

/// Display names for everything a task references.
#[derive(Debug, Default)]
pub(super) struct Names {
    workers: HashMap<WorkerId, String>,
    projects: HashMap<ProjectId, String>,
    tags: HashMap<TagId, String>,
    task_types: HashMap<TaskTypeId, String>,
}

impl Names {
    /// Resolves the names referenced by `tasks`.
    pub(super) async fn for_tasks(state: &AppState, tasks: &[Task]) -> Result<Self, WebError> {
        let worker_ids: BTreeSet<WorkerId> = tasks
            .iter()
            .flat_map(|task| task.assignees().iter().copied().chain(task.created_by()))
            .collect();
        let mut names = Self::default();
        names.add_workers(state, worker_ids).await?;
        if tasks.iter().any(|task| task.project().is_some()) {
            names.projects = state
                .projects
                .list(None)
                .await?
                .into_iter()
                .map(|project| (project.id(), project.name().to_string()))
                .collect();
        }
        if tasks.iter().any(|task| !task.tags().is_empty()) {
            names.tags = state
                .catalog
                .list_tags(None)
                .await?
                .into_iter()
                .map(|tag| (tag.id(), tag.name().to_string()))
                .collect();
        }
        if tasks.iter().any(|task| task.task_type().is_some()) {
            names.task_types = state
                .catalog
                .list_task_types()
                .await?
                .into_iter()
                .map(|task_type| (task_type.id(), task_type.name().to_string()))
                .collect();
        }
        Ok(names)
    }

    /// Resolves the actors of activity rows.
    pub(super) async fn for_activity(
        state: &AppState,
        rows: &[ActivityLog],
    ) -> Result<Self, WebError> {
        let mut names = Self::default();
        names.extend_activity(state, rows).await?;
        Ok(names)
    }

    /// Adds the actors of `rows` to names already resolved.
    pub(super) async fn extend_activity(
        &mut self,
        state: &AppState,
        rows: &[ActivityLog],
    ) -> Result<(), WebError> {
        self.add_workers(state, rows.iter().filter_map(ActivityLog::actor).collect())
            .await
    }

    pub(super) async fn add_workers(
        &mut self,
        state: &AppState,
        ids: BTreeSet<WorkerId>,
    ) -> Result<(), WebError> {
        let missing: Vec<WorkerId> = ids
            .into_iter()
            .filter(|id| !self.workers.contains_key(id))
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        for worker in state.workers.find_many(&missing).await? {
            self.workers.insert(worker.id(), worker.full_name());
        }
        Ok(())
    }

    pub(super) fn worker(&self, id: WorkerId) -> String {
        self.workers
            .get(&id)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_owned())
    }

    /// One row of a task table.
    pub(super) fn task_row(
        &self,
        state: &AppState,
        task: &Task,
        viewer: &CurrentWorker,
    ) -> TaskRow {
        let now = state.now();
        TaskRow {
            id: task.id().to_string(),
            name: task.name().to_string(),
            description: task.description().to_owned(),
            priority: task.priority().as_str(),
            priority_class: task.priority().as_str().to_ascii_lowercase(),
            deadline: task.deadline().map(|at| state.time(at)),
            is_completed: task.is_completed(),
            is_overdue: task.is_overdue(now),
            completion: task.completion_percentage(),
            task_type: task
                .task_type()
                .and_then(|id| self.task_types.get(&id).cloned()),
            project: task.project().and_then(|id| {
                self.projects
                    .get(&id)
                    .map(|name| Named::new(id, name.clone()))
            }),
            tags: task
                .tags()
                .iter()
                .filter_map(|id| self.tags.get(id).map(|name| Named::new(id, name.clone())))
                .collect(),
            assignees: task
                .assignees()
                .iter()
                .map(|id| Named::new(id, self.worker(*id)))
                .collect(),
            created_by: task.created_by().map(|id| self.worker(id)),
            created_at: state.time(task.created_at()),
            can_manage: task.can_be_managed_by(&viewer.requester()),
        }
    }

    /// One activity row as the JSON endpoint and tables show it.
    pub(super) fn activity_row(&self, state: &AppState, row: &ActivityLog) -> ActivityRow {
        ActivityRow {
            user: row
                .actor()
                .map_or_else(|| "System".to_owned(), |id| self.worker(id)),
            kind: row.kind().label(),
            description: row.description().to_owned(),
            created_at: state.time(row.created_at()),
            task_id: row.task().map(|id| id.to_string()),
        }
    }
}

/// A task as list and detail pages show it.
#[derive(Debug, Serialize)]
pub(super) struct TaskRow {
    id: String,
    name: String,
    description: String,
    priority: &'static str,
    priority_class: String,
    deadline: Option<String>,
    is_completed: bool,
    is_overdue: bool,
    completion: u8,
    task_type: Option<String>,
    project: Option<Named>,
    tags: Vec<Named>,
    assignees: Vec<Named>,
    created_by: Option<String>,
    created_at: String,
    can_manage: bool,
}

/// An activity-log entry.
#[derive(Debug, Serialize)]
pub(super) struct ActivityRow {
    user: String,
    #[serde(rename = "type")]
    kind: &'static str,
    description: String,
    created_at: String,
    task_id: Option<String>,
}

/// A notification in lists, the dropdown and the admin console.
#[derive(Debug, Serialize)]
pub(super) struct NotificationRow {
    id: String,
    kind: &'static str,
    title: String,
    message: String,
    task_id: Option<String>,
    is_read: bool,
    created_at: String,
}

impl NotificationRow {
    pub(super) fn new(state: &AppState, notification: &Notification) -> Self {
        Self {
            id: notification.id().to_string(),
            kind: notification.kind().as_str(),
            title: notification.title().to_owned(),
            message: notification.message().to_owned(),
            task_id: notification.task().map(|id| id.to_string()),
            is_read: notification.is_read(),
            created_at: state.time(notification.created_at()),
        }
    }
}

/// A worker in pickers and member lists.
pub(super) fn worker_named(worker: &Worker) -> Named {
    Named::new(worker.id(), worker.to_string())
}
