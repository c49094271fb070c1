//! Task list, detail, form and state-change handlers.

use super::{Choice, Names};
use crate::organisation::domain::{ProjectId, TagId, TaskTypeId};
use crate::persistence::PageRequest;
use crate::task::{
    domain::{CompletionStatus, Priority, Task, TaskDraft, TaskFilter, TaskId},
    services::TaskError,
};
use crate::web::{
    path::IdPath,
    Ajax, AppState, CurrentWorker, WebError,
    csrf::CsrfToken,
    error::is_ajax,
    forms::{FormErrors, FormFailure, RawForm, deadline_input, parse_deadline},
    pagination::{Page, TASKS_PER_PAGE},
    session::FlashLevel,
};
use crate::worker::domain::WorkerId;
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Query string of the task list. Unparseable values are ignored.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub(in crate::web) struct TaskListQuery {
    #[serde(default)]
    search: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    project: String,
    #[serde(default)]
    task_type: String,
    #[serde(default)]
    tag: String,
    #[serde(default)]
    assignee: String,
    #[serde(default, skip_serializing)]
    page: Option<String>,
}

impl TaskListQuery {
    fn filter(&self) -> TaskFilter {
        TaskFilter {
            search: Some(self.search.trim().to_owned()).filter(|value| !value.is_empty()),
            status: CompletionStatus::from_query(&self.status),
            priority: Priority::try_from(self.priority.as_str()).ok(),
            task_type: self.task_type.parse::<TaskTypeId>().ok(),
            tag: self.tag.parse::<TagId>().ok(),
            assignee: self.assignee.parse::<WorkerId>().ok(),
            project: self.project.parse::<ProjectId>().ok(),
        }
    }

    /// The active filters as a query string for pagination links.
    fn carried(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in [
            ("search", &self.search),
            ("status", &self.status),
            ("priority", &self.priority),
            ("project", &self.project),
            ("task_type", &self.task_type),
            ("tag", &self.tag),
            ("assignee", &self.assignee),
        ] {
            if !value.trim().is_empty() {
                query.append_pair(key, value.trim());
            }
        }
        query.finish()
    }
}

pub(in crate::web) async fn list(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    Query(query): Query<TaskListQuery>,
) -> Result<Response, WebError> {
    let request = PageRequest::parse(query.page.as_deref(), TASKS_PER_PAGE);
    let page = Page::from(state.tasks.search_page(&query.filter(), request).await?);
    let names = Names::for_tasks(&state, &page.items).await?;
    let page = page.map(|task| names.task_row(&state, &task, &current));
    let pickers = Pickers::load(&state).await?;

    state.render(
        "tasks/list.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            page => page,
            filters => &query,
            carried => query.carried(),
            statuses => [CompletionStatus::Incomplete.as_str(), CompletionStatus::Completed.as_str()],
            priorities => Priority::ALL.map(Priority::as_str),
            projects => pickers.projects,
            task_types => pickers.task_types,
            tags => pickers.tags,
            workers => pickers.workers,
        },
    )
}

pub(in crate::web) async fn mine(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
) -> Result<Response, WebError> {
    let me = current.worker.id();
    let incomplete = state.tasks.assigned_to(me, CompletionStatus::Incomplete).await?;
    let completed = state.tasks.assigned_to(me, CompletionStatus::Completed).await?;
    let mut both = incomplete.clone();
    both.extend(completed.iter().cloned());
    let names = Names::for_tasks(&state, &both).await?;
    let rows = |tasks: &[Task]| -> Vec<_> {
        tasks
            .iter()
            .map(|task| names.task_row(&state, task, &current))
            .collect()
    };

    state.render(
        "tasks/mine.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            incomplete => rows(&incomplete),
            completed => rows(&completed),
        },
    )
}

pub(in crate::web) async fn detail(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TaskId>,
) -> Result<Response, WebError> {
    let task = state.tasks.get(id).await?;
    let comments = state.comments.list(id).await?;
    let activity = state.tasks.activity(id).await?;

    let mut names = Names::for_tasks(&state, std::slice::from_ref(&task)).await?;
    names.extend_activity(&state, &activity).await?;
    names
        .add_workers(&state, comments.iter().map(|comment| comment.author()).collect())
        .await?;

    let requester = current.requester();
    let comment_rows: Vec<CommentRow> = comments
        .iter()
        .map(|comment| CommentRow {
            id: comment.id().to_string(),
            author: names.worker(comment.author()),
            content: comment.content().as_str().to_owned(),
            created_at: state.time(comment.created_at()),
            edited: comment.updated_at() > comment.created_at(),
            can_edit: comment.can_be_edited_by(&requester),
        })
        .collect();
    let activity_rows: Vec<_> = activity
        .iter()
        .map(|row| names.activity_row(&state, row))
        .collect();

    state.render(
        "tasks/detail.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            task => names.task_row(&state, &task, &current),
            comments => comment_rows,
            activity => activity_rows,
        },
    )
}

#[derive(Debug, Serialize)]
struct CommentRow {
    id: String,
    author: String,
    content: String,
    created_at: String,
    edited: bool,
    can_edit: bool,
}

/// Every selectable reference for task forms and list filters.
struct Pickers {
    projects: Vec<Choice>,
    task_types: Vec<Choice>,
    tags: Vec<Choice>,
    workers: Vec<Choice>,
}

impl Pickers {
    async fn load(state: &AppState) -> Result<Self, WebError> {
        Self::selecting(state, &FormSelection::default()).await
    }

    async fn selecting(state: &AppState, chosen: &FormSelection) -> Result<Self, WebError> {
        let projects = state
            .projects
            .list(None)
            .await?
            .into_iter()
            .map(|project| {
                let selected = chosen.project == Some(project.id());
                Choice::new(project.id(), project.name().as_str(), selected)
            })
            .collect();
        let task_types = state
            .catalog
            .list_task_types()
            .await?
            .into_iter()
            .map(|task_type| {
                let selected = chosen.task_type == Some(task_type.id());
                Choice::new(task_type.id(), task_type.name().as_str(), selected)
            })
            .collect();
        let tags = state
            .catalog
            .list_tags(None)
            .await?
            .into_iter()
            .map(|tag| {
                let selected = chosen.tags.contains(&tag.id());
                Choice::new(tag.id(), tag.name().as_str(), selected)
            })
            .collect();
        let workers = state
            .workers
            .list_active()
            .await?
            .into_iter()
            .map(|worker| {
                let selected = chosen.assignees.contains(&worker.id());
                Choice::new(worker.id(), worker.to_string(), selected)
            })
            .collect();
        Ok(Self {
            projects,
            task_types,
            tags,
            workers,
        })
    }
}

/// Current reference selections of a task form.
#[derive(Debug, Default)]
struct FormSelection {
    project: Option<ProjectId>,
    task_type: Option<TaskTypeId>,
    tags: BTreeSet<TagId>,
    assignees: BTreeSet<WorkerId>,
}

/// Scalar field values of a task form.
#[derive(Debug, Default, Serialize)]
struct FormValues {
    name: String,
    description: String,
    priority: String,
    deadline: String,
}

/// A parsed submission, or the values and errors to show again.
struct Submission {
    draft: Option<TaskDraft>,
    selection: FormSelection,
    values: FormValues,
    errors: FormErrors,
}

fn read_submission(form: &RawForm, state: &AppState) -> Submission {
    let mut errors = FormErrors::default();
    let priority = match form.get("priority").trim() {
        "" => Priority::default(),
        raw => Priority::try_from(raw).unwrap_or_else(|_| {
            errors.add("priority", format!("Select a valid choice. {raw} is not one of the available choices."));
            Priority::default()
        }),
    };
    let deadline = parse_deadline(form.get("deadline"), state.config.zone).unwrap_or_else(|message| {
        errors.add("deadline", message);
        None
    });
    let selection = FormSelection {
        project: form.optional_id("project", &mut errors),
        task_type: form.optional_id("task_type", &mut errors),
        tags: form.ids("tags", &mut errors).into_iter().collect(),
        assignees: form.ids("assignees", &mut errors).into_iter().collect(),
    };
    let draft = match TaskDraft::new(form.get("name"), form.get("description")) {
        Ok(draft) => Some(
            draft
                .with_priority(priority)
                .with_deadline(deadline)
                .with_task_type(selection.task_type)
                .with_project(selection.project)
                .with_tags(selection.tags.iter().copied())
                .with_assignees(selection.assignees.iter().copied()),
        ),
        Err(invalid) => {
            if let Some((field, message)) = TaskError::from(invalid).field_error() {
                errors.add(field, message);
            }
            None
        }
    };
    Submission {
        draft: draft.filter(|_| errors.is_empty()),
        selection,
        values: FormValues {
            name: form.get("name").to_owned(),
            description: form.get("description").to_owned(),
            priority: priority.as_str().to_owned(),
            deadline: form.get("deadline").to_owned(),
        },
        errors,
    }
}

async fn render_form(
    state: &AppState,
    csrf: &CsrfToken,
    current: &CurrentWorker,
    task: Option<&Task>,
    submission: Submission,
) -> Result<Response, WebError> {
    let pickers = Pickers::selecting(state, &submission.selection).await?;
    let (title, action) = task.map_or_else(
        || ("Create task".to_owned(), "/tasks/create/".to_owned()),
        |task| (format!("Edit \"{}\"", task.name()), format!("/tasks/{}/update/", task.id())),
    );
    state.render(
        "tasks/form.html",
        context! {
            chrome => state.chrome(current, csrf).await?,
            title => title,
            action => action,
            task_id => task.map(|task| task.id().to_string()),
            values => submission.values,
            errors => submission.errors,
            priorities => Priority::ALL.map(Priority::as_str),
            projects => pickers.projects,
            task_types => pickers.task_types,
            tags => pickers.tags,
            workers => pickers.workers,
        },
    )
}

pub(in crate::web) async fn create_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
) -> Result<Response, WebError> {
    let submission = Submission {
        draft: None,
        selection: FormSelection::default(),
        values: FormValues {
            priority: Priority::default().as_str().to_owned(),
            ..FormValues::default()
        },
        errors: FormErrors::default(),
    };
    render_form(&state, &csrf, &current, None, submission).await
}

pub(in crate::web) async fn create(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    form: RawForm,
) -> Result<Response, WebError> {
    let mut submission = read_submission(&form, &state);
    let Some(draft) = submission.draft.take() else {
        return render_form(&state, &csrf, &current, None, submission).await;
    };
    match state.tasks.create(&current.requester(), draft).await {
        Ok(task) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            "Task created successfully!",
            &format!("/tasks/{}/", task.id()),
        )),
        Err(err) => {
            submission.errors = err.into_form_errors()?;
            render_form(&state, &csrf, &current, None, submission).await
        }
    }
}

async fn managed(state: &AppState, current: &CurrentWorker, id: TaskId) -> Result<Task, WebError> {
    let task = state.tasks.get(id).await?;
    if task.can_be_managed_by(&current.requester()) {
        Ok(task)
    } else {
        Err(WebError::Forbidden(
            "Only the creator, an assignee or staff may change this task.".to_owned(),
        ))
    }
}

pub(in crate::web) async fn update_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TaskId>,
) -> Result<Response, WebError> {
    let task = managed(&state, &current, id).await?;
    let submission = Submission {
        draft: None,
        selection: FormSelection {
            project: task.project(),
            task_type: task.task_type(),
            tags: task.tags().clone(),
            assignees: task.assignees().clone(),
        },
        values: FormValues {
            name: task.name().to_string(),
            description: task.description().to_owned(),
            priority: task.priority().as_str().to_owned(),
            deadline: deadline_input(task.deadline(), state.config.zone),
        },
        errors: FormErrors::default(),
    };
    render_form(&state, &csrf, &current, Some(&task), submission).await
}

pub(in crate::web) async fn update(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TaskId>,
    form: RawForm,
) -> Result<Response, WebError> {
    let task = managed(&state, &current, id).await?;
    let mut submission = read_submission(&form, &state);
    let Some(draft) = submission.draft.take() else {
        return render_form(&state, &csrf, &current, Some(&task), submission).await;
    };
    match state.tasks.update(&current.requester(), id, draft).await {
        Ok(updated) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            "Task updated successfully!",
            &format!("/tasks/{}/", updated.id()),
        )),
        Err(err) => {
            submission.errors = err.into_form_errors()?;
            render_form(&state, &csrf, &current, Some(&task), submission).await
        }
    }
}

pub(in crate::web) async fn delete_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TaskId>,
) -> Result<Response, WebError> {
    let task = managed(&state, &current, id).await?;
    state.render(
        "confirm_delete.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            kind => "task",
            name => task.name().to_string(),
            action => format!("/tasks/{id}/delete/"),
            cancel => format!("/tasks/{id}/"),
        },
    )
}

pub(in crate::web) async fn delete(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<TaskId>,
) -> Result<Response, WebError> {
    state.tasks.delete(&current.requester(), id).await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        "Task deleted successfully!",
        "/tasks/",
    ))
}

pub(in crate::web) async fn toggle(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<TaskId>,
    headers: HeaderMap,
    form: RawForm,
) -> Result<Response, Response> {
    let task = state
        .tasks
        .toggle_completion(&current.requester(), id)
        .await
        .map_err(|err| WebError::from(err).respond(&headers))?;
    let message = if task.is_completed() {
        format!("Task \"{}\" marked as completed!", task.name())
    } else {
        format!("Task \"{}\" marked as incomplete", task.name())
    };
    if is_ajax(&headers) {
        return Ok(Json(json!({
            "success": true,
            "is_completed": task.is_completed(),
            "message": message,
        }))
        .into_response());
    }
    let next = form.get("next");
    let to = if next.starts_with('/') && !next.starts_with("//") {
        next.to_owned()
    } else {
        format!("/tasks/{id}/")
    };
    state.sessions.flash(&current.session, FlashLevel::Success, message);
    Ok(Redirect::to(&to).into_response())
}

/// The activity history of one task as JSON.
pub(in crate::web) async fn activity(
    State(state): State<Arc<AppState>>,
    _current: CurrentWorker,
    IdPath(id): IdPath<TaskId>,
) -> Result<Json<JsonValue>, Ajax> {
    let rows = state.tasks.activity(id).await?;
    let names = Names::for_activity(&state, &rows).await?;
    let activities: Vec<_> = rows
        .iter()
        .map(|row| names.activity_row(&state, row))
        .collect();
    Ok(Json(json!({ "activities": activities })))
}

#[cfg(test)]
mod tests {
    use super::TaskListQuery;
    use crate::task::domain::{CompletionStatus, Priority};

    #[test]
    fn unparseable_filters_are_ignored() {
        let query = TaskListQuery {
            status: "done-ish".to_owned(),
            priority: "high".to_owned(),
            project: "not-a-uuid".to_owned(),
            ..TaskListQuery::default()
        };
        let filter = query.filter();
        assert_eq!(filter.status, None);
        assert_eq!(filter.priority, Some(Priority::High));
        assert_eq!(filter.project, None);
    }

    #[test]
    fn pagination_links_keep_active_filters() {
        let query = TaskListQuery {
            search: "release notes".to_owned(),
            status: CompletionStatus::Completed.as_str().to_owned(),
            page: Some("3".to_owned()),
            ..TaskListQuery::default()
        };
        assert_eq!(query.carried(), "search=release+notes&status=completed");
    }
}
