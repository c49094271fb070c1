//! Staff consoles: every notification, the audit trail and task types.

use super::{Choice, Names, NotificationRow, catalog::NameForm};
use crate::organisation::domain::TaskTypeId;
use crate::persistence::PageRequest;
use crate::task::{
    domain::{ActivityKind, NotificationId, NotificationKind},
    ports::{ActivityQuery, NotificationQuery},
};
use crate::web::{
    path::IdPath,
    AppState, CurrentWorker, WebError,
    csrf::CsrfToken,
    forms::{FormErrors, FormFailure, RawForm},
    pagination::{ACTIVITY_PER_PAGE, NOTIFICATIONS_PER_PAGE, Page},
    session::FlashLevel,
};
use crate::worker::domain::WorkerId;
use axum::{
    Extension,
    extract::{Query, State},
    response::Response,
};
use minijinja::context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

fn staff_only(current: &CurrentWorker, action: &str) -> Result<(), WebError> {
    current
        .requester()
        .ensure_staff(action)
        .map_err(|denied| WebError::Forbidden(denied.to_string()))
}

fn non_blank(value: &str) -> Option<String> {
    Some(value.trim().to_owned()).filter(|value| !value.is_empty())
}

/// Filters as a query string for pagination links; blank values are dropped.
fn carried(pairs: &[(&str, &str)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        if !value.trim().is_empty() {
            query.append_pair(key, value.trim());
        }
    }
    query.finish()
}

/// Kind picker entry.
#[derive(Debug, Serialize)]
struct KindChoice {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Debug, Default, Deserialize)]
pub(in crate::web) struct AdminNotificationQuery {
    #[serde(default)]
    recipient: String,
    #[serde(default)]
    is_read: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    search: String,
    page: Option<String>,
}

impl AdminNotificationQuery {
    fn to_query(&self) -> NotificationQuery {
        NotificationQuery {
            recipient: self.recipient.parse::<WorkerId>().ok(),
            is_read: match self.is_read.as_str() {
                "yes" | "true" | "1" => Some(true),
                "no" | "false" | "0" => Some(false),
                _ => None,
            },
            kind: NotificationKind::try_from(self.kind.as_str()).ok(),
            search: non_blank(&self.search),
        }
    }

    fn carried(&self) -> String {
        carried(&[
            ("recipient", self.recipient.as_str()),
            ("is_read", self.is_read.as_str()),
            ("kind", self.kind.as_str()),
            ("search", self.search.as_str()),
        ])
    }
}

#[derive(Debug, Serialize)]
struct AdminNotificationRow {
    recipient: String,
    #[serde(flatten)]
    notification: NotificationRow,
}

pub(in crate::web) async fn notifications(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    Query(query): Query<AdminNotificationQuery>,
) -> Result<Response, WebError> {
    let filter = query.to_query();
    let request = PageRequest::parse(query.page.as_deref(), NOTIFICATIONS_PER_PAGE);
    let notifications = state
        .notifications
        .admin_list(&current.requester(), &filter, request)
        .await?;

    let mut names = Names::default();
    let recipient_ids: BTreeSet<WorkerId> = notifications
        .items
        .iter()
        .map(|notification| notification.recipient())
        .chain(filter.recipient)
        .collect();
    names.add_workers(&state, recipient_ids).await?;
    let page = Page::from(notifications).map(|notification| AdminNotificationRow {
        recipient: names.worker(notification.recipient()),
        notification: NotificationRow::new(&state, &notification),
    });

    let mut recipients: Vec<Choice> = Vec::new();
    let mut listed = false;
    for worker in state.workers.list_active().await? {
        let selected = filter.recipient == Some(worker.id());
        listed |= selected;
        recipients.push(Choice::new(worker.id(), worker.to_string(), selected));
    }
    if let Some(inactive) = filter.recipient.filter(|_| !listed) {
        recipients.push(Choice::new(inactive, names.worker(inactive), true));
    }
    let kinds: Vec<KindChoice> = NotificationKind::ALL
        .iter()
        .map(|kind| KindChoice {
            value: kind.as_str(),
            label: kind.label(),
            selected: filter.kind == Some(*kind),
        })
        .collect();
    state.render(
        "admin/notifications.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            page => page,
            recipients => recipients,
            kinds => kinds,
            is_read => query.is_read.as_str(),
            search => query.search.trim(),
            carried => query.carried(),
        },
    )
}

pub(in crate::web) async fn notifications_bulk(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    form: RawForm,
) -> Result<Response, WebError> {
    let read = match form.get("action") {
        "mark_read" => true,
        "mark_unread" => false,
        _ => return Err(WebError::BadRequest("unknown bulk action".to_owned())),
    };
    let mut errors = FormErrors::default();
    let ids: Vec<NotificationId> = form.ids("ids", &mut errors);
    if !errors.is_empty() {
        return Err(WebError::BadRequest("malformed notification id".to_owned()));
    }
    if ids.is_empty() {
        return Ok(state.redirect_with(
            &current,
            FlashLevel::Error,
            "Select at least one notification.",
            "/admin/notifications/",
        ));
    }
    let changed = state
        .notifications
        .set_read_state(&current.requester(), &ids, read)
        .await?;
    let state_name = if read { "read" } else { "unread" };
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        format!("{changed} notifications marked as {state_name}."),
        "/admin/notifications/",
    ))
}

/// `?kind=&search=&page=` of the audit console.
#[derive(Debug, Default, Deserialize)]
pub(in crate::web) struct AuditQuery {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    search: String,
    page: Option<String>,
}

impl AuditQuery {
    fn to_query(&self) -> ActivityQuery {
        ActivityQuery {
            kind: ActivityKind::try_from(self.kind.as_str()).ok(),
            search: non_blank(&self.search),
        }
    }

    fn carried(&self) -> String {
        carried(&[("kind", self.kind.as_str()), ("search", self.search.as_str())])
    }
}

/// Read-only view of activity across all tasks.
pub(in crate::web) async fn activity(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    Query(query): Query<AuditQuery>,
) -> Result<Response, WebError> {
    let filter = query.to_query();
    let request = PageRequest::parse(query.page.as_deref(), ACTIVITY_PER_PAGE);
    let rows = state
        .tasks
        .audit_trail(&current.requester(), &filter, request)
        .await?;
    let names = Names::for_activity(&state, &rows.items).await?;
    let page = Page::from(rows).map(|row| names.activity_row(&state, &row));
    let kinds: Vec<KindChoice> = ActivityKind::ALL
        .iter()
        .map(|kind| KindChoice {
            value: kind.as_str(),
            label: kind.label(),
            selected: filter.kind == Some(*kind),
        })
        .collect();
    state.render(
        "admin/activity.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            page => page,
            kinds => kinds,
            search => query.search.trim(),
            carried => query.carried(),
        },
    )
}

async fn task_type_console(
    state: &AppState,
    csrf: &CsrfToken,
    current: &CurrentWorker,
    name: &str,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let task_types: Vec<Choice> = state
        .catalog
        .list_task_types()
        .await?
        .iter()
        .map(|task_type| Choice::new(task_type.id(), task_type.name().as_str(), false))
        .collect();
    state.render(
        "admin/task_types.html",
        context! {
            chrome => state.chrome(current, csrf).await?,
            task_types => task_types,
            name => name,
            errors => errors,
        },
    )
}

pub(in crate::web) async fn task_types(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
) -> Result<Response, WebError> {
    staff_only(&current, "manage task types")?;
    task_type_console(&state, &csrf, &current, "", &FormErrors::default()).await
}

pub(in crate::web) async fn task_type_create(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    form: RawForm,
) -> Result<Response, WebError> {
    match state
        .catalog
        .create_task_type(&current.requester(), form.get("name"))
        .await
    {
        Ok(task_type) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            format!("Task type \"{}\" created.", task_type.name()),
            "/admin/task-types/",
        )),
        Err(err) => {
            let errors = err.into_form_errors()?;
            task_type_console(&state, &csrf, &current, form.get("name"), &errors).await
        }
    }
}

async fn rename_form(
    state: &AppState,
    csrf: &CsrfToken,
    current: &CurrentWorker,
    id: TaskTypeId,
    title: &str,
    name: &str,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let action = format!("/admin/task-types/{id}/update/");
    NameForm {
        title,
        label: "Task type name",
        action: &action,
        cancel: "/admin/task-types/",
    }
    .render(state, csrf, current, name, errors)
    .await
}

pub(in crate::web) async fn task_type_update_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TaskTypeId>,
) -> Result<Response, WebError> {
    staff_only(&current, "manage task types")?;
    let task_type = state.catalog.get_task_type(id).await?;
    let title = format!("Rename \"{}\"", task_type.name());
    let name = task_type.name().to_string();
    rename_form(&state, &csrf, &current, id, &title, &name, &FormErrors::default()).await
}

pub(in crate::web) async fn task_type_update(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TaskTypeId>,
    form: RawForm,
) -> Result<Response, WebError> {
    let task_type = state.catalog.get_task_type(id).await?;
    match state
        .catalog
        .rename_task_type(&current.requester(), id, form.get("name"))
        .await
    {
        Ok(_) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            "Task type updated.",
            "/admin/task-types/",
        )),
        Err(err) => {
            let errors = err.into_form_errors()?;
            let title = format!("Rename \"{}\"", task_type.name());
            rename_form(&state, &csrf, &current, id, &title, form.get("name"), &errors).await
        }
    }
}

pub(in crate::web) async fn task_type_delete_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TaskTypeId>,
) -> Result<Response, WebError> {
    staff_only(&current, "manage task types")?;
    let task_type = state.catalog.get_task_type(id).await?;
    state.render(
        "confirm_delete.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            kind => "task type",
            name => task_type.name().to_string(),
            note => "Tasks of this type keep existing without a type.",
            action => format!("/admin/task-types/{id}/delete/"),
            cancel => "/admin/task-types/",
        },
    )
}

pub(in crate::web) async fn task_type_delete(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<TaskTypeId>,
) -> Result<Response, WebError> {
    state.catalog.delete_task_type(&current.requester(), id).await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        "Task type deleted.",
        "/admin/task-types/",
    ))
}
