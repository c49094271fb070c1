//! Positions and worker administration.

use super::{Choice, catalog::NameForm, organisation::ListQuery};
use crate::web::{
    path::IdPath,
    AppState, CurrentWorker, WebError,
    csrf::CsrfToken,
    forms::{FormErrors, FormFailure, RawForm},
    pagination::{Page, WORKERS_PER_PAGE},
    session::FlashLevel,
};
use crate::worker::{
    domain::{Position, PositionId, Worker, WorkerId, WorkerProfile},
    ports::WorkerQuery,
    services::DirectoryError,
};
use axum::{
    Extension,
    extract::{Query, State},
    response::Response,
};
use minijinja::context;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

fn superuser_only(current: &CurrentWorker, action: &str) -> Result<(), WebError> {
    current
        .requester()
        .ensure_superuser(action)
        .map_err(|denied| WebError::Forbidden(denied.to_string()))
}

#[derive(Debug, Serialize)]
struct PositionRow {
    id: String,
    name: String,
}

pub(in crate::web) async fn position_list(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
) -> Result<Response, WebError> {
    let positions: Vec<PositionRow> = state
        .workers
        .list_positions()
        .await?
        .iter()
        .map(|position| PositionRow {
            id: position.id().to_string(),
            name: position.name().to_string(),
        })
        .collect();
    state.render(
        "positions/list.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            positions => positions,
            can_manage => current.worker.is_superuser(),
        },
    )
}

const CREATE_POSITION: NameForm<'static> = NameForm {
    title: "Create position",
    label: "Position name",
    action: "/positions/create/",
    cancel: "/positions/",
};

pub(in crate::web) async fn position_create_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
) -> Result<Response, WebError> {
    superuser_only(&current, "manage positions")?;
    CREATE_POSITION
        .render(&state, &csrf, &current, "", &FormErrors::default())
        .await
}

pub(in crate::web) async fn position_create(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    form: RawForm,
) -> Result<Response, WebError> {
    match state
        .workers
        .create_position(&current.requester(), form.get("name"))
        .await
    {
        Ok(_) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            "Position created successfully!",
            "/positions/",
        )),
        Err(err) => {
            let errors = err.into_form_errors()?;
            CREATE_POSITION
                .render(&state, &csrf, &current, form.get("name"), &errors)
                .await
        }
    }
}

async fn rename_form(
    state: &AppState,
    csrf: &CsrfToken,
    current: &CurrentWorker,
    position: &Position,
    name: &str,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let title = format!("Rename \"{}\"", position.name());
    let action = format!("/positions/{}/update/", position.id());
    NameForm {
        title: &title,
        label: "Position name",
        action: &action,
        cancel: "/positions/",
    }
    .render(state, csrf, current, name, errors)
    .await
}

pub(in crate::web) async fn position_update_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<PositionId>,
) -> Result<Response, WebError> {
    superuser_only(&current, "manage positions")?;
    let position = state.workers.get_position(id).await?;
    let name = position.name().to_string();
    rename_form(&state, &csrf, &current, &position, &name, &FormErrors::default()).await
}

pub(in crate::web) async fn position_update(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<PositionId>,
    form: RawForm,
) -> Result<Response, WebError> {
    let position = state.workers.get_position(id).await?;
    match state
        .workers
        .rename_position(&current.requester(), id, form.get("name"))
        .await
    {
        Ok(_) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            "Position updated successfully!",
            "/positions/",
        )),
        Err(err) => {
            let errors = err.into_form_errors()?;
            rename_form(&state, &csrf, &current, &position, form.get("name"), &errors).await
        }
    }
}

pub(in crate::web) async fn position_delete_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<PositionId>,
) -> Result<Response, WebError> {
    superuser_only(&current, "manage positions")?;
    let position = state.workers.get_position(id).await?;
    state.render(
        "confirm_delete.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            kind => "position",
            name => position.name().to_string(),
            note => "Workers holding it keep their accounts without a position.",
            action => format!("/positions/{id}/delete/"),
            cancel => "/positions/",
        },
    )
}

pub(in crate::web) async fn position_delete(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<PositionId>,
) -> Result<Response, WebError> {
    state.workers.delete_position(&current.requester(), id).await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        "Position deleted successfully!",
        "/positions/",
    ))
}

#[derive(Debug, Serialize)]
struct WorkerRow {
    id: String,
    username: String,
    full_name: String,
    email: String,
    position: Option<String>,
    is_active: bool,
    is_staff: bool,
    is_superuser: bool,
    date_joined: String,
    is_self: bool,
}

pub(in crate::web) async fn worker_list(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    Query(query): Query<ListQuery>,
) -> Result<Response, WebError> {
    let workers = state
        .workers
        .list(
            &current.requester(),
            &WorkerQuery {
                search: query.needle().map(str::to_owned),
                active_only: false,
            },
        )
        .await?;
    let positions: HashMap<PositionId, String> = state
        .workers
        .list_positions()
        .await?
        .into_iter()
        .map(|position| (position.id(), position.name().to_string()))
        .collect();
    let me = current.worker.id();
    let page = Page::of(workers, query.page.as_deref(), WORKERS_PER_PAGE).map(|worker| WorkerRow {
        id: worker.id().to_string(),
        username: worker.username().to_string(),
        full_name: worker.full_name(),
        email: worker.email().to_string(),
        position: worker.position().and_then(|id| positions.get(&id).cloned()),
        is_active: worker.is_active(),
        is_staff: worker.is_staff(),
        is_superuser: worker.is_superuser(),
        date_joined: state.time(worker.date_joined()),
        is_self: worker.id() == me,
    });
    state.render(
        "workers/list.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            page => page,
            search => query.search.trim(),
            carried => query.carried(),
        },
    )
}

async fn worker_form(
    state: &AppState,
    csrf: &CsrfToken,
    current: &CurrentWorker,
    worker: &Worker,
    values: BTreeMap<&str, &str>,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let selected = values.get("position").copied().unwrap_or_default();
    let positions: Vec<Choice> = state
        .workers
        .list_positions()
        .await?
        .iter()
        .map(|position| {
            let id = position.id().to_string();
            let chosen = id == selected;
            Choice::new(id, position.name().as_str(), chosen)
        })
        .collect();
    state.render(
        "workers/form.html",
        context! {
            chrome => state.chrome(current, csrf).await?,
            worker => context! {
                id => worker.id().to_string(),
                username => worker.username().to_string(),
            },
            values => values,
            positions => positions,
            errors => errors,
        },
    )
}

pub(in crate::web) async fn worker_update_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<WorkerId>,
) -> Result<Response, WebError> {
    superuser_only(&current, "manage workers")?;
    let worker = state.workers.get(id).await?;
    let position = worker.position().map(|id| id.to_string()).unwrap_or_default();
    let values = BTreeMap::from([
        ("first_name", worker.first_name()),
        ("last_name", worker.last_name()),
        ("email", worker.email().as_str()),
        ("position", position.as_str()),
    ]);
    worker_form(&state, &csrf, &current, &worker, values, &FormErrors::default()).await
}

pub(in crate::web) async fn worker_update(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<WorkerId>,
    form: RawForm,
) -> Result<Response, WebError> {
    superuser_only(&current, "manage workers")?;
    let worker = state.workers.get(id).await?;
    let mut errors = FormErrors::default();
    let position = form.optional_id::<PositionId>("position", &mut errors);
    if !errors.is_empty() {
        return worker_form(&state, &csrf, &current, &worker, form.values(), &errors).await;
    }
    let updated = match WorkerProfile::new(
        form.get("email"),
        form.get("first_name"),
        form.get("last_name"),
        position,
    ) {
        Ok(profile) => state.workers.update_worker(&current.requester(), id, profile).await,
        Err(invalid) => Err(DirectoryError::from(invalid)),
    };
    match updated {
        Ok(worker) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            format!("Worker \"{}\" data updated!", worker.full_name()),
            "/workers/",
        )),
        Err(err) => {
            let errors = err.into_form_errors()?;
            worker_form(&state, &csrf, &current, &worker, form.values(), &errors).await
        }
    }
}

async fn set_active(
    state: &AppState,
    current: &CurrentWorker,
    id: WorkerId,
    active: bool,
) -> Result<Response, WebError> {
    let worker = state
        .workers
        .set_active(&current.requester(), id, active)
        .await?;
    let message = if active {
        format!("Worker \"{}\" activated.", worker.full_name())
    } else {
        format!("Worker \"{}\" deactivated.", worker.full_name())
    };
    Ok(state.redirect_with(current, FlashLevel::Success, message, "/workers/"))
}

pub(in crate::web) async fn worker_deactivate(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<WorkerId>,
) -> Result<Response, WebError> {
    set_active(&state, &current, id, false).await
}

pub(in crate::web) async fn worker_activate(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<WorkerId>,
) -> Result<Response, WebError> {
    set_active(&state, &current, id, true).await
}
