//! Tags.

use super::{Names, organisation::ListQuery};
use crate::organisation::domain::TagId;
use crate::task::domain::TaskFilter;
use crate::web::{
    path::IdPath,
    AppState, CurrentWorker, WebError,
    csrf::CsrfToken,
    forms::{FormErrors, FormFailure, RawForm},
    pagination::{CATALOG_PER_PAGE, Page},
    session::FlashLevel,
};
use axum::{
    Extension,
    extract::{Query, State},
    response::Response,
};
use minijinja::context;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct TagRow {
    id: String,
    name: String,
}

/// Renders the shared single-field form.
pub(super) struct NameForm<'a> {
    pub(super) title: &'a str,
    pub(super) label: &'a str,
    pub(super) action: &'a str,
    pub(super) cancel: &'a str,
}

impl NameForm<'_> {
    pub(super) async fn render(
        &self,
        state: &AppState,
        csrf: &CsrfToken,
        current: &CurrentWorker,
        name: &str,
        errors: &FormErrors,
    ) -> Result<Response, WebError> {
        state.render(
            "name_form.html",
            context! {
                chrome => state.chrome(current, csrf).await?,
                title => self.title,
                label => self.label,
                action => self.action,
                cancel => self.cancel,
                name => name,
                errors => errors,
            },
        )
    }
}

const CREATE_TAG: NameForm<'static> = NameForm {
    title: "Create tag",
    label: "Tag name",
    action: "/tags/create/",
    cancel: "/tags/",
};

pub(in crate::web) async fn tag_list(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    Query(query): Query<ListQuery>,
) -> Result<Response, WebError> {
    let tags = state.catalog.list_tags(query.needle()).await?;
    let page = Page::of(tags, query.page.as_deref(), CATALOG_PER_PAGE).map(|tag| TagRow {
        id: tag.id().to_string(),
        name: tag.name().to_string(),
    });
    state.render(
        "tags/list.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            page => page,
            search => query.search.trim(),
            carried => query.carried(),
            can_delete => current.worker.is_staff(),
        },
    )
}

pub(in crate::web) async fn tag_create_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
) -> Result<Response, WebError> {
    CREATE_TAG
        .render(&state, &csrf, &current, "", &FormErrors::default())
        .await
}

pub(in crate::web) async fn tag_create(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    form: RawForm,
) -> Result<Response, WebError> {
    match state.catalog.create_tag(&current.requester(), form.get("name")).await {
        Ok(tag) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            "Tag created successfully!",
            &format!("/tags/{}/", tag.id()),
        )),
        Err(err) => {
            let errors = err.into_form_errors()?;
            CREATE_TAG
                .render(&state, &csrf, &current, form.get("name"), &errors)
                .await
        }
    }
}

pub(in crate::web) async fn tag_detail(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TagId>,
) -> Result<Response, WebError> {
    let tag = state.catalog.get_tag(id).await?;
    let tasks = state
        .tasks
        .search(&TaskFilter {
            tag: Some(id),
            ..TaskFilter::default()
        })
        .await?;
    let names = Names::for_tasks(&state, &tasks).await?;
    let rows: Vec<_> = tasks
        .iter()
        .map(|task| names.task_row(&state, task, &current))
        .collect();
    state.render(
        "tags/detail.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            tag => TagRow { id: tag.id().to_string(), name: tag.name().to_string() },
            tasks => rows,
            can_delete => current.worker.is_staff(),
        },
    )
}

pub(in crate::web) async fn tag_update_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TagId>,
) -> Result<Response, WebError> {
    let tag = state.catalog.get_tag(id).await?;
    let action = format!("/tags/{id}/update/");
    let cancel = format!("/tags/{id}/");
    let title = format!("Rename \"{}\"", tag.name());
    NameForm {
        title: &title,
        label: "Tag name",
        action: &action,
        cancel: &cancel,
    }
    .render(&state, &csrf, &current, tag.name().as_str(), &FormErrors::default())
    .await
}

pub(in crate::web) async fn tag_update(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TagId>,
    form: RawForm,
) -> Result<Response, WebError> {
    let tag = state.catalog.get_tag(id).await?;
    match state
        .catalog
        .rename_tag(&current.requester(), id, form.get("name"))
        .await
    {
        Ok(_) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            "Tag updated successfully!",
            &format!("/tags/{id}/"),
        )),
        Err(err) => {
            let errors = err.into_form_errors()?;
            let action = format!("/tags/{id}/update/");
            let cancel = format!("/tags/{id}/");
            let title = format!("Rename \"{}\"", tag.name());
            NameForm {
                title: &title,
                label: "Tag name",
                action: &action,
                cancel: &cancel,
            }
            .render(&state, &csrf, &current, form.get("name"), &errors)
            .await
        }
    }
}

pub(in crate::web) async fn tag_delete_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<TagId>,
) -> Result<Response, WebError> {
    if !current.worker.is_staff() {
        return Err(WebError::Forbidden("Only staff may delete tags.".to_owned()));
    }
    let tag = state.catalog.get_tag(id).await?;
    state.render(
        "confirm_delete.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            kind => "tag",
            name => tag.name().to_string(),
            note => "The tag is removed from every task that carries it.",
            action => format!("/tags/{id}/delete/"),
            cancel => format!("/tags/{id}/"),
        },
    )
}

pub(in crate::web) async fn tag_delete(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<TagId>,
) -> Result<Response, WebError> {
    state.catalog.delete_tag(&current.requester(), id).await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        "Tag deleted successfully!",
        "/tags/",
    ))
}
