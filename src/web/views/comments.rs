//! Comment posting, editing and removal.

use crate::task::{
    domain::{Comment, CommentId, TaskId},
    services::TaskError,
};
use crate::web::{
    path::IdPath,
    AppState, CurrentWorker, WebError,
    csrf::CsrfToken,
    error::is_ajax,
    forms::{FormErrors, FormFailure, RawForm},
    session::FlashLevel,
};
use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use minijinja::context;
use serde_json::json;
use std::sync::Arc;

/// Posts a comment. AJAX callers get the rendered fields back as JSON.
pub(in crate::web) async fn create(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(task_id): IdPath<TaskId>,
    headers: HeaderMap,
    form: RawForm,
) -> Response {
    let detail = format!("/tasks/{task_id}/");
    let posted = state
        .comments
        .add(&current.requester(), task_id, form.get("content"))
        .await;
    let ajax = is_ajax(&headers);
    match posted {
        Ok(posted) if ajax => Json(json!({
            "success": true,
            "comment": {
                "id": posted.comment.id().to_string(),
                "author": posted.author_name,
                "content": posted.comment.content().as_str(),
                "created_at": state.time(posted.comment.created_at()),
            },
        }))
        .into_response(),
        Ok(_) => state.redirect_with(&current, FlashLevel::Success, "Comment added!", &detail),
        Err(err) => match err.field_error() {
            Some((_, message)) if ajax => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": message })),
            )
                .into_response(),
            Some((_, message)) => {
                state.redirect_with(&current, FlashLevel::Error, message, &detail)
            }
            None => WebError::from(err).respond(&headers),
        },
    }
}

async fn editable(
    state: &AppState,
    current: &CurrentWorker,
    id: CommentId,
) -> Result<Comment, WebError> {
    let comment = state.comments.get(id).await?;
    if comment.can_be_edited_by(&current.requester()) {
        Ok(comment)
    } else {
        Err(WebError::Forbidden(
            "Only the author or staff may change this comment.".to_owned(),
        ))
    }
}

async fn render_form(
    state: &AppState,
    csrf: &CsrfToken,
    current: &CurrentWorker,
    comment: &Comment,
    content: &str,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    state.render(
        "comments/form.html",
        context! {
            chrome => state.chrome(current, csrf).await?,
            content => content,
            errors => errors,
            action => format!("/comments/{}/update/", comment.id()),
            cancel => format!("/tasks/{}/", comment.task()),
        },
    )
}

pub(in crate::web) async fn update_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<CommentId>,
) -> Result<Response, WebError> {
    let comment = editable(&state, &current, id).await?;
    render_form(
        &state,
        &csrf,
        &current,
        &comment,
        comment.content().as_str(),
        &FormErrors::default(),
    )
    .await
}

pub(in crate::web) async fn update(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<CommentId>,
    form: RawForm,
) -> Result<Response, WebError> {
    let comment = editable(&state, &current, id).await?;
    let content = form.get("content");
    match state.comments.edit(&current.requester(), id, content).await {
        Ok(edited) => Ok(state.redirect_with(
            &current,
            FlashLevel::Success,
            "Comment updated!",
            &format!("/tasks/{}/", edited.task()),
        )),
        Err(err @ TaskError::Domain(_)) => {
            let errors = err.into_form_errors()?;
            render_form(&state, &csrf, &current, &comment, content, &errors).await
        }
        Err(err) => Err(err.into()),
    }
}

pub(in crate::web) async fn delete_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: CurrentWorker,
    IdPath(id): IdPath<CommentId>,
) -> Result<Response, WebError> {
    let comment = editable(&state, &current, id).await?;
    state.render(
        "confirm_delete.html",
        context! {
            chrome => state.chrome(&current, &csrf).await?,
            kind => "comment",
            name => comment.content().as_str().chars().take(60).collect::<String>(),
            action => format!("/comments/{id}/delete/"),
            cancel => format!("/tasks/{}/", comment.task()),
        },
    )
}

pub(in crate::web) async fn delete(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
    IdPath(id): IdPath<CommentId>,
) -> Result<Response, WebError> {
    let removed = state.comments.delete(&current.requester(), id).await?;
    Ok(state.redirect_with(
        &current,
        FlashLevel::Success,
        "Comment deleted!",
        &format!("/tasks/{}/", removed.task()),
    ))
}
