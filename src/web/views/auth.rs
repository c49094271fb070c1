//! Sign-in, registration and sign-out.

use super::Choice;
use crate::web::{
    AppState, CurrentWorker, WebError,
    csrf::CsrfToken,
    forms::{FormErrors, FormFailure, NON_FIELD, RawForm},
    session::{FlashLevel, clear_session_cookie, session_cookie},
};
use crate::worker::{
    domain::{PositionId, Worker},
    services::{DirectoryError, RegistrationRequest},
};
use axum::{
    Extension,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use minijinja::context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub(in crate::web) struct NextQuery {
    next: Option<String>,
}

/// Only same-site absolute paths are followed after sign-in.
fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

fn sign_in(
    state: &AppState,
    worker: &Worker,
    to: &str,
    flash: Option<&str>,
) -> Result<Response, WebError> {
    let now = state.now();
    let session = state.sessions.open(worker.id(), now);
    let token = state
        .keys
        .issue(worker.id(), &session, now, state.sessions.ttl())
        .map_err(WebError::internal)?;
    if let Some(message) = flash {
        state.sessions.flash(&session, FlashLevel::Success, message);
    }
    info!(worker_id = %worker.id(), "signed in");
    let cookie = session_cookie(&token, state.sessions.ttl(), !state.config.debug);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to(to)).into_response())
}

fn login_form(
    state: &AppState,
    csrf: &CsrfToken,
    username: &str,
    next: &str,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    state.render(
        "auth/login.html",
        context! {
            chrome => state.anonymous_chrome(csrf),
            username => username,
            next => next,
            errors => errors,
        },
    )
}

pub(in crate::web) async fn login_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    current: Option<CurrentWorker>,
    Query(query): Query<NextQuery>,
) -> Result<Response, WebError> {
    let next = safe_next(query.next.as_deref().unwrap_or("/"));
    if current.is_some() {
        return Ok(Redirect::to(next).into_response());
    }
    login_form(&state, &csrf, "", next, &FormErrors::default())
}

pub(in crate::web) async fn login(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    form: RawForm,
) -> Result<Response, WebError> {
    let username = form.get("username").trim();
    let next = safe_next(form.get("next"));
    match state.workers.authenticate(username, form.get("password")).await {
        Ok(worker) => sign_in(&state, &worker, next, None),
        Err(DirectoryError::InvalidCredentials) => login_form(
            &state,
            &csrf,
            username,
            next,
            &FormErrors::single(
                NON_FIELD,
                "Please enter a correct username and password.",
            ),
        ),
        Err(err) => Err(err.into()),
    }
}

async fn register_form(
    state: &AppState,
    csrf: &CsrfToken,
    values: BTreeMap<&str, &str>,
    errors: &FormErrors,
) -> Result<Response, WebError> {
    let selected = values.get("position").copied().unwrap_or_default();
    let positions: Vec<Choice> = state
        .workers
        .list_positions()
        .await?
        .into_iter()
        .map(|position| {
            let id = position.id().to_string();
            let chosen = id == selected;
            Choice::new(id, position.name().as_str(), chosen)
        })
        .collect();
    state.render(
        "auth/register.html",
        context! {
            chrome => state.anonymous_chrome(csrf),
            positions => positions,
            values => values,
            errors => errors,
        },
    )
}

pub(in crate::web) async fn register_page(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
) -> Result<Response, WebError> {
    register_form(&state, &csrf, BTreeMap::new(), &FormErrors::default()).await
}

pub(in crate::web) async fn register(
    State(state): State<Arc<AppState>>,
    Extension(csrf): Extension<CsrfToken>,
    form: RawForm,
) -> Result<Response, WebError> {
    let mut errors = FormErrors::default();
    let position = form.optional_id::<PositionId>("position", &mut errors);
    if !errors.is_empty() {
        return register_form(&state, &csrf, form.values(), &errors).await;
    }
    let request = RegistrationRequest {
        username: form.get("username").to_owned(),
        email: form.get("email").to_owned(),
        first_name: form.get("first_name").to_owned(),
        last_name: form.get("last_name").to_owned(),
        position,
        password1: form.get("password1").to_owned(),
        password2: form.get("password2").to_owned(),
    };
    match state.workers.register(request).await {
        Ok(worker) => sign_in(
            &state,
            &worker,
            "/",
            Some("Registration completed successfully!"),
        ),
        Err(err) => {
            let errors = err.into_form_errors()?;
            register_form(&state, &csrf, form.values(), &errors).await
        }
    }
}

pub(in crate::web) async fn logout(
    State(state): State<Arc<AppState>>,
    current: CurrentWorker,
) -> Response {
    state.sessions.close(&current.session);
    info!(worker_id = %current.worker.id(), "signed out");
    let cookie = clear_session_cookie(!state.config.debug);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/login/")).into_response()
}

#[cfg(test)]
mod tests {
    use super::safe_next;
    use rstest::rstest;

    #[rstest]
    #[case("/tasks/", "/tasks/")]
    #[case("//evil.example/", "/")]
    #[case("https://evil.example/", "/")]
    #[case("/\\evil", "/")]
    #[case("", "/")]
    fn only_local_paths_are_followed(#[case] next: &str, #[case] expected: &str) {
        assert_eq!(safe_next(next), expected);
    }
}
