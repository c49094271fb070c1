//! HTTP error mapping.
//!
//! Service errors are translated exactly once, here. HTML requests get an
//! error page (or a redirect to sign-in); AJAX requests get
//! `{"success": false, "error": ...}` with a non-2xx status.

use crate::organisation::{ports::OrganisationRepositoryError, services::OrganisationError};
use crate::task::{ports::TaskRepositoryError, services::TaskError};
use crate::worker::{ports::WorkerRepositoryError, services::DirectoryError};
use axum::{
    Json,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use minijinja::{AutoEscape, Environment, context};
use serde_json::json;
use std::fmt;
use thiserror::Error;
use tracing::error;

const ERROR_PAGE: &str = include_str!("../../templates/error.html");

/// Failures surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum WebError {
    /// Unknown identifier or route.
    #[error("page not found")]
    NotFound,
    /// The signed-in worker may not do this.
    #[error("{0}")]
    Forbidden(String),
    /// Malformed or invalid input.
    #[error("{0}")]
    BadRequest(String),
    /// No valid session; `next` is where to return after signing in.
    #[error("authentication required")]
    Unauthenticated {
        /// Original request path and query.
        next: String,
    },
    /// Infrastructure failure. The detail is logged, never shown.
    #[error("internal server error")]
    Internal,
}

impl WebError {
    /// Logs `err` and returns [`WebError::Internal`].
    pub fn internal(err: impl fmt::Display) -> Self {
        error!(error = %err, "request failed");
        Self::Internal
    }

    /// Status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated { .. } => StatusCode::UNAUTHORIZED,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the JSON shape used by AJAX endpoints.
    #[must_use]
    pub fn into_json(self) -> Response {
        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (self.status(), body).into_response()
    }

    /// Renders JSON for AJAX requests and HTML otherwise.
    #[must_use]
    pub fn respond(self, headers: &HeaderMap) -> Response {
        if is_ajax(headers) {
            self.into_json()
        } else {
            self.into_response()
        }
    }

    fn title(&self) -> &'static str {
        match self {
            Self::NotFound => "Page not found",
            Self::Forbidden(_) => "Access denied",
            Self::BadRequest(_) => "Bad request",
            Self::Unauthenticated { .. } => "Sign-in required",
            Self::Internal => "Server error",
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if let Self::Unauthenticated { next } = &self {
            return Redirect::to(&login_url(next)).into_response();
        }
        let status = self.status();
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        let page = env.render_str(
            ERROR_PAGE,
            context! {
                status => status.as_u16(),
                title => self.title(),
                message => self.to_string(),
            },
        );
        match page {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                error!(error = %err, "error page failed to render");
                (status, self.to_string()).into_response()
            }
        }
    }
}

/// Wrapper forcing the JSON error shape regardless of request headers.
#[derive(Debug)]
pub struct Ajax(pub WebError);

impl IntoResponse for Ajax {
    fn into_response(self) -> Response {
        self.0.into_json()
    }
}

macro_rules! ajax_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for Ajax {
                fn from(err: $source) -> Self {
                    Self(err.into())
                }
            }
        )*
    };
}

ajax_from!(WebError, TaskError, OrganisationError, DirectoryError);

/// `true` for `fetch`/XHR requests that expect JSON.
#[must_use]
pub fn is_ajax(headers: &HeaderMap) -> bool {
    let requested_with = headers
        .get("x-requested-with")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("XMLHttpRequest"));
    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));
    requested_with || wants_json
}

/// Sign-in URL returning to `next` afterwards.
#[must_use]
pub fn login_url(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("/login/?next={encoded}")
}

impl From<TaskError> for WebError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(_)
            | TaskError::CommentNotFound(_)
            | TaskError::NotificationNotFound(_) => Self::NotFound,
            TaskError::AccessDenied(denied) => Self::Forbidden(denied.to_string()),
            TaskError::Domain(invalid) => Self::BadRequest(invalid.to_string()),
            TaskError::Repository(TaskRepositoryError::Persistence(cause)) => Self::internal(cause),
            TaskError::Repository(other) => Self::BadRequest(other.to_string()),
            TaskError::Organisation(inner) => organisation_repository(inner),
            TaskError::Workers(inner) => worker_repository(inner),
        }
    }
}

impl From<OrganisationError> for WebError {
    fn from(err: OrganisationError) -> Self {
        match err {
            OrganisationError::ProjectNotFound(_)
            | OrganisationError::TeamNotFound(_)
            | OrganisationError::TagNotFound(_)
            | OrganisationError::TaskTypeNotFound(_) => Self::NotFound,
            OrganisationError::AccessDenied(denied) => Self::Forbidden(denied.to_string()),
            OrganisationError::Domain(invalid) => Self::BadRequest(invalid.to_string()),
            OrganisationError::Repository(inner) => organisation_repository(inner),
        }
    }
}

impl From<DirectoryError> for WebError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(_) | DirectoryError::PositionNotFound(_) => Self::NotFound,
            DirectoryError::AccessDenied(denied) => Self::Forbidden(denied.to_string()),
            DirectoryError::Repository(inner) => worker_repository(inner),
            other @ (DirectoryError::Domain(_) | DirectoryError::InvalidCredentials) => {
                Self::BadRequest(other.to_string())
            }
        }
    }
}

fn organisation_repository(err: OrganisationRepositoryError) -> WebError {
    match err {
        OrganisationRepositoryError::Persistence(cause) => WebError::internal(cause),
        OrganisationRepositoryError::ProjectNotFound(_)
        | OrganisationRepositoryError::TeamNotFound(_)
        | OrganisationRepositoryError::TagNotFound(_)
        | OrganisationRepositoryError::TaskTypeNotFound(_) => WebError::NotFound,
        other => WebError::BadRequest(other.to_string()),
    }
}

fn worker_repository(err: WorkerRepositoryError) -> WebError {
    match err {
        WorkerRepositoryError::Persistence(cause) => WebError::internal(cause),
        WorkerRepositoryError::NotFound(_) | WorkerRepositoryError::PositionNotFound(_) => {
            WebError::NotFound
        }
        other => WebError::BadRequest(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{WebError, is_ajax, login_url};
    use crate::task::{domain::TaskId, services::TaskError};
    use crate::worker::domain::AccessDenied;
    use axum::http::{HeaderMap, HeaderValue, StatusCode};
    use rstest::rstest;

    #[rstest]
    #[case(TaskError::NotFound(TaskId::new()), StatusCode::NOT_FOUND)]
    #[case(TaskError::AccessDenied(AccessDenied::new("delete this task")), StatusCode::FORBIDDEN)]
    fn task_errors_map_to_status_codes(#[case] err: TaskError, #[case] status: StatusCode) {
        assert_eq!(WebError::from(err).status(), status);
    }

    #[test]
    fn login_url_encodes_the_return_path() {
        assert_eq!(login_url("/tasks/?page=2"), "/login/?next=%2Ftasks%2F%3Fpage%3D2");
    }

    #[test]
    fn detects_ajax_requests() {
        let mut headers = HeaderMap::new();
        assert!(!is_ajax(&headers));
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        assert!(is_ajax(&headers));
    }
}
