//! Identifiers taken from the URL path.

use super::WebError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::Response,
};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Path parameters that must decode into identifiers.
///
/// A segment that does not decode names nothing that exists, so the request
/// is answered like any unknown record: the 404 page for browsers and
/// `{"success": false, "error": ...}` for AJAX clients.
#[derive(Debug, Clone, Copy)]
pub struct IdPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for IdPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(Self(value)),
            Err(rejection) => {
                debug!(path = parts.uri.path(), %rejection, "path identifier rejected");
                Err(WebError::NotFound.respond(&parts.headers))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IdPath;
    use crate::task::domain::TaskId;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::get,
    };
    use rstest::rstest;
    use tower::ServiceExt;

    async fn show(IdPath(id): IdPath<TaskId>) -> String {
        id.to_string()
    }

    fn app() -> Router {
        Router::new().route("/tasks/:id/", get(show))
    }

    #[rstest]
    #[case(None, "text/html")]
    #[case(Some("XMLHttpRequest"), "application/json")]
    #[tokio::test]
    async fn undecodable_ids_are_not_found(
        #[case] requested_with: Option<&str>,
        #[case] content_type: &str,
    ) {
        let mut request = Request::get("/tasks/not-a-uuid/");
        if let Some(value) = requested_with {
            request = request.header("x-requested-with", value);
        }
        let response = app()
            .oneshot(request.body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let served = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        assert!(served.starts_with(content_type), "served {served}");
    }

    #[tokio::test]
    async fn valid_ids_reach_the_handler() {
        let id = TaskId::new();
        let response = app()
            .oneshot(
                Request::get(format!("/tasks/{id}/"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
