//! Double-submit CSRF protection.
//!
//! Every response to a client without a `csrftoken` cookie sets one. Unsafe
//! requests must echo the cookie value in the `X-CSRFToken` header or the
//! `csrfmiddlewaretoken` form field.

use super::{AppState, WebError, cookies};
use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{HeaderValue, Method, header},
    middleware::Next,
    response::Response,
};
use rand::RngCore;
use std::sync::Arc;
use tracing::warn;

/// Name of the token cookie, readable by client scripts.
pub const CSRF_COOKIE: &str = "csrftoken";
/// Header carrying the token on `fetch` requests.
pub const CSRF_HEADER: &str = "x-csrftoken";
/// Hidden form field carrying the token.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

const TOKEN_BYTES: usize = 32;
const COOKIE_MAX_AGE_SECONDS: i64 = 31_449_600;
const MAX_FORM_BYTES: usize = 2 * 1024 * 1024;

/// The token of the current request, for embedding into forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(pub String);

/// Middleware enforcing the token on unsafe methods.
pub async fn protect(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let existing = cookies::read(request.headers(), CSRF_COOKIE);
    let token = existing.clone().unwrap_or_else(new_token);
    let mut request = if is_safe(request.method()) {
        request
    } else {
        let headers = request.headers().clone();
        match verified(request, existing.as_deref()).await {
            Ok(request) => request,
            Err(err) => return err.respond(&headers),
        }
    };
    request.extensions_mut().insert(CsrfToken(token.clone()));

    let mut response = next.run(request).await;
    if existing.is_none() {
        let cookie = cookies::build(
            CSRF_COOKIE,
            &token,
            COOKIE_MAX_AGE_SECONDS,
            false,
            !state.config().debug,
        );
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE)
}

fn new_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

async fn verified(request: Request, expected: Option<&str>) -> Result<Request, WebError> {
    let Some(expected) = expected else {
        warn!(path = %request.uri().path(), "CSRF cookie missing");
        return Err(rejected());
    };
    let header_token = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    if let Some(supplied) = header_token {
        return if tokens_match(&supplied, expected) {
            Ok(request)
        } else {
            warn!(path = %request.uri().path(), "CSRF header mismatch");
            Err(rejected())
        };
    }

    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, MAX_FORM_BYTES)
        .await
        .map_err(|_| WebError::BadRequest("request body too large".to_owned()))?;
    let supplied = url::form_urlencoded::parse(&bytes)
        .find(|(key, _)| key == CSRF_FIELD)
        .map(|(_, value)| value.into_owned());
    match supplied {
        Some(token) if tokens_match(&token, expected) => {
            Ok(Request::from_parts(parts, Body::from(bytes)))
        }
        _ => {
            warn!(path = %parts.uri.path(), "CSRF form token missing or wrong");
            Err(rejected())
        }
    }
}

fn rejected() -> WebError {
    WebError::Forbidden("CSRF verification failed".to_owned())
}

fn tokens_match(supplied: &str, expected: &str) -> bool {
    let (left, right) = (supplied.as_bytes(), expected.as_bytes());
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0_u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::{is_safe, new_token, tokens_match};
    use axum::http::Method;

    #[test]
    fn tokens_compare_exactly() {
        let token = new_token();
        assert_eq!(token.len(), 64);
        assert!(tokens_match(&token, &token.clone()));
        assert!(!tokens_match(&token, &new_token()));
        assert!(!tokens_match("short", &token));
    }

    #[test]
    fn only_unsafe_methods_are_checked() {
        assert!(is_safe(&Method::GET));
        assert!(!is_safe(&Method::POST));
        assert!(!is_safe(&Method::DELETE));
    }
}
