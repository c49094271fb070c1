//! `Host` header validation against the allowed-hosts list.

use super::{AppState, WebError};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

const DEBUG_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];

/// Middleware answering 400 to requests for hosts this server does not
/// serve.
pub async fn check(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(strip_port)
        .unwrap_or_default();
    let config = state.config();
    if is_allowed(&host, &config.allowed_hosts, config.debug) {
        next.run(request).await
    } else {
        warn!(host = %host, "rejected request for disallowed host");
        WebError::BadRequest(format!("invalid host header: '{host}'")).into_response()
    }
}

fn strip_port(raw: &str) -> String {
    let host = raw.trim().to_ascii_lowercase();
    let bare = if host.starts_with('[') {
        host.split_inclusive(']').next()
    } else {
        host.split(':').next()
    };
    bare.unwrap_or_default().to_owned()
}

/// Applies the allowed-hosts rules: `*` matches anything, `.example.com`
/// matches the domain and its subdomains, other entries match exactly. In
/// debug mode an empty list admits local addresses.
#[must_use]
pub fn is_allowed(host: &str, allowed: &[String], debug: bool) -> bool {
    if allowed.is_empty() {
        return debug && DEBUG_HOSTS.contains(&host);
    }
    allowed.iter().any(|pattern| {
        if pattern == "*" {
            return true;
        }
        match pattern.strip_prefix('.') {
            Some(domain) => host == domain || host.ends_with(pattern.as_str()),
            None => host == pattern,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::{is_allowed, strip_port};
    use rstest::rstest;

    fn hosts(list: &[&str]) -> Vec<String> {
        list.iter().map(|host| (*host).to_owned()).collect()
    }

    #[rstest]
    #[case("example.com", &["example.com"], false, true)]
    #[case("evil.com", &["example.com"], false, false)]
    #[case("api.example.com", &[".example.com"], false, true)]
    #[case("example.com", &[".example.com"], false, true)]
    #[case("anything", &["*"], false, true)]
    #[case("localhost", &[], true, true)]
    #[case("localhost", &[], false, false)]
    #[case("example.com", &[], true, false)]
    fn applies_host_rules(
        #[case] host: &str,
        #[case] allowed: &[&str],
        #[case] debug: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(is_allowed(host, &hosts(allowed), debug), expected);
    }

    #[rstest]
    #[case("Example.com:8000", "example.com")]
    #[case("[::1]:8000", "[::1]")]
    #[case("localhost", "localhost")]
    fn strips_ports(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_port(raw), expected);
    }
}
