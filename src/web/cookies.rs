//! Cookie header parsing and `Set-Cookie` formatting.

use axum::http::{HeaderMap, header};

/// Returns the value of cookie `name` from the request headers.
#[must_use]
pub fn read(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_owned())
        .filter(|value| !value.is_empty())
}

/// Formats a `Set-Cookie` value scoped to the whole site with `SameSite=Lax`.
#[must_use]
pub fn build(name: &str, value: &str, max_age: i64, http_only: bool, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; Max-Age={max_age}; SameSite=Lax");
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::{build, read};
    use axum::http::{HeaderMap, HeaderValue, header};

    #[test]
    fn reads_named_cookie_among_several() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; csrftoken=abc123; sessionid=tok"),
        );
        assert_eq!(read(&headers, "csrftoken").as_deref(), Some("abc123"));
        assert_eq!(read(&headers, "sessionid").as_deref(), Some("tok"));
        assert_eq!(read(&headers, "missing"), None);
    }

    #[test]
    fn formats_flags() {
        assert_eq!(
            build("sessionid", "tok", 60, true, true),
            "sessionid=tok; Path=/; Max-Age=60; SameSite=Lax; HttpOnly; Secure"
        );
        assert_eq!(
            build("csrftoken", "abc", 10, false, false),
            "csrftoken=abc; Path=/; Max-Age=10; SameSite=Lax"
        );
    }
}
