//! Auth cookies: building `Set-Cookie` values and reading the `Cookie` header.
//!
//! Both tokens are sent as `HttpOnly; SameSite=Lax; Path=/` cookies, with
//! `Secure` added when the server runs behind HTTPS.

use axum::http::header::COOKIE;
use axum::http::HeaderMap;

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// A `Set-Cookie` header value.
pub fn set_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie =
        format!("{name}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// A `Set-Cookie` header value that deletes the cookie.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    set_cookie(name, "", 0, secure)
}

/// Find a cookie by name across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn set_cookie_has_expected_attributes() {
        assert_eq!(
            set_cookie(ACCESS_TOKEN_COOKIE, "abc", 900, false),
            "access_token=abc; HttpOnly; SameSite=Lax; Path=/; Max-Age=900"
        );
        assert!(set_cookie(REFRESH_TOKEN_COOKIE, "r", 60, true).ends_with("; Secure"));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        assert!(clear_cookie(REFRESH_TOKEN_COOKIE, false).contains("Max-Age=0"));
    }

    #[test]
    fn reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; access_token=tok123"));
        headers.append(COOKIE, HeaderValue::from_static("refresh_token=ref456"));

        assert_eq!(read_cookie(&headers, ACCESS_TOKEN_COOKIE).as_deref(), Some("tok123"));
        assert_eq!(read_cookie(&headers, REFRESH_TOKEN_COOKIE).as_deref(), Some("ref456"));
        assert_eq!(read_cookie(&headers, "session"), None);
    }

    #[test]
    fn empty_cookie_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("access_token="));
        assert_eq!(read_cookie(&headers, ACCESS_TOKEN_COOKIE), None);
    }
}
