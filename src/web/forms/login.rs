//! Login form and post-login redirect target.

use serde::Deserialize;
use url::Url;

/// Where users land after logging in without a `next` parameter.
pub const DEFAULT_LOGIN_REDIRECT: &str = "/catalog/";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: String,
    pub csrf_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

/// Accepts `next` only if it is a path on this site.
///
/// Absolute URLs, scheme-relative `//host` paths and backslash tricks fall
/// back to [`DEFAULT_LOGIN_REDIRECT`]. The accepted path and query come back
/// percent-encoded, ready for a `Location` header.
pub fn safe_next(next: &str) -> String {
    let next = next.trim();
    let is_local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.contains('\\')
        && !next.chars().any(char::is_control);

    if !is_local {
        return DEFAULT_LOGIN_REDIRECT.to_string();
    }

    let Ok(url) = Url::parse("http://localhost/").and_then(|base| base.join(next)) else {
        return DEFAULT_LOGIN_REDIRECT.to_string();
    };

    match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_accepts_local_paths() {
        assert_eq!(safe_next("/catalog/mybooks"), "/catalog/mybooks");
        assert_eq!(safe_next("/catalog/borrowed?page=2"), "/catalog/borrowed?page=2");
        assert_eq!(safe_next(" /catalog/mybooks/ "), "/catalog/mybooks/");
    }

    #[test]
    fn test_safe_next_percent_encodes() {
        assert_eq!(
            safe_next("/catalog/книги"),
            "/catalog/%D0%BA%D0%BD%D0%B8%D0%B3%D0%B8"
        );
        assert_eq!(safe_next("/catalog/a b?q=é"), "/catalog/a%20b?q=%C3%A9");
        assert_eq!(safe_next("/catalog/%D0%BA"), "/catalog/%D0%BA");
    }

    #[test]
    fn test_safe_next_rejects_offsite() {
        assert_eq!(safe_next(""), DEFAULT_LOGIN_REDIRECT);
        assert_eq!(safe_next("https://evil.example"), DEFAULT_LOGIN_REDIRECT);
        assert_eq!(safe_next("//evil.example"), DEFAULT_LOGIN_REDIRECT);
        assert_eq!(safe_next("/\\evil.example"), DEFAULT_LOGIN_REDIRECT);
    }
}
