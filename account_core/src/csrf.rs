use reqwest::cookie::{CookieStore, Jar};
use std::fmt::Debug;
use std::sync::Arc;
use url::Url;

/// The header the server checks the token in.
pub const HEADER: &str = "X-CSRFToken";

/// The cookie the server hands the token out in.
pub const COOKIE: &str = "csrftoken";

/// Something that can hand out an anti-forgery token for the next request.
/// Returning `None` means the request goes out without one (and the server
/// will probably reject it.)
pub trait CsrfToken: Debug + Send + Sync {
    /// The token to send, if there is one.
    fn csrf_token(&self) -> Option<String>;
}

/// A token we already know, e.g. from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a known token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CsrfToken for StaticToken {
    fn csrf_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Read the token out of the cookie jar shared with the HTTP client, the same
/// way a browser page would read `document.cookie`.
#[derive(Debug, Clone)]
pub struct CookieJarToken {
    /// The jar the HTTP client stores cookies in.
    jar: Arc<Jar>,

    /// Which site's cookies to look at.
    url: Url,
}

impl CookieJarToken {
    /// Look for the token in `jar` under `url`.
    pub fn new(jar: Arc<Jar>, url: Url) -> Self {
        Self { jar, url }
    }
}

impl CsrfToken for CookieJarToken {
    fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.url)?;

        find_cookie(header.to_str().ok()?, COOKIE)
    }
}

/// Find a cookie's value in a `Cookie` header like `a=1; csrftoken=abc`.
fn find_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
