use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use url::Url;

/// Session storage for cookies received from servers.
pub trait CookieStore: Send + Sync {
    /// Stores the `Set-Cookie` values received from `url`.
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url);
    /// The `Cookie` header value to send to `url`, if any cookie matches.
    fn cookies(&self, url: &Url) -> Option<HeaderValue>;
}

/// The default [`CookieStore`], backed by `cookie_store`.
///
/// Cloning a jar shares the underlying store.
#[derive(Default, Clone)]
pub struct Jar(Arc<RwLock<cookie_store::CookieStore>>);

impl Jar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores cookies as if `url` had sent them.
    ///
    /// Cookies without a `Domain` attribute become host-only cookies for
    /// `url`'s host.
    pub fn add_cookies<I>(&self, cookies: I, url: &Url)
    where
        I: IntoIterator<Item = cookie::Cookie<'static>>,
    {
        let mut store = self.0.write().unwrap_or_else(PoisonError::into_inner);
        store.store_response_cookies(cookies.into_iter(), url);
    }

    /// Parses and stores one `Set-Cookie` style string.
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        match cookie::Cookie::parse(cookie) {
            Ok(parsed) => self.add_cookies(Some(parsed.into_owned()), url),
            Err(e) => tracing::debug!("ignoring unparsable cookie {cookie:?}: {e}"),
        }
    }

    /// Stores every `Set-Cookie` header of a response.
    pub fn store_response(&self, headers: &HeaderMap, url: &Url) {
        self.set_cookies(&mut headers.get_all(SET_COOKIE).iter(), url);
    }

    /// Unexpired cookies that would be sent to `url`.
    #[must_use]
    pub fn matches(&self, url: &Url) -> Vec<cookie::Cookie<'static>> {
        let store = self.0.read().unwrap_or_else(PoisonError::into_inner);
        store
            .matches(url)
            .into_iter()
            .map(|stored| (**stored).clone().into_owned())
            .collect()
    }

    /// Number of unexpired cookies held, for any host.
    #[must_use]
    pub fn len(&self) -> usize {
        let store = self.0.read().unwrap_or_else(PoisonError::into_inner);
        store.iter_unexpired().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CookieStore for Jar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let cookies: Vec<_> = cookie_headers
            .filter_map(|value| value.to_str().ok())
            .filter_map(|value| cookie::Cookie::parse(value).ok())
            .map(cookie::Cookie::into_owned)
            .collect();
        if cookies.is_empty() {
            return;
        }
        self.add_cookies(cookies, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        let value = {
            let store = self.0.read().unwrap_or_else(PoisonError::into_inner);
            store
                .get_request_values(url)
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ")
        };

        if value.is_empty() {
            return None;
        }
        HeaderValue::from_str(&value).ok()
    }
}

impl fmt::Debug for Jar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jar").field("cookies", &self.len()).finish()
    }
}
