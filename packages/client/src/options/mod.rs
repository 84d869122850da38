//! Strongly typed options bag.
//!
//! One `Options` value is held by the client (defaults) and another is passed
//! with every call (overrides). [`Layered`] answers "which value applies" for
//! each key, the call tier winning whenever both define it.

use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};

pub mod body;
pub mod query;
pub mod value;

pub use body::{FormBody, JsonBody, Multipart};
pub use query::Query;

use crate::error::{self, Error};

/// Cookie jar behaviour for a client or a call.
#[derive(Debug, Clone, PartialEq)]
pub enum Cookies {
    /// Attach the client's jar, creating it on first use.
    Enabled,
    /// Detach the jar; nothing is sent or stored.
    Disabled,
    /// Attach the jar and seed it with these cookies for the current host.
    Preset(Vec<cookie::Cookie<'static>>),
}

impl From<bool> for Cookies {
    fn from(enabled: bool) -> Self {
        if enabled {
            Cookies::Enabled
        } else {
            Cookies::Disabled
        }
    }
}

/// Credentials for HTTP basic authentication.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Named, optional configuration values for one client or one call.
///
/// `base_uri`, `timeout`, `proxy` and `http2` configure the transport and are
/// only read from the client's options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub base_uri: Option<String>,
    pub headers: Option<HeaderMap>,
    pub cookies: Option<Cookies>,
    pub auth: Option<BasicAuth>,
    pub query: Option<Query>,
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
    pub json: Option<JsonBody>,
    pub form_params: Option<FormBody>,
    pub multipart: Option<Multipart>,
    pub http2: Option<bool>,
    pub reset_error: Option<bool>,
    /// Errors from builder methods, reported when the options are used.
    pub(crate) deferred: Vec<Error>,
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Adds a header, keeping earlier values of the same name.
    ///
    /// Invalid names or values are not applied; they surface as
    /// `Kind::InvalidHeader` when the options are used.
    #[must_use]
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        let name = HeaderName::try_from(key).map_err(Into::into);
        let value = HeaderValue::try_from(value).map_err(Into::into);
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers
                    .get_or_insert_with(HeaderMap::new)
                    .append(name, value);
            }
            (Err(e), _) | (_, Err(e)) => self.deferred.push(error::invalid_header(e)),
        }
        self
    }

    /// Merges a whole header map, appending to any headers already set.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let target = self.headers.get_or_insert_with(HeaderMap::new);
        let mut last: Option<HeaderName> = None;
        for (name, value) in headers {
            // `HeaderMap::into_iter` yields the name only for the first value
            if let Some(name) = name {
                last = Some(name);
            }
            if let Some(name) = last.clone() {
                target.append(name, value);
            }
        }
        self
    }

    #[must_use]
    pub fn cookies(mut self, cookies: impl Into<Cookies>) -> Self {
        self.cookies = Some(cookies.into());
        self
    }

    /// Enables the jar and seeds it with `cookies`.
    #[must_use]
    pub fn cookie_list<I>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = cookie::Cookie<'static>>,
    {
        self.cookies = Some(Cookies::Preset(cookies.into_iter().collect()));
        self
    }

    #[must_use]
    pub fn auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(BasicAuth {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    #[must_use]
    pub fn json(mut self, json: impl Into<JsonBody>) -> Self {
        self.json = Some(json.into());
        self
    }

    #[must_use]
    pub fn form_params(mut self, form: impl Into<FormBody>) -> Self {
        self.form_params = Some(form.into());
        self
    }

    #[must_use]
    pub fn multipart(mut self, multipart: Multipart) -> Self {
        self.multipart = Some(multipart);
        self
    }

    #[must_use]
    pub fn http2(mut self, enabled: bool) -> Self {
        self.http2 = Some(enabled);
        self
    }

    #[must_use]
    pub fn reset_error(mut self, reset: bool) -> Self {
        self.reset_error = Some(reset);
        self
    }

    /// Errors recorded by builder methods that could not apply their input.
    #[must_use]
    pub fn deferred_errors(&self) -> &[Error] {
        &self.deferred
    }

    /// Records an error to be reported when these options are used.
    ///
    /// For wrappers whose own conversions can fail, such as serializing a
    /// body ahead of the call.
    #[must_use]
    pub fn defer_error(mut self, error: Error) -> Self {
        self.deferred.push(error);
        self
    }

    pub(crate) fn has_transport_settings(&self) -> bool {
        self.base_uri.is_some()
            || self.timeout.is_some()
            || self.proxy.is_some()
            || self.http2.is_some()
    }
}

/// Call-level options seen through the client-level defaults.
#[derive(Debug, Clone, Copy)]
pub struct Layered<'a> {
    pub call: &'a Options,
    pub client: &'a Options,
}

impl<'a> Layered<'a> {
    #[must_use]
    pub fn new(call: &'a Options, client: &'a Options) -> Self {
        if call.has_transport_settings() {
            tracing::debug!("base_uri, timeout, proxy and http2 are only read from client options");
        }
        Self { call, client }
    }

    #[must_use]
    pub fn base_uri(&self) -> Option<&'a str> {
        self.client.base_uri.as_deref()
    }

    #[must_use]
    pub fn query(&self) -> Option<&'a Query> {
        self.call.query.as_ref().or(self.client.query.as_ref())
    }

    #[must_use]
    pub fn auth(&self) -> Option<&'a BasicAuth> {
        self.call.auth.as_ref().or(self.client.auth.as_ref())
    }

    #[must_use]
    pub fn cookies(&self) -> Option<&'a Cookies> {
        self.call.cookies.as_ref().or(self.client.cookies.as_ref())
    }

    /// Errors are cleared before a call unless `reset_error` is `false`.
    #[must_use]
    pub fn reset_error(&self) -> bool {
        self.call
            .reset_error
            .or(self.client.reset_error)
            .unwrap_or(true)
    }

    /// Builder errors carried by either tier, client tier first.
    pub fn deferred(&self) -> impl Iterator<Item = &'a Error> {
        self.client.deferred.iter().chain(self.call.deferred.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    #[test]
    fn call_tier_wins() {
        let client = Options::new().query("a=1").auth("u", "p").reset_error(false);
        let call = Options::new().query("b=2");
        let layered = Layered::new(&call, &client);

        assert_eq!(layered.query(), Some(&Query::Raw("b=2".into())));
        assert_eq!(layered.auth().map(|a| a.username.as_str()), Some("u"));
        assert!(!layered.reset_error());
    }

    #[test]
    fn reset_error_defaults_to_true() {
        let client = Options::new();
        let call = Options::new();
        assert!(Layered::new(&call, &client).reset_error());

        let call = Options::new().reset_error(true);
        let client = Options::new().reset_error(false);
        assert!(Layered::new(&call, &client).reset_error());
    }

    #[test]
    fn invalid_header_is_deferred() {
        let opts = Options::new()
            .header("x-ok", "1")
            .header("bad header", "2");
        assert_eq!(opts.headers.as_ref().map(HeaderMap::len), Some(1));
        assert_eq!(opts.deferred_errors()[0].kind(), Kind::InvalidHeader);
    }

    #[test]
    fn headers_merge_keeps_multiple_values() {
        let mut extra = HeaderMap::new();
        extra.append("x-multi", HeaderValue::from_static("a"));
        extra.append("x-multi", HeaderValue::from_static("b"));

        let opts = Options::new().header("x-multi", "z").headers(extra);
        let values: Vec<_> = opts
            .headers
            .as_ref()
            .map(|h| h.get_all("x-multi").iter().collect())
            .unwrap_or_default();
        assert_eq!(values.len(), 3);
    }
}
