//! The client and its per-session state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use http::{HeaderMap, Method};
use serde_json::Value;
use url::Url;

use super::ClientBuilder;
use super::stats::{ClientStats, ClientStatsSnapshot};
use crate::config::{ClientConfig, TransportConfig};
use crate::cookie::Jar;
use crate::error::{self, Errors};
use crate::options::{Cookies, Layered, Options};
use crate::request::{self, Body, ResolveContext, ResolvedRequest, default_headers};
use crate::response::Response;
use crate::transport::Transport;

/// A configured HTTP client.
///
/// Cloning is cheap and clones share the connection pool, the cookie jar
/// and the error accumulator.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientRef>,
}

#[derive(Debug)]
struct ClientRef {
    config: ClientConfig,
    /// Client headers with the default `User-Agent` applied.
    headers: HeaderMap,
    transport: Transport,
    session: Mutex<Session>,
    stats: ClientStats,
}

/// State that calls update: last origin, cookie jar and recorded errors.
#[derive(Debug, Default)]
struct Session {
    current_uri: Option<Url>,
    jar: Option<Jar>,
    jar_attached: bool,
    cookies_closed: bool,
    errors: Errors,
}

impl Default for Client {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Client {
    /// A client using `options` as defaults for every call.
    pub fn new(options: Options) -> Self {
        Self::with_config(ClientConfig {
            transport: TransportConfig::from_options(&options),
            options,
        })
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// A client configured from an untyped JSON object.
    ///
    /// # Errors
    ///
    /// Every mistyped option, see [`Options::from_value`].
    pub fn from_value(value: Value) -> Result<Self, Errors> {
        Options::from_value(value).map(Self::new)
    }

    pub(crate) fn with_config(config: ClientConfig) -> Self {
        let headers = default_headers(config.options.headers.as_ref());
        let transport = Transport::new(config.transport.clone());
        tracing::debug!(transport = ?config.transport, "client created");
        Self {
            inner: Arc::new(ClientRef {
                config,
                headers,
                transport,
                session: Mutex::new(Session::default()),
                stats: ClientStats::new(),
            }),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The client-tier options.
    pub fn options(&self) -> &Options {
        &self.inner.config.options
    }

    pub async fn get(&self, uri: &str, options: Options) -> Result<Response, Errors> {
        self.request(Method::GET, uri, options).await
    }

    pub async fn post(&self, uri: &str, options: Options) -> Result<Response, Errors> {
        self.request(Method::POST, uri, options).await
    }

    pub async fn head(&self, uri: &str, options: Options) -> Result<Response, Errors> {
        self.request(Method::HEAD, uri, options).await
    }

    pub async fn put(&self, uri: &str, options: Options) -> Result<Response, Errors> {
        self.request(Method::PUT, uri, options).await
    }

    pub async fn delete(&self, uri: &str, options: Options) -> Result<Response, Errors> {
        self.request(Method::DELETE, uri, options).await
    }

    /// Runs one call.
    ///
    /// Stored errors are cleared first unless `reset_error` is `false`.
    /// Every preparation error is collected before giving up, and the
    /// request is only sent when there is none.
    ///
    /// # Errors
    ///
    /// The errors of this call, which are also appended to [`Client::errors`].
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        mut options: Options,
    ) -> Result<Response, Errors> {
        let stats = &self.inner.stats;
        stats.record_call();

        let mut errors = Errors::new();
        for e in self.inner.transport.setup_errors() {
            errors.push(e.clone());
        }

        let (strip_cookie, reads_files) = {
            let layered = Layered::new(&options, self.options());
            let mut session = self.session();
            if layered.reset_error() {
                session.errors.clear();
            }
            (session.cookies_closed, Body::resolve(&layered).reads_files())
        };

        // the session lock is not held while resolving; file reads block
        let resolved = if reads_files {
            let client = self.clone();
            let uri = uri.to_owned();
            let joined = tokio::task::spawn_blocking(move || {
                let mut errors = Errors::new();
                let resolved = client.prepare(method, &uri, &options, strip_cookie, &mut errors);
                (resolved, errors, options)
            })
            .await;
            match joined {
                Ok((resolved, resolve_errors, returned)) => {
                    errors.extend(resolve_errors);
                    options = returned;
                    resolved
                }
                Err(e) => {
                    errors.push(error::request(e));
                    return Err(self.fail(errors));
                }
            }
        } else {
            self.prepare(method, uri, &options, strip_cookie, &mut errors)
        };

        let (resolved, jar) = {
            let layered = Layered::new(&options, self.options());
            let mut session = self.session();
            if let Some(resolved) = &resolved {
                session.current_uri = Some(resolved.origin.clone());
            }
            match resolved {
                Some(resolved) if errors.is_empty() => {
                    let jar = session.attach_jar(&layered, &resolved.origin);
                    (resolved, jar)
                }
                _ => {
                    drop(session);
                    return Err(self.fail(errors));
                }
            }
        };

        stats.record_bytes_sent(resolved.body.len());
        match self.inner.transport.execute(resolved, jar.as_ref()).await {
            Ok(response) => {
                stats.record_bytes_received(response.bytes().len());
                Ok(response)
            }
            Err(e) => {
                tracing::debug!("call failed: {e}");
                errors.push(e);
                Err(self.fail(errors))
            }
        }
    }

    /// Prepares a call without sending it.
    ///
    /// Reads multipart files but performs no network I/O and leaves the
    /// client state untouched.
    ///
    /// # Errors
    ///
    /// Every preparation error of the call.
    pub fn resolve(
        &self,
        method: Method,
        uri: &str,
        options: &Options,
    ) -> Result<ResolvedRequest, Errors> {
        let strip_cookie = self.session().cookies_closed;
        let mut errors = Errors::new();
        match self.prepare(method, uri, options, strip_cookie, &mut errors) {
            Some(resolved) => errors.into_result(resolved),
            None => Err(errors),
        }
    }

    fn prepare(
        &self,
        method: Method,
        uri: &str,
        options: &Options,
        strip_cookie: bool,
        errors: &mut Errors,
    ) -> Option<ResolvedRequest> {
        let layered = Layered::new(options, self.options());
        let context = ResolveContext {
            client_headers: &self.inner.headers,
            strip_cookie,
        };
        request::resolve(method, uri, &layered, context, errors)
    }

    /// Records a failed call and hands its errors back.
    fn fail(&self, errors: Errors) -> Errors {
        self.session().errors.extend(errors.clone());
        self.inner.stats.record_failure();
        errors
    }

    /// Errors recorded by previous calls.
    pub fn errors(&self) -> Errors {
        self.session().errors.clone()
    }

    pub fn reset_errors(&self) {
        self.session().errors.clear();
    }

    /// The jar's cookies for the current URI; empty without an attached jar.
    pub fn cookies(&self) -> Vec<cookie::Cookie<'static>> {
        let session = self.session();
        match (&session.jar, &session.current_uri) {
            (Some(jar), Some(uri)) if session.jar_attached => jar.matches(uri),
            _ => Vec::new(),
        }
    }

    /// Stops sending the client's `Cookie` header and disables the jar for
    /// later calls. A call can still enable cookies through its options.
    pub fn close_cookies(&self) {
        let mut session = self.session();
        session.cookies_closed = true;
        session.jar_attached = false;
        tracing::debug!("cookies closed");
    }

    /// Origin of the last resolved call.
    pub fn current_uri(&self) -> Option<Url> {
        self.session().current_uri.clone()
    }

    pub fn stats(&self) -> ClientStatsSnapshot {
        self.inner.stats.snapshot()
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Session {
    /// Applies the effective `cookies` setting and returns the jar to use.
    ///
    /// Without any setting the jar is detached. An empty preset list leaves
    /// the previous state unchanged.
    fn attach_jar(&mut self, options: &Layered<'_>, origin: &Url) -> Option<Jar> {
        let client_setting = if self.cookies_closed {
            Some(&Cookies::Disabled)
        } else {
            options.client.cookies.as_ref()
        };

        match options.call.cookies.as_ref().or(client_setting) {
            Some(Cookies::Enabled) => self.jar_attached = true,
            Some(Cookies::Preset(cookies)) if !cookies.is_empty() => {
                self.jar
                    .get_or_insert_with(Jar::new)
                    .add_cookies(cookies.iter().cloned(), origin);
                self.jar_attached = true;
            }
            Some(Cookies::Preset(_)) => {}
            Some(Cookies::Disabled) | None => self.jar_attached = false,
        }

        if self.jar_attached {
            Some(self.jar.get_or_insert_with(Jar::new).clone())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;

    #[tokio::test]
    async fn relative_uri_without_base_is_rejected_before_dispatch() {
        let client = Client::default();
        let errors = client
            .get("/path", Options::new())
            .await
            .expect_err("no base uri");

        assert_eq!(errors.kinds(), vec![Kind::EmptyBaseUri]);
        assert_eq!(client.errors().kinds(), vec![Kind::EmptyBaseUri]);
        assert_eq!(client.stats().calls_failed, 1);
    }

    #[tokio::test]
    async fn errors_accumulate_only_when_reset_is_disabled() {
        let client = Client::new(Options::new().reset_error(false));
        let _ = client.get("a", Options::new()).await;
        let _ = client.get("b", Options::new()).await;
        assert_eq!(client.errors().len(), 2);

        let _ = client.get("c", Options::new().reset_error(true)).await;
        assert_eq!(client.errors().len(), 1);

        client.reset_errors();
        assert!(client.errors().is_empty());
    }

    #[tokio::test]
    async fn invalid_proxy_is_reported_by_every_call() {
        let client = Client::builder().proxy("ftp://nope").build();
        for _ in 0..2 {
            let errors = client
                .get("http://127.0.0.1:9/", Options::new())
                .await
                .expect_err("proxy error");
            assert!(errors.contains(Kind::Proxy));
        }
    }

    #[test]
    fn resolve_is_side_effect_free() {
        let client = Client::new(Options::new().base_uri("http://host/"));
        let resolved = client
            .resolve(Method::GET, "x", &Options::new().query("a=1"))
            .expect("resolved");
        assert_eq!(resolved.url.as_str(), "http://host/x?a=1");
        assert!(client.current_uri().is_none());
    }

    #[test]
    fn preset_cookies_seed_the_jar() {
        let client = Client::default();
        let origin = Url::parse("http://example.com/").expect("url");
        let call = Options::new().cookie_list(vec![cookie::Cookie::new("k", "v")]);
        let none = Options::new();

        let jar = client
            .session()
            .attach_jar(&Layered::new(&call, &none), &origin);
        assert!(jar.is_some());
        client.session().current_uri = Some(origin);
        assert_eq!(client.cookies().len(), 1);

        client.close_cookies();
        assert!(client.cookies().is_empty());
        let origin = Url::parse("http://example.com/").expect("url");
        let jar = client
            .session()
            .attach_jar(&Layered::new(&none, &none), &origin);
        assert!(jar.is_none());
    }
}
