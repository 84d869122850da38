//! Sending resolved requests over the network.
//!
//! The [`Transport`] owns the connector and the connection pool of one
//! client. It follows redirects, keeps the cookie jar in sync on every hop,
//! enforces the per-call timeout and decompresses bodies.

use std::error::Error as StdError;

use bytes::Bytes;
use http::header::{ACCEPT_ENCODING, COOKIE, PROXY_AUTHORIZATION};
use http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, Version};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use url::Url;

mod connect;
mod decode;
mod proxy;
mod redirect;
mod tls;

use connect::Connector;

use crate::config::TransportConfig;
use crate::cookie::{CookieStore, Jar};
use crate::error::{self, Error};
use crate::request::ResolvedRequest;
use crate::response::Response;

/// Connection management and request dispatch for one client.
///
/// Pooling, HTTP/2 sharing and the retry of requests on connections the
/// peer already closed are handled by the hyper-util client.
pub struct Transport {
    config: TransportConfig,
    client: Option<HyperClient<Connector, Full<Bytes>>>,
    /// Sent with plain HTTP requests to a forwarding proxy.
    proxy_authorization: Option<HeaderValue>,
    /// Configuration problems, reported by every call.
    setup_errors: Vec<Error>,
}

struct Exchange {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl Transport {
    /// Builds the transport. Invalid settings are kept as setup errors
    /// instead of failing construction.
    pub fn new(config: TransportConfig) -> Self {
        let mut setup_errors = Vec::new();

        let proxy = match config.proxy.as_deref().map(proxy::Proxy::parse) {
            Some(Ok(proxy)) => Some(proxy),
            Some(Err(e)) => {
                tracing::warn!("invalid proxy configured: {e}");
                setup_errors.push(e);
                None
            }
            None => None,
        };
        let proxy_authorization = proxy.as_ref().and_then(|p| p.authorization.clone());

        let client = match tls::connector(&config) {
            Ok(tls) => {
                let connector = Connector::new(tls, proxy, config.connect_timeout);
                Some(
                    HyperClient::builder(TokioExecutor::new())
                        .pool_idle_timeout(config.pool_idle_timeout)
                        .pool_max_idle_per_host(config.pool_max_idle_per_host)
                        .pool_timer(TokioTimer::new())
                        .build(connector),
                )
            }
            Err(e) => {
                tracing::warn!("tls setup failed: {e}");
                setup_errors.push(e);
                None
            }
        };

        Self {
            config,
            client,
            proxy_authorization,
            setup_errors,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn setup_errors(&self) -> &[Error] {
        &self.setup_errors
    }

    /// Sends `request`, following redirects, within the configured timeout.
    ///
    /// # Errors
    ///
    /// The first transport failure: setup errors, connect, TLS, proxy,
    /// timeout, redirect, body or decode errors.
    pub async fn execute(
        &self,
        request: ResolvedRequest,
        jar: Option<&Jar>,
    ) -> Result<Response, Error> {
        if let Some(e) = self.setup_errors.first() {
            return Err(e.clone());
        }

        let url = request.url.clone();
        match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, self.follow(request, jar))
                .await
                .map_err(|_| {
                    tracing::debug!(?limit, "call timed out");
                    error::timeout(url)
                })?,
            None => self.follow(request, jar).await,
        }
    }

    async fn follow(
        &self,
        request: ResolvedRequest,
        jar: Option<&Jar>,
    ) -> Result<Response, Error> {
        let ResolvedRequest {
            mut method,
            mut url,
            mut headers,
            mut body,
            ..
        } = request;

        let decompress = method != Method::HEAD && !headers.contains_key(ACCEPT_ENCODING);
        if decompress {
            headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(decode::ACCEPT_ENCODING));
        }

        let mut hops = 0;
        loop {
            let mut hop_headers = headers.clone();
            if let Some(jar) = jar {
                attach_cookies(&mut hop_headers, jar, &url);
            }

            let Exchange {
                status,
                version,
                headers: mut response_headers,
                body: response_body,
            } = self.exchange(&method, &url, hop_headers, body.clone()).await?;

            if let Some(jar) = jar {
                jar.store_response(&response_headers, &url);
            }

            let next = match redirect::follow(status, &method) {
                Some(next) if self.config.max_redirects > 0 => {
                    redirect::location(&response_headers, &url)?.map(|location| (next, location))
                }
                _ => None,
            };

            if let Some((next, location)) = next {
                if hops >= self.config.max_redirects {
                    return Err(redirect::too_many(self.config.max_redirects, &url));
                }
                hops += 1;
                tracing::debug!(%status, from = %url, to = %location, "following redirect");

                redirect::remove_sensitive_headers(&mut headers, &location, &url);
                if !next.keep_body {
                    body = Bytes::new();
                    redirect::remove_body_headers(&mut headers);
                }
                method = next.method;
                url = location;
                continue;
            }

            let body = if decompress {
                decode::decode(&mut response_headers, response_body)
                    .map_err(|e| e.with_url(url.clone()))?
            } else {
                response_body
            };
            return Ok(Response::new(status, version, response_headers, url, body));
        }
    }

    /// One request and its complete response.
    async fn exchange(
        &self,
        method: &Method,
        url: &Url,
        mut headers: HeaderMap,
        body: Bytes,
    ) -> Result<Exchange, Error> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| error::tls("tls is not configured"))?;

        if url.scheme() == "http" {
            if let Some(authorization) = &self.proxy_authorization {
                headers.insert(PROXY_AUTHORIZATION, authorization.clone());
            }
        }

        let mut request = Request::builder()
            .method(method.clone())
            .uri(request_uri(url)?)
            .body(Full::new(body))
            .map_err(error::request)?;
        *request.headers_mut() = headers;

        let response = client
            .request(request)
            .await
            .map_err(|e| dispatch_error(e).with_url(url.clone()))?;

        let (parts, incoming) = response.into_parts();
        let body = incoming
            .collect()
            .await
            .map_err(|e| error::body(e).with_url(url.clone()))?
            .to_bytes();

        Ok(Exchange {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body,
        })
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.config)
            .field("setup_errors", &self.setup_errors)
            .finish()
    }
}

/// Adds the jar's cookies for `url` after any cookie set explicitly.
fn attach_cookies(headers: &mut HeaderMap, jar: &Jar, url: &Url) {
    let Some(stored) = jar.cookies(url) else {
        return;
    };
    let combined = match headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
        Some(explicit) if !explicit.is_empty() => {
            let joined = format!("{explicit}; {}", stored.to_str().unwrap_or_default());
            HeaderValue::from_str(&joined).unwrap_or(stored)
        }
        _ => stored,
    };
    headers.insert(COOKIE, combined);
}

fn request_uri(url: &Url) -> Result<Uri, Error> {
    let mut target = url.clone();
    target.set_fragment(None);
    target
        .as_str()
        .parse::<Uri>()
        .map_err(|e| error::invalid_uri(url.as_str(), e))
}

/// Recovers the connector's own error from the hyper-util wrapper.
fn dispatch_error(e: hyper_util::client::legacy::Error) -> Error {
    let mut source = e.source();
    while let Some(cause) = source {
        if let Some(inner) = cause.downcast_ref::<Error>() {
            return inner.clone();
        }
        source = cause.source();
    }
    if e.is_connect() {
        error::connect(e)
    } else {
        error::request(e)
    }
}
