//! Client construction.

use std::time::Duration;

use super::Client;
use crate::config::{ClientConfig, TransportConfig};
use crate::options::Options;

/// Builds a [`Client`] from options and transport settings.
///
/// Settings made on the builder win over the matching `timeout`, `proxy`
/// and `http2` keys of the options, whatever the call order.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct ClientBuilder {
    options: Options,
    transport: TransportConfig,
    timeout: Option<Duration>,
    proxy: Option<String>,
    http2: Option<bool>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client-tier options used as defaults by every call.
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Total cap for one call; zero disables the cap.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.transport.connect_timeout = timeout;
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn http2(mut self, enabled: bool) -> Self {
        self.http2 = Some(enabled);
        self
    }

    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.transport.pool_max_idle_per_host = max;
        self
    }

    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.transport.pool_idle_timeout = timeout;
        self
    }

    /// Zero disables redirect following.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.transport.max_redirects = max;
        self
    }

    pub fn use_native_certs(mut self, enabled: bool) -> Self {
        self.transport.use_native_certs = enabled;
        self
    }

    /// Never fails: configuration errors are reported by every call.
    pub fn build(self) -> Client {
        let mut transport = self.transport.merge_options(&self.options);
        if let Some(timeout) = self.timeout {
            transport = transport.with_timeout(Some(timeout));
        }
        if let Some(proxy) = self.proxy {
            transport.proxy = Some(proxy);
        }
        if let Some(http2) = self.http2 {
            transport = transport.with_http2(http2);
        }

        Client::with_config(ClientConfig {
            options: self.options,
            transport,
        })
    }
}
