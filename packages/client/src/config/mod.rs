//! Client configuration.
//!
//! A client is configured once, at construction, from its [`Options`] and a
//! [`TransportConfig`]. The resulting [`ClientConfig`] is immutable and shared
//! by every call.

use std::time::Duration;

use crate::options::Options;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 8;
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Transport settings fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Total cap for one call, redirects included. `None` means no cap.
    pub timeout: Option<Duration>,
    pub connect_timeout: Duration,
    /// `http://[user:pass@]host:port`
    pub proxy: Option<String>,
    /// Offer `h2` through ALPN on TLS connections.
    pub http2: bool,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub max_redirects: usize,
    /// Trust the platform certificate store in addition to the bundled roots.
    pub use_native_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            proxy: None,
            http2: false,
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            use_native_certs: false,
        }
    }
}

impl TransportConfig {
    /// Reads `timeout`, `proxy` and `http2` from client options.
    ///
    /// A zero timeout means no cap.
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self::default().merge_options(options)
    }

    /// Overrides fields that the options set, leaving the rest untouched.
    #[must_use]
    pub fn merge_options(mut self, options: &Options) -> Self {
        if let Some(timeout) = options.timeout {
            self.timeout = (!timeout.is_zero()).then_some(timeout);
        }
        if let Some(proxy) = &options.proxy {
            self.proxy = Some(proxy.clone());
        }
        if let Some(http2) = options.http2 {
            self.http2 = http2;
        }
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_http2(mut self, enabled: bool) -> Self {
        self.http2 = enabled;
        self
    }

    #[must_use]
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }
}

/// Everything a client was built with.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub options: Options,
    pub transport: TransportConfig,
}
