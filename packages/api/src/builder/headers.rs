//! Header methods.

use http::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};

use crate::builder::core::RequestBuilder;

/// Header name constants, including the common extension headers.
pub mod header {
    pub use http::header::*;

    /// `X-API-Key`, used by many token-authenticated APIs
    pub const X_API_KEY: &str = "x-api-key";
}

impl RequestBuilder {
    /// Adds a header. Invalid names or values are reported as
    /// `Kind::InvalidHeader` when the call is sent.
    ///
    /// A call header replaces the client's headers of the same name.
    ///
    /// ```no_run
    /// # async fn run(client: &courier::Client) {
    /// let response = courier::with_client(client)
    ///     .header("x-request-id", "42")
    ///     .get("https://api.example.com/data")
    ///     .await;
    /// # }
    /// ```
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        self.options = self.options.header(key, value);
        self
    }

    /// Adds every `(name, value)` pair, keeping repeated names.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<http::Error>,
    {
        for (key, value) in headers {
            self.options = self.options.header(key, value);
        }
        self
    }

    /// Merges a prepared header map.
    pub fn header_map(mut self, headers: HeaderMap) -> Self {
        self.options = self.options.headers(headers);
        self
    }

    /// Replaces the default `User-Agent` for this call.
    pub fn user_agent(self, agent: &str) -> Self {
        self.header(USER_AGENT, agent)
    }

    pub fn api_key(self, key: &str) -> Self {
        self.header(header::X_API_KEY, key)
    }
}
