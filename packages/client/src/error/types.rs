use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use super::BoxError;

/// A Result alias where the Err case is `courier_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// A single failure recorded while preparing or dispatching a request.
#[derive(Clone)]
pub struct Error {
    pub(crate) inner: Box<Inner>,
}

#[derive(Clone)]
pub(crate) struct Inner {
    pub(crate) kind: Kind,
    pub(crate) source: Option<Arc<dyn StdError + Send + Sync>>,
    pub(crate) url: Option<url::Url>,
}

/// What went wrong, independent of the underlying cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `timeout` was neither an integer nor a fractional number of seconds
    InvalidTimeoutType,
    /// `query` was neither a string nor a key/value map
    InvalidQueryType,
    /// A relative URI was requested but no `base_uri` is configured
    EmptyBaseUri,
    /// `base_uri` was not a string
    InvalidBaseUriType,
    /// A URI or base URI could not be parsed
    InvalidUri,
    /// Any other option carried a value of the wrong shape
    InvalidOption,
    /// A header name or value was not valid HTTP
    InvalidHeader,
    /// A multipart file could not be opened
    FileOpen,
    /// A multipart file could not be read
    FileRead,
    /// The multipart writer could not be finished
    MultipartClose,
    /// A JSON body could not be serialized
    Json,
    /// The proxy URL is invalid or the proxy refused the tunnel
    Proxy,
    /// TCP connection establishment failed
    Connect,
    /// TLS configuration or handshake failed
    Tls,
    /// The per-client time limit expired
    Timeout,
    /// Too many redirects, or an unusable `Location`
    Redirect,
    /// Opaque transport failure while exchanging the request
    Request,
    /// Reading the response body failed
    Body,
    /// Decoding the response body failed
    Decode,
}

impl Kind {
    fn describe(self) -> &'static str {
        match self {
            Kind::InvalidTimeoutType => "invalid timeout type, require seconds as a number",
            Kind::InvalidQueryType => "invalid query type, require string or map",
            Kind::EmptyBaseUri => "empty base_uri set",
            Kind::InvalidBaseUriType => "invalid base_uri type, require string",
            Kind::InvalidUri => "invalid uri",
            Kind::InvalidOption => "invalid option value",
            Kind::InvalidHeader => "invalid header",
            Kind::FileOpen => "failed to open multipart file",
            Kind::FileRead => "failed to read multipart file",
            Kind::MultipartClose => "failed to close multipart body",
            Kind::Json => "failed to serialize json body",
            Kind::Proxy => "proxy error",
            Kind::Connect => "error connecting to host",
            Kind::Tls => "tls error",
            Kind::Timeout => "request timeout",
            Kind::Redirect => "error following redirect",
            Kind::Request => "error sending request",
            Kind::Body => "response body error",
            Kind::Decode => "error decoding response body",
        }
    }
}

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                source: None,
                url: None,
            }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<BoxError>>(mut self, source: E) -> Error {
        self.inner.source = Some(Arc::from(source.into()));
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: url::Url) -> Self {
        self.inner.url = Some(url);
        self
    }

    /// The category of this error.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.inner.kind
    }

    /// Get the URL associated with this error, if any
    #[must_use]
    pub fn url(&self) -> Option<&url::Url> {
        self.inner.url.as_ref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("courier_client::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        if let Some(ref url) = self.inner.url {
            f.field("url", url);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.inner.kind.describe())?;

        if let Some(ref url) = self.inner.url {
            write!(f, " for url ({url})")?;
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
