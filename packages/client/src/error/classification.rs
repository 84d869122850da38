use std::error::Error as StdError;
use std::io;

use super::types::{Error, Kind};

impl Error {
    /// Returns true if the error was raised while turning options into a request.
    #[must_use]
    pub fn is_builder(&self) -> bool {
        matches!(
            self.inner.kind,
            Kind::InvalidTimeoutType
                | Kind::InvalidQueryType
                | Kind::EmptyBaseUri
                | Kind::InvalidBaseUriType
                | Kind::InvalidUri
                | Kind::InvalidOption
                | Kind::InvalidHeader
                | Kind::Json
        )
    }

    /// Returns true if the error came from assembling a multipart body.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        matches!(
            self.inner.kind,
            Kind::FileOpen | Kind::FileRead | Kind::MultipartClose
        )
    }

    /// Returns true if the error is from following redirects.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self.inner.kind, Kind::Redirect)
    }

    /// Returns true if the error is related to a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        if self.inner.kind == Kind::Timeout {
            return true;
        }

        let mut source = self.source();

        while let Some(err) = source {
            if let Some(hyper_err) = err.downcast_ref::<hyper::Error>() {
                if hyper_err.is_timeout() {
                    return true;
                }
            }
            if let Some(io) = err.downcast_ref::<io::Error>() {
                if io.kind() == io::ErrorKind::TimedOut {
                    return true;
                }
            }
            source = err.source();
        }

        false
    }

    /// Returns true if the error is related to connect
    #[must_use]
    pub fn is_connect(&self) -> bool {
        matches!(self.inner.kind, Kind::Connect | Kind::Tls | Kind::Proxy)
    }

    /// Returns true if the error is related to the request
    #[must_use]
    pub fn is_request(&self) -> bool {
        matches!(self.inner.kind, Kind::Request)
    }

    /// Returns true if the error is related to the response body
    #[must_use]
    pub fn is_body(&self) -> bool {
        matches!(self.inner.kind, Kind::Body)
    }

    /// Returns true if the error is related to decoding the response's body
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self.inner.kind, Kind::Decode)
    }
}
