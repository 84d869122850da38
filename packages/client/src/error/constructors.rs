use std::path::Path;

use super::BoxError;
use super::types::{Error, Kind};

pub fn invalid_timeout_type() -> Error {
    Error::new(Kind::InvalidTimeoutType)
}

pub fn invalid_query_type() -> Error {
    Error::new(Kind::InvalidQueryType)
}

pub fn empty_base_uri() -> Error {
    Error::new(Kind::EmptyBaseUri)
}

pub fn invalid_base_uri_type() -> Error {
    Error::new(Kind::InvalidBaseUriType)
}

/// Creates an `Error` for a URI that failed to parse.
pub fn invalid_uri<E: Into<BoxError>>(uri: &str, e: E) -> Error {
    Error::new(Kind::InvalidUri).with(UriContext {
        uri: uri.to_owned(),
        source: e.into(),
    })
}

pub fn invalid_option<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidOption).with(e)
}

pub fn invalid_header<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidHeader).with(e)
}

pub fn file_open(path: &Path, e: std::io::Error) -> Error {
    Error::new(Kind::FileOpen).with(FileContext {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn file_read(path: &Path, e: std::io::Error) -> Error {
    Error::new(Kind::FileRead).with(FileContext {
        path: path.display().to_string(),
        source: e,
    })
}

pub fn multipart_close(e: std::io::Error) -> Error {
    Error::new(Kind::MultipartClose).with(e)
}

pub fn json(e: serde_json::Error) -> Error {
    Error::new(Kind::Json).with(e)
}

pub fn proxy<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Proxy).with(e)
}

pub fn connect<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Connect).with(e)
}

pub fn tls<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Tls).with(e)
}

pub fn timeout(url: url::Url) -> Error {
    Error::new(Kind::Timeout).with_url(url)
}

pub fn redirect<E: Into<BoxError>>(e: E, url: url::Url) -> Error {
    Error::new(Kind::Redirect).with(e).with_url(url)
}

/// Creates an `Error` for a request error.
pub fn request<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Request).with(e)
}

/// Creates an `Error` for a body error.
pub fn body<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Body).with(e)
}

/// Creates an `Error` for a decode error.
pub fn decode<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Decode).with(e)
}

#[derive(Debug, thiserror::Error)]
#[error("{uri:?}: {source}")]
struct UriContext {
    uri: String,
    #[source]
    source: BoxError,
}

#[derive(Debug, thiserror::Error)]
#[error("{path}: {source}")]
struct FileContext {
    path: String,
    #[source]
    source: std::io::Error,
}
