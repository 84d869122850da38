//! Redirect decisions.

use http::header::{
    AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, LOCATION, PROXY_AUTHORIZATION,
    WWW_AUTHENTICATE,
};
use http::{HeaderMap, Method, StatusCode};
use url::Url;

use crate::error::{self, Error};

#[derive(Debug, thiserror::Error)]
pub(crate) enum RedirectError {
    #[error("too many redirects (limit {0})")]
    TooMany(usize),
    #[error("invalid location header")]
    InvalidLocation,
    #[error("unsupported redirect scheme `{0}`")]
    Scheme(String),
}

/// How the next hop is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Follow {
    pub(crate) method: Method,
    pub(crate) keep_body: bool,
}

/// The follow-up request for a redirect status, if it is one.
pub(crate) fn follow(status: StatusCode, method: &Method) -> Option<Follow> {
    match status {
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER => {
            let method = if *method == Method::HEAD {
                Method::HEAD
            } else {
                Method::GET
            };
            Some(Follow {
                method,
                keep_body: false,
            })
        }
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT => Some(Follow {
            method: method.clone(),
            keep_body: true,
        }),
        _ => None,
    }
}

/// Resolves the `Location` header against the current URL.
///
/// `Ok(None)` when the response carries no `Location`; it is then returned
/// to the caller as is.
pub(crate) fn location(headers: &HeaderMap, current: &Url) -> Result<Option<Url>, Error> {
    let Some(value) = headers.get(LOCATION) else {
        return Ok(None);
    };
    let invalid = || error::redirect(RedirectError::InvalidLocation, current.clone());

    let value = value.to_str().map_err(|_| invalid())?;
    let next = current.join(value).map_err(|_| invalid())?;
    match next.scheme() {
        "http" | "https" => Ok(Some(next)),
        other => Err(error::redirect(
            RedirectError::Scheme(other.to_owned()),
            current.clone(),
        )),
    }
}

pub(crate) fn too_many(limit: usize, url: &Url) -> Error {
    error::redirect(RedirectError::TooMany(limit), url.clone())
}

/// Drops credentials when the next hop targets another host or port.
pub(crate) fn remove_sensitive_headers(headers: &mut HeaderMap, next: &Url, previous: &Url) {
    let cross_host = next.host_str() != previous.host_str()
        || next.port_or_known_default() != previous.port_or_known_default();
    if cross_host {
        headers.remove(AUTHORIZATION);
        headers.remove(COOKIE);
        headers.remove(PROXY_AUTHORIZATION);
        headers.remove(WWW_AUTHENTICATE);
    }
}

/// Drops headers describing a body that is no longer sent.
pub(crate) fn remove_body_headers(headers: &mut HeaderMap) {
    headers.remove(CONTENT_TYPE);
    headers.remove(CONTENT_LENGTH);
}
