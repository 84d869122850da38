//! Header defaulting and per-call merging.

use base64::{Engine as _, engine::general_purpose};
use http::{HeaderMap, HeaderValue, header};

use crate::error::{self, Error};
use crate::options::{BasicAuth, Layered};

/// `courier/<version> rust (<os>; <arch>)`
#[must_use]
pub fn default_user_agent() -> String {
    format!(
        "courier/{} rust ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Client-level headers: the configured ones plus a default `User-Agent`
/// when none is present.
#[must_use]
pub fn default_headers(configured: Option<&HeaderMap>) -> HeaderMap {
    let mut headers = configured.cloned().unwrap_or_default();
    if !headers.contains_key(header::USER_AGENT) {
        match HeaderValue::from_str(&default_user_agent()) {
            Ok(value) => {
                headers.insert(header::USER_AGENT, value);
            }
            Err(e) => tracing::warn!("default user agent is not a valid header: {e}"),
        }
    }
    headers
}

/// Encodes `Authorization: Basic ...`.
///
/// # Errors
///
/// `InvalidHeader` when the credentials contain bytes that cannot appear in a
/// header value.
pub fn basic_auth_header(auth: &BasicAuth) -> Result<HeaderValue, Error> {
    let credentials = format!("{}:{}", auth.username, auth.password);
    let encoded = general_purpose::STANDARD.encode(credentials);
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(error::invalid_header)?;
    value.set_sensitive(true);
    Ok(value)
}

/// Headers for one call.
///
/// `client_headers` already carry the defaults. Call headers replace client
/// headers of the same name, then `Authorization` from the `auth` option and
/// the body's content type are applied. `strip_cookie` drops the client's
/// static `Cookie` header; a `Cookie` header passed with the call is kept.
///
/// # Errors
///
/// `InvalidHeader` when the basic-auth credentials cannot be encoded.
pub fn resolve_headers(
    client_headers: &HeaderMap,
    options: &Layered<'_>,
    content_type: Option<&HeaderValue>,
    strip_cookie: bool,
) -> Result<HeaderMap, Error> {
    let mut headers = client_headers.clone();
    if strip_cookie {
        headers.remove(header::COOKIE);
    }

    if let Some(call) = &options.call.headers {
        for name in call.keys() {
            headers.remove(name);
        }
        for (name, value) in call {
            headers.append(name.clone(), value.clone());
        }
    }

    if let Some(auth) = options.auth() {
        headers.insert(header::AUTHORIZATION, basic_auth_header(auth)?);
    }

    if let Some(content_type) = content_type {
        headers.insert(header::CONTENT_TYPE, content_type.clone());
    }

    Ok(headers)
}
