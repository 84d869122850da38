//! Final URL resolution against `base_uri` with query merging.

use url::Url;

use crate::error::{self, Error};
use crate::options::{Layered, Query};

/// A resolved request URL together with the origin it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuiltUri {
    pub url: Url,
    /// Scheme, host and port of the target; cookies are bound to it.
    pub origin: Url,
}

#[derive(Debug, thiserror::Error)]
#[error("base uri has no host")]
struct MissingHost;

/// Turns the caller's URI into an absolute URL.
///
/// Absolute `http://`/`https://` URIs are used as given. Anything else is
/// joined to the host of `base_uri`, discarding the base's path. The `query`
/// option is appended after `?`, or after `&` when the URI already has a
/// query.
///
/// # Errors
///
/// `EmptyBaseUri` for a relative URI without `base_uri`; `InvalidUri` when
/// the URI or the base fails to parse.
pub fn rebuild_uri(uri: &str, options: &Layered<'_>) -> Result<RebuiltUri, Error> {
    let query = options.query().map(Query::encode).unwrap_or_default();

    if uri.starts_with("http://") || uri.starts_with("https://") {
        let parsed = parse(uri)?;
        let origin = origin_of(&parsed);
        let url = if query.is_empty() {
            parsed
        } else {
            parse(&append_query(uri, &query))?
        };
        return Ok(RebuiltUri { url, origin });
    }

    let relative = append_query(uri, &query);
    let base = options.base_uri().ok_or_else(error::empty_base_uri)?;
    let base = parse(base)?;
    let host = base
        .host_str()
        .ok_or_else(|| error::invalid_uri(base.as_str(), MissingHost))?;
    let authority = match base.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    };
    let full = format!(
        "{}://{}/{}",
        base.scheme(),
        authority,
        relative.trim_start_matches('/')
    );

    Ok(RebuiltUri {
        url: parse(&full)?,
        origin: origin_of(&base),
    })
}

fn parse(uri: &str) -> Result<Url, Error> {
    Url::parse(uri).map_err(|e| error::invalid_uri(uri, e))
}

/// Appends `query` ahead of any fragment.
fn append_query(uri: &str, query: &str) -> String {
    if query.is_empty() {
        return uri.to_owned();
    }
    let (head, fragment) = match uri.find('#') {
        Some(at) => uri.split_at(at),
        None => (uri, ""),
    };
    let separator = if head.contains('?') { '&' } else { '?' };
    format!("{head}{separator}{query}{fragment}")
}

/// Scheme, host and port of `url`, with an empty path.
pub(crate) fn origin_of(url: &Url) -> Url {
    let mut origin = url.clone();
    origin.set_path("/");
    origin.set_query(None);
    origin.set_fragment(None);
    // Only fails for cannot-be-a-base URLs, which have no credentials anyway.
    let _ = origin.set_username("");
    let _ = origin.set_password(None);
    origin
}
