//! Turning options into a request ready for dispatch.
//!
//! Resolution runs every step (URL, body, headers) even after one of them
//! fails, so a single call reports all of its problems at once. A request is
//! only produced when nothing was recorded.

use bytes::Bytes;
use http::{HeaderMap, Method};
use url::Url;

pub mod body;
pub mod headers;
pub mod multipart;
pub mod uri;

pub use body::{Body, EncodedBody};
pub use headers::{default_headers, default_user_agent};
pub use multipart::MultipartWriter;
pub use uri::{RebuiltUri, rebuild_uri};

use crate::error::Errors;
use crate::options::Layered;

/// Method, absolute URL, headers and body, ready for the transport.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// Origin the URL was resolved against; cookies are bound to it.
    pub origin: Url,
}

/// Inputs that come from the client rather than from the options.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Client headers with defaults applied.
    pub client_headers: &'a HeaderMap,
    /// Set once cookies were closed on the client.
    pub strip_cookie: bool,
}

/// Resolves one call, recording every failure into `errors`.
///
/// Returns `None` when anything was recorded, including errors carried over
/// from option builders.
pub fn resolve(
    method: Method,
    uri: &str,
    options: &Layered<'_>,
    context: ResolveContext<'_>,
    errors: &mut Errors,
) -> Option<ResolvedRequest> {
    let before = errors.len();

    for deferred in options.deferred() {
        errors.push(deferred.clone());
    }

    let rebuilt = errors.record(rebuild_uri(uri, options));

    let encoded = match Body::resolve(options).encode() {
        Ok(encoded) => Some(encoded),
        Err(body_errors) => {
            errors.extend(body_errors);
            None
        }
    };

    let content_type = encoded.as_ref().and_then(|e| e.content_type.as_ref());
    let headers = errors.record(headers::resolve_headers(
        context.client_headers,
        options,
        content_type,
        context.strip_cookie,
    ));

    if errors.len() > before {
        return None;
    }

    let (rebuilt, encoded, headers) = (rebuilt?, encoded?, headers?);
    tracing::debug!(
        %method,
        url = %rebuilt.url,
        body_len = encoded.bytes.len(),
        "resolved request"
    );

    Some(ResolvedRequest {
        method,
        url: rebuilt.url,
        headers,
        body: encoded.bytes,
        origin: rebuilt.origin,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Kind;
    use crate::options::{Multipart, Options};

    fn resolve_with(
        method: Method,
        uri: &str,
        call: &Options,
        client: &Options,
        errors: &mut Errors,
    ) -> Option<ResolvedRequest> {
        let client_headers = default_headers(client.headers.as_ref());
        let context = ResolveContext {
            client_headers: &client_headers,
            strip_cookie: false,
        };
        resolve(method, uri, &Layered::new(call, client), context, errors)
    }

    #[test]
    fn resolves_json_post_against_base_uri() {
        let client = Options::new().base_uri("http://host/");
        let call = Options::new().json(json!({"key": "value"}));
        let mut errors = Errors::new();

        let request = resolve_with(Method::POST, "/items", &call, &client, &mut errors)
            .expect("resolved");

        assert!(errors.is_empty());
        assert_eq!(request.url.as_str(), "http://host/items");
        assert_eq!(request.headers["content-type"], "application/json");
        assert!(request.headers.contains_key("user-agent"));
        assert_eq!(&request.body[..], br#"{"key":"value"}"#);
    }

    #[test]
    fn every_failing_step_is_reported() {
        let client = Options::new();
        let call = Options::new()
            .header("bad header", "x")
            .multipart(Multipart::new().file("f", "/no/such/file"));
        let mut errors = Errors::new();

        let request = resolve_with(Method::POST, "relative", &call, &client, &mut errors);

        assert!(request.is_none());
        assert_eq!(
            errors.kinds(),
            vec![Kind::InvalidHeader, Kind::EmptyBaseUri, Kind::FileOpen]
        );
    }

    #[test]
    fn earlier_errors_do_not_block_a_clean_call() {
        let none = Options::new();
        let mut errors = Errors::new();
        errors.push(crate::error::empty_base_uri());

        let request = resolve_with(Method::GET, "http://host/", &none, &none, &mut errors);
        assert!(request.is_some());
        assert_eq!(errors.len(), 1);
    }
}
