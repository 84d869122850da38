//! A fully read HTTP response.

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, StatusCode, Version};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{self, Error};

/// Status, headers and body of the last hop of a call.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    url: Url,
    body: Bytes,
}

impl Response {
    pub(crate) fn new(
        status: StatusCode,
        version: Version,
        headers: HeaderMap,
        url: Url,
        body: Bytes,
    ) -> Self {
        Self {
            status,
            version,
            headers,
            url,
            body,
        }
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// `"1.0"`, `"1.1"` or `"2.0"`.
    pub fn protocol_version(&self) -> &'static str {
        match self.version {
            Version::HTTP_10 => "1.0",
            Version::HTTP_2 => "2.0",
            _ => "1.1",
        }
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// Every value of `name` that is valid UTF-8, in received order.
    pub fn header(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// The URL of the final hop, after redirects.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    pub fn into_bytes(self) -> Bytes {
        self.body
    }

    /// The body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// `Kind::Decode` when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_slice(&self.body).map_err(|e| error::decode(e).with_url(self.url.clone()))
    }

    /// The `Content-Length` the server announced, absent once the body was
    /// decompressed.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;

    use super::*;
    use crate::error::Kind;

    fn response(body: &'static [u8]) -> Response {
        let mut headers = HeaderMap::new();
        headers.append("x-multi", HeaderValue::from_static("a"));
        headers.append("x-multi", HeaderValue::from_static("b"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("7"));
        Response::new(
            StatusCode::OK,
            Version::HTTP_11,
            headers,
            Url::parse("http://host/final").expect("url"),
            Bytes::from_static(body),
        )
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let response = response(b"{}");
        assert!(response.has_header("X-Multi"));
        assert_eq!(response.header("X-MULTI"), vec!["a", "b"]);
        assert!(response.header("missing").is_empty());
        assert_eq!(response.content_length(), Some(7));
        assert_eq!(response.protocol_version(), "1.1");
    }

    #[test]
    fn json_failure_is_decode_error() {
        let response = response(b"not json");
        let err = response
            .json::<serde_json::Value>()
            .expect_err("invalid json");
        assert_eq!(err.kind(), Kind::Decode);
        assert_eq!(response.text(), "not json");
    }
}
