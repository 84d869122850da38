//! Request body selection and encoding.

use bytes::Bytes;
use http::HeaderValue;

use super::multipart::encode_multipart;
use crate::error::Errors;
use crate::options::{FormBody, JsonBody, Layered, Multipart, Options};

const APPLICATION_JSON: &str = "application/json";
const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// The body chosen for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Body<'a> {
    Json(&'a JsonBody),
    Form(&'a FormBody),
    Multipart(&'a Multipart),
    Empty,
}

impl<'a> Body<'a> {
    /// Picks the body for a call: call options before client options, and
    /// within each `json`, then `form_params`, then `multipart`.
    #[must_use]
    pub fn resolve(options: &Layered<'a>) -> Self {
        Self::from_tier(options.call)
            .or_else(|| Self::from_tier(options.client))
            .unwrap_or(Body::Empty)
    }

    fn from_tier(options: &'a Options) -> Option<Self> {
        if let Some(json) = &options.json {
            return Some(Body::Json(json));
        }
        if let Some(form) = &options.form_params {
            return Some(Body::Form(form));
        }
        options.multipart.as_ref().map(Body::Multipart)
    }

    /// Whether encoding reads multipart files from disk.
    #[must_use]
    pub fn reads_files(&self) -> bool {
        matches!(self, Body::Multipart(multipart) if !multipart.files.is_empty())
    }

    /// Produces the bytes and content type for this body.
    ///
    /// # Errors
    ///
    /// Every failure encountered, including per-file multipart errors.
    pub fn encode(&self) -> Result<EncodedBody, Errors> {
        let mut errors = Errors::new();
        let encoded = match self {
            Body::Json(json) => errors
                .record(json.to_bytes())
                .map(|bytes| EncodedBody::new(bytes, APPLICATION_JSON)),
            Body::Form(form) => Some(EncodedBody::new(form.encode(), FORM_URLENCODED)),
            Body::Multipart(multipart) => encode_multipart(multipart, &mut errors)
                .map(|body| EncodedBody::new(body.bytes, &body.content_type)),
            Body::Empty => Some(EncodedBody::empty()),
        };
        // a missing body always comes with a recorded error
        match encoded {
            Some(encoded) if errors.is_empty() => Ok(encoded),
            _ => Err(errors),
        }
    }
}

/// Encoded body bytes and the content type they require, if any.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedBody {
    pub bytes: Bytes,
    pub content_type: Option<HeaderValue>,
}

impl EncodedBody {
    fn new(bytes: impl Into<Bytes>, content_type: &str) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: HeaderValue::from_str(content_type).ok(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::Kind;

    #[test]
    fn json_value_is_serialized() {
        let none = Options::new();
        let call = Options::new().json(json!({"key": "value"}));
        let encoded = Body::resolve(&Layered::new(&call, &none))
            .encode()
            .expect("json");
        let round: serde_json::Value = serde_json::from_slice(&encoded.bytes).expect("valid json");
        assert_eq!(round, json!({"key": "value"}));
        assert_eq!(
            encoded.content_type,
            Some(HeaderValue::from_static("application/json"))
        );
    }

    #[test]
    fn raw_json_is_verbatim() {
        let none = Options::new();
        let call = Options::new().json("{not validated}");
        let encoded = Body::resolve(&Layered::new(&call, &none))
            .encode()
            .expect("raw");
        assert_eq!(&encoded.bytes[..], b"{not validated}");
    }

    #[test]
    fn call_tier_beats_client_tier() {
        let client = Options::new().json(json!({"from": "client"}));
        let call = Options::new().form_params(vec![("from", "call")]);
        let body = Body::resolve(&Layered::new(&call, &client));
        assert!(matches!(body, Body::Form(_)));

        let encoded = body.encode().expect("form");
        assert_eq!(&encoded.bytes[..], b"from=call");
        assert_eq!(
            encoded.content_type,
            Some(HeaderValue::from_static(FORM_URLENCODED))
        );
    }

    #[test]
    fn json_beats_form_within_a_tier() {
        let client = Options::new()
            .form_params(FormBody::Raw("a=1".into()))
            .json(json!([1, 2]));
        let none = Options::new();
        assert!(matches!(
            Body::resolve(&Layered::new(&none, &client)),
            Body::Json(_)
        ));
    }

    #[test]
    fn no_body_options_mean_empty_body() {
        let none = Options::new();
        let encoded = Body::resolve(&Layered::new(&none, &none))
            .encode()
            .expect("empty");
        assert!(encoded.bytes.is_empty());
        assert_eq!(encoded.content_type, None);
    }

    #[test]
    fn fields_only_multipart_gets_boundary_content_type() {
        let none = Options::new();
        let call = Options::new().multipart(Multipart::new().field("k", "v"));
        let encoded = Body::resolve(&Layered::new(&call, &none))
            .encode()
            .expect("multipart");
        let content_type = encoded
            .content_type
            .as_ref()
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
    }

    #[test]
    fn missing_multipart_file_fails_encoding() {
        let none = Options::new();
        let call = Options::new().multipart(Multipart::new().file("f", "/no/such/file"));
        let errors = Body::resolve(&Layered::new(&call, &none))
            .encode()
            .expect_err("missing file");
        assert_eq!(errors.kinds(), vec![Kind::FileOpen]);
    }
}
