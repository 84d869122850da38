//! Request body methods.
//!
//! Only one body is sent: `json` wins over `form` and `form` over the
//! multipart parts added with `file` and `field`.

use std::path::PathBuf;

use courier_client::{FormBody, JsonBody, Multipart};
use serde::Serialize;

use crate::builder::core::RequestBuilder;

impl RequestBuilder {
    /// Serializes `body` as JSON. A serialization failure is reported when
    /// the call is sent.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        self.options = match JsonBody::from_serialize(body) {
            Ok(json) => self.options.json(json),
            Err(e) => self.options.defer_error(e),
        };
        self
    }

    /// Sends `body` verbatim as `application/json`.
    pub fn json_raw(mut self, body: impl Into<String>) -> Self {
        self.options = self.options.json(JsonBody::Raw(body.into()));
        self
    }

    /// Urlencodes `form` with `serde_urlencoded`.
    pub fn form<T: Serialize + ?Sized>(mut self, form: &T) -> Self {
        self.options = match FormBody::from_serialize(form) {
            Ok(form) => self.options.form_params(form),
            Err(e) => self.options.defer_error(e),
        };
        self
    }

    /// Sends an already urlencoded body.
    pub fn form_raw(mut self, body: impl Into<String>) -> Self {
        self.options = self.options.form_params(FormBody::Raw(body.into()));
        self
    }

    /// Adds a multipart file part read from `path` when the call is sent.
    pub fn file(mut self, field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        let multipart = self.options.multipart.take().unwrap_or_default();
        self.options = self.options.multipart(multipart.file(field, path));
        self
    }

    /// Adds a multipart text field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let multipart = self.options.multipart.take().unwrap_or_default();
        self.options = self.options.multipart(multipart.field(name, value));
        self
    }

    /// Replaces every multipart part.
    pub fn multipart(mut self, multipart: Multipart) -> Self {
        self.options = self.options.multipart(multipart);
        self
    }
}
