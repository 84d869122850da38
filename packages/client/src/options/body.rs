//! Body-producing options: `json`, `form_params` and `multipart`.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::{Map, Value};

use super::query::{build_query, encode_pairs};
use crate::error::{self, Error};

/// The `json` option.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonBody {
    /// Sent verbatim.
    Raw(String),
    /// Serialized with `serde_json`.
    Value(Value),
}

impl JsonBody {
    /// Captures any serializable value.
    ///
    /// # Errors
    ///
    /// Returns a `Kind::Json` error when `value` cannot be represented as JSON.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        serde_json::to_value(value)
            .map(JsonBody::Value)
            .map_err(error::json)
    }

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        match self {
            JsonBody::Raw(raw) => Ok(raw.clone().into_bytes()),
            JsonBody::Value(value) => serde_json::to_vec(value).map_err(error::json),
        }
    }
}

impl From<Value> for JsonBody {
    fn from(value: Value) -> Self {
        match value {
            Value::String(raw) => JsonBody::Raw(raw),
            other => JsonBody::Value(other),
        }
    }
}

impl From<&str> for JsonBody {
    fn from(raw: &str) -> Self {
        JsonBody::Raw(raw.to_owned())
    }
}

impl From<String> for JsonBody {
    fn from(raw: String) -> Self {
        JsonBody::Raw(raw)
    }
}

/// The `form_params` option.
#[derive(Debug, Clone, PartialEq)]
pub enum FormBody {
    /// Already urlencoded, sent verbatim.
    Raw(String),
    /// Encoded in order.
    Pairs(Vec<(String, String)>),
    /// Flattened with bracket notation, like a structured query.
    Map(Map<String, Value>),
}

impl FormBody {
    /// Encodes any `Serialize` type the way `serde_urlencoded` does.
    ///
    /// # Errors
    ///
    /// Returns a `Kind::InvalidOption` error for values that have no flat
    /// urlencoded representation.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        serde_urlencoded::to_string(value)
            .map(FormBody::Raw)
            .map_err(error::invalid_option)
    }

    pub(crate) fn encode(&self) -> String {
        match self {
            FormBody::Raw(raw) => raw.clone(),
            FormBody::Pairs(pairs) => encode_pairs(pairs),
            FormBody::Map(map) => build_query(map),
        }
    }
}

impl<K: Into<String>, V: Into<String>> From<Vec<(K, V)>> for FormBody {
    fn from(pairs: Vec<(K, V)>) -> Self {
        FormBody::Pairs(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&str> for FormBody {
    fn from(raw: &str) -> Self {
        FormBody::Raw(raw.to_owned())
    }
}

impl From<String> for FormBody {
    fn from(raw: String) -> Self {
        FormBody::Raw(raw)
    }
}

impl From<Map<String, Value>> for FormBody {
    fn from(map: Map<String, Value>) -> Self {
        FormBody::Map(map)
    }
}

/// The `multipart` option: file fields read from disk plus plain fields.
///
/// Parts are written in insertion order, files first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multipart {
    pub files: Vec<(String, PathBuf)>,
    pub form_params: Vec<(String, String)>,
}

impl Multipart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file part; the part's filename is the path's base name.
    #[must_use]
    pub fn file(mut self, field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.push((field.into(), path.into()));
        self
    }

    /// Adds a plain text field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form_params.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.form_params.is_empty()
    }
}
