//! Conversion from a loosely typed JSON option bag.
//!
//! Lets options come from configuration files or other dynamic sources using
//! the same key names as [`Options`]. Every mistyped key is reported; a single
//! bad value does not hide the others.

use std::path::PathBuf;
use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};

use super::{BasicAuth, Cookies, FormBody, JsonBody, Multipart, Options, Query};
use crate::error::{self, Error, Errors};

/// Detail attached to `Kind::InvalidOption` errors.
#[derive(Debug, thiserror::Error)]
#[error("option `{key}` requires {expected}")]
pub struct OptionTypeError {
    pub key: String,
    pub expected: &'static str,
}

fn mistyped(key: &str, expected: &'static str) -> Error {
    error::invalid_option(OptionTypeError {
        key: key.to_owned(),
        expected,
    })
}

impl Options {
    /// Builds options from a JSON object keyed by option name.
    ///
    /// # Errors
    ///
    /// Returns every conversion failure: `InvalidTimeoutType`,
    /// `InvalidQueryType` and `InvalidBaseUriType` for those keys, and
    /// `InvalidOption` or `InvalidHeader` for the rest.
    pub fn from_value(value: Value) -> Result<Options, Errors> {
        let Value::Object(map) = value else {
            return Err(mistyped("options", "an object").into());
        };

        let mut options = Options::new();
        let mut errors = Errors::new();

        for (key, value) in map {
            let applied = match key.as_str() {
                "base_uri" => match value {
                    Value::String(s) => {
                        options.base_uri = Some(s);
                        Ok(())
                    }
                    _ => Err(error::invalid_base_uri_type()),
                },
                "headers" => headers_from(value).map(|h| options.headers = Some(h)),
                "cookies" => cookies_from(value).map(|c| options.cookies = Some(c)),
                "auth" => auth_from(value).map(|a| options.auth = Some(a)),
                "query" => query_from(value).map(|q| options.query = Some(q)),
                "timeout" => timeout_from(&value).map(|t| options.timeout = Some(t)),
                "proxy" => match value {
                    Value::String(s) => {
                        options.proxy = Some(s);
                        Ok(())
                    }
                    _ => Err(mistyped("proxy", "a url string")),
                },
                "json" => {
                    options.json = Some(JsonBody::from(value));
                    Ok(())
                }
                "form_params" => form_from(value).map(|f| options.form_params = Some(f)),
                "multipart" => multipart_from(value).map(|m| options.multipart = Some(m)),
                "http2" => bool_from(&value, "http2").map(|b| options.http2 = Some(b)),
                "reset_error" => {
                    bool_from(&value, "reset_error").map(|b| options.reset_error = Some(b))
                }
                other => {
                    tracing::warn!(key = other, "ignoring unknown option");
                    Ok(())
                }
            };
            errors.record(applied);
        }

        errors.into_result(options)
    }
}

fn query_from(value: Value) -> Result<Query, Error> {
    match value {
        Value::String(s) => Ok(Query::Raw(s)),
        Value::Object(m) => Ok(Query::Map(m)),
        _ => Err(error::invalid_query_type()),
    }
}

fn form_from(value: Value) -> Result<FormBody, Error> {
    match value {
        Value::String(s) => Ok(FormBody::Raw(s)),
        Value::Object(m) => Ok(FormBody::Map(m)),
        _ => Err(mistyped("form_params", "a string or an object")),
    }
}

fn bool_from(value: &Value, key: &'static str) -> Result<bool, Error> {
    value.as_bool().ok_or_else(|| mistyped(key, "a boolean"))
}

fn timeout_from(value: &Value) -> Result<Duration, Error> {
    let secs = value.as_f64().ok_or_else(error::invalid_timeout_type)?;
    Duration::try_from_secs_f64(secs).map_err(|_| error::invalid_timeout_type())
}

fn headers_from(value: Value) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    match value {
        Value::Object(map) => append_header_object(&mut headers, map)?,
        Value::Array(items) => {
            for item in items {
                let Value::Object(map) = item else {
                    return Err(mistyped("headers", "objects of header values"));
                };
                append_header_object(&mut headers, map)?;
            }
        }
        _ => return Err(mistyped("headers", "an object or an array of objects")),
    }
    Ok(headers)
}

fn append_header_object(headers: &mut HeaderMap, map: Map<String, Value>) -> Result<(), Error> {
    for (name, value) in map {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(error::invalid_header)?;
        let values = match value {
            Value::String(s) => vec![s],
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(mistyped("headers", "string header values")),
                })
                .collect::<Result<_, _>>()?,
            _ => return Err(mistyped("headers", "string header values")),
        };
        for value in values {
            let value = HeaderValue::from_str(&value).map_err(error::invalid_header)?;
            headers.append(name.clone(), value);
        }
    }
    Ok(())
}

fn cookies_from(value: Value) -> Result<Cookies, Error> {
    match value {
        Value::Bool(b) => Ok(Cookies::from(b)),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => cookie::Cookie::parse(s).map_err(error::invalid_option),
                _ => Err(mistyped("cookies", "cookie strings")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Cookies::Preset),
        _ => Err(mistyped("cookies", "a boolean or a list of cookies")),
    }
}

fn auth_from(value: Value) -> Result<BasicAuth, Error> {
    match value {
        Value::Array(items) => match <[Value; 2]>::try_from(items) {
            Ok([Value::String(username), Value::String(password)]) => {
                Ok(BasicAuth { username, password })
            }
            _ => Err(mistyped("auth", "[username, password]")),
        },
        _ => Err(mistyped("auth", "[username, password]")),
    }
}

fn multipart_from(value: Value) -> Result<Multipart, Error> {
    let Value::Object(mut map) = value else {
        return Err(mistyped("multipart", "an object"));
    };
    let mut multipart = Multipart::new();
    if let Some(files) = map.remove("files") {
        for (field, path) in string_map(files, "multipart.files")? {
            multipart.files.push((field, PathBuf::from(path)));
        }
    }
    if let Some(fields) = map.remove("form_params") {
        multipart.form_params = string_map(fields, "multipart.form_params")?;
    }
    Ok(multipart)
}

fn string_map(value: Value, key: &'static str) -> Result<Vec<(String, String)>, Error> {
    let Value::Object(map) = value else {
        return Err(mistyped(key, "an object of strings"));
    };
    map.into_iter()
        .map(|(k, v)| match v {
            Value::String(s) => Ok((k, s)),
            _ => Err(mistyped(key, "an object of strings")),
        })
        .collect()
}
