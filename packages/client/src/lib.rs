//! # courier_client
//!
//! Configuration-driven HTTP client. A [`Client`] holds default [`Options`];
//! every call passes its own `Options`, which override the defaults key by
//! key. Calls resolve the final URL, headers and body, send the request over
//! a pooled hyper connection and return either a fully read [`Response`] or
//! every [`Error`] encountered on the way.
//!
//! ```no_run
//! use courier_client::{Client, Options};
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), courier_client::Errors> {
//! let client = Client::new(Options::new().base_uri("https://api.example.com/"));
//! let response = client
//!     .post("v1/items", Options::new().json(json!({"name": "widget"})))
//!     .await?;
//! println!("{} {}", response.status(), response.text());
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Preparation steps (URL, body, headers) all run even when one fails, so a
//! call reports every problem at once. The request is only sent when
//! preparation recorded nothing. Errors of a call are returned in its
//! `Result` and also appended to [`Client::errors`], which is cleared before
//! each call unless `reset_error` is `false`.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod cookie;
pub mod error;
pub mod options;
pub mod prelude;
pub mod request;
pub mod response;
pub mod transport;

pub use crate::client::{Client, ClientBuilder, ClientStats, ClientStatsSnapshot};
pub use crate::config::{ClientConfig, TransportConfig};
pub use crate::cookie::Jar;
pub use crate::error::{Error, Errors, Kind, Result};
pub use crate::options::{BasicAuth, Cookies, FormBody, JsonBody, Multipart, Options, Query};
pub use crate::request::ResolvedRequest;
pub use crate::response::Response;

pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Version};
pub use url::Url;
