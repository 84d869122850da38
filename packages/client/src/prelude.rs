//! The types most calls need.

pub use crate::client::{Client, ClientBuilder};
pub use crate::error::{Error, Errors, Kind};
pub use crate::options::{Cookies, Multipart, Options};
pub use crate::response::Response;

pub use ::http::{HeaderMap, Method, StatusCode};
pub use url::Url;
