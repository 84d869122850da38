//! # courier
//!
//! Configuration-driven HTTP client.
//!
//! Calls take an [`Options`] bag that overrides the client's defaults key by
//! key. Relative URIs are resolved against the client's `base_uri`, bodies
//! are encoded from `json`, `form_params` or `multipart`, cookies persist in
//! a per-client jar, and every error of a call is returned together.
//!
//! ```no_run
//! use courier::{Client, Options};
//!
//! # async fn run() -> Result<(), courier::Errors> {
//! let client = Client::new(Options::new().base_uri("https://api.example.com/"));
//!
//! let response = courier::with_client(&client)
//!     .bearer_auth("token")
//!     .query_pairs([("page", "2")])
//!     .get("v1/items")
//!     .await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

use std::sync::OnceLock;

pub mod builder;

pub use builder::RequestBuilder;
pub use builder::headers::header;
pub use courier_client::{
    BasicAuth, Client, ClientBuilder, Cookies, Error, Errors, FormBody, HeaderMap, HeaderValue,
    JsonBody, Kind, Method, Multipart, Options, Query, Response, StatusCode, Url,
};

static GLOBAL_CLIENT: OnceLock<Client> = OnceLock::new();

/// The process-wide client, created with default options on first use
/// unless [`init_global_client`] ran before.
pub fn global_client() -> &'static Client {
    GLOBAL_CLIENT.get_or_init(Client::default)
}

/// Configures the process-wide client.
///
/// Returns `false`, leaving the existing client in place, when the global
/// client was already created.
pub fn init_global_client(options: Options) -> bool {
    let mut installed = false;
    GLOBAL_CLIENT.get_or_init(|| {
        installed = true;
        Client::new(options)
    });
    if !installed {
        log::warn!("global client already initialised, options ignored");
    }
    installed
}

/// A request builder on the global client.
pub fn request() -> RequestBuilder {
    RequestBuilder::new(global_client())
}

/// A request builder on `client`.
pub fn with_client(client: &Client) -> RequestBuilder {
    RequestBuilder::new(client)
}

/// `GET` on the global client.
///
/// # Errors
///
/// Every error of the call.
pub async fn get(uri: &str, options: Options) -> Result<Response, Errors> {
    global_client().get(uri, options).await
}

/// `POST` on the global client.
///
/// # Errors
///
/// Every error of the call.
pub async fn post(uri: &str, options: Options) -> Result<Response, Errors> {
    global_client().post(uri, options).await
}

/// `HEAD` on the global client.
///
/// # Errors
///
/// Every error of the call.
pub async fn head(uri: &str, options: Options) -> Result<Response, Errors> {
    global_client().head(uri, options).await
}

/// Errors recorded on the global client.
pub fn errors() -> Errors {
    global_client().errors()
}
