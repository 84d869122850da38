//! Fluent request building on top of a [`Client`](courier_client::Client).
//!
//! Each method adds to the call-tier [`Options`](courier_client::Options);
//! the terminal methods in [`methods`] send the call.

pub mod auth;
pub mod body;
pub mod core;
pub mod headers;
pub mod methods;

pub use core::RequestBuilder;
