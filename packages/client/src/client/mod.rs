//! The HTTP client.

pub mod configuration;
pub mod core;
pub mod stats;

pub use configuration::ClientBuilder;
pub use core::Client;
pub use stats::{ClientStats, ClientStatsSnapshot};
