pub mod classification;
pub mod constructors;
pub mod errors;
pub mod types;

pub use constructors::*;
pub use errors::Errors;
pub use types::{Error, Kind, Result};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;
