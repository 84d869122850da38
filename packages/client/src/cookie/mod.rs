//! Cookie persistence between calls.
//!
//! A client owns at most one [`Jar`]. It is created the first time cookies are
//! enabled and survives being detached, so re-enabling cookies picks up the
//! cookies collected earlier.

pub mod jar;

pub use jar::{CookieStore, Jar};
