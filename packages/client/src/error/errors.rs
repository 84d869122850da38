//! Ordered error list returned by a failed call.

use std::fmt;
use std::ops::Deref;

use super::types::{Error, Kind};

/// Every error recorded while preparing and dispatching one call, in the
/// order they were encountered.
#[derive(Debug, Clone, Default)]
pub struct Errors(Vec<Error>);

impl Errors {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::with_capacity(2))
    }

    pub fn push(&mut self, error: Error) {
        tracing::debug!(kind = ?error.kind(), "recorded error: {error}");
        self.0.push(error);
    }

    pub fn extend(&mut self, other: Errors) {
        self.0.extend(other.0);
    }

    /// Records the error of a fallible step and yields its value, if any.
    pub fn record<T>(&mut self, result: Result<T, Error>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.push(error);
                None
            }
        }
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns true if any error has the given kind.
    #[must_use]
    pub fn contains(&self, kind: Kind) -> bool {
        self.0.iter().any(|e| e.kind() == kind)
    }

    /// Kinds in recording order, handy for assertions and logging.
    #[must_use]
    pub fn kinds(&self) -> Vec<Kind> {
        self.0.iter().map(Error::kind).collect()
    }

    /// `Ok(value)` when nothing was recorded, otherwise the list itself.
    pub fn into_result<T>(self, value: T) -> Result<T, Errors> {
        if self.0.is_empty() { Ok(value) } else { Err(self) }
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Error> {
        self.0
    }
}

impl Deref for Errors {
    type Target = [Error];

    fn deref(&self) -> &[Error] {
        &self.0
    }
}

impl From<Error> for Errors {
    fn from(error: Error) -> Self {
        Self(vec![error])
    }
}

impl FromIterator<Error> for Errors {
    fn from_iter<I: IntoIterator<Item = Error>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Errors {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Errors {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.first().map(|e| e as &(dyn std::error::Error + 'static))
    }
}
