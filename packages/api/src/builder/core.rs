//! `RequestBuilder` state and options that are neither headers nor bodies.

use std::fmt;

use courier_client::{Client, Cookies, Options, Query};

/// Builds the options of one call against a client.
#[derive(Clone)]
#[must_use]
pub struct RequestBuilder {
    pub(crate) client: Client,
    pub(crate) options: Options,
    pub(crate) debug_enabled: bool,
}

impl RequestBuilder {
    /// Starts a call on `client`; the client is cloned, which is cheap and
    /// shares its state.
    pub fn new(client: &Client) -> Self {
        Self {
            client: client.clone(),
            options: Options::new(),
            debug_enabled: false,
        }
    }

    /// Starts from existing call options.
    pub fn with_options(client: &Client, options: Options) -> Self {
        Self {
            client: client.clone(),
            options,
            debug_enabled: false,
        }
    }

    /// Logs the resolved request and the response at debug level.
    pub fn debug(mut self) -> Self {
        self.debug_enabled = true;
        self
    }

    /// Appends this call's errors to the client's list instead of replacing it.
    pub fn keep_errors(mut self) -> Self {
        self.options = self.options.reset_error(false);
        self
    }

    /// Raw query string or structured query, replacing any earlier one.
    pub fn query(mut self, query: impl Into<Query>) -> Self {
        self.options = self.options.query(query);
        self
    }

    /// Adds `key=value` pairs to the query, keeping pairs added earlier.
    pub fn query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let added = pairs.into_iter().map(|(k, v)| (k.into(), v.into()));
        let merged = match self.options.query.take() {
            Some(Query::Pairs(mut existing)) => {
                existing.extend(added);
                existing
            }
            Some(other) => {
                log::warn!("query_pairs replaces a non-pair query: {other:?}");
                added.collect()
            }
            None => added.collect(),
        };
        self.options.query = Some(Query::Pairs(merged));
        self
    }

    /// `true` enables the client's jar for this call, `false` disables it.
    pub fn cookies(mut self, cookies: impl Into<Cookies>) -> Self {
        self.options = self.options.cookies(cookies);
        self
    }

    /// Enables the jar and seeds it with `cookies` for the target origin.
    pub fn cookie_list<I>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = cookie::Cookie<'static>>,
    {
        self.options = self.options.cookie_list(cookies);
        self
    }

    /// The options built so far.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn into_options(self) -> Options {
        self.options
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("options", &self.options)
            .field("debug_enabled", &self.debug_enabled)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_accumulate() {
        let client = Client::default();
        let builder = RequestBuilder::new(&client)
            .query_pairs([("a", "1")])
            .query_pairs(vec![("b".to_owned(), "2".to_owned())]);

        assert_eq!(
            builder.options().query,
            Some(Query::Pairs(vec![
                ("a".into(), "1".into()),
                ("b".into(), "2".into())
            ]))
        );
    }

    #[test]
    fn keep_errors_disables_reset() {
        let client = Client::default();
        let options = RequestBuilder::new(&client).keep_errors().into_options();
        assert_eq!(options.reset_error, Some(false));
    }
}
