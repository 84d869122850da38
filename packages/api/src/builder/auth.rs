//! Authentication helpers.

use http::header::AUTHORIZATION;

use crate::builder::core::RequestBuilder;

impl RequestBuilder {
    /// HTTP basic authentication, encoded when the call is sent.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.options = self.options.auth(username, password);
        self
    }

    /// `Authorization: Bearer <token>`
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header(AUTHORIZATION, format!("Bearer {token}"))
    }
}
