//! Terminal methods that send the call.

use courier_client::{Errors, Method, Response};

use crate::builder::core::RequestBuilder;

impl RequestBuilder {
    pub async fn get(self, uri: &str) -> Result<Response, Errors> {
        self.send(Method::GET, uri).await
    }

    pub async fn post(self, uri: &str) -> Result<Response, Errors> {
        self.send(Method::POST, uri).await
    }

    pub async fn head(self, uri: &str) -> Result<Response, Errors> {
        self.send(Method::HEAD, uri).await
    }

    pub async fn put(self, uri: &str) -> Result<Response, Errors> {
        self.send(Method::PUT, uri).await
    }

    pub async fn delete(self, uri: &str) -> Result<Response, Errors> {
        self.send(Method::DELETE, uri).await
    }

    /// Sends the call with any method.
    ///
    /// # Errors
    ///
    /// Every error of the call, also visible through `Client::errors`.
    pub async fn send(self, method: Method, uri: &str) -> Result<Response, Errors> {
        let Self {
            client,
            options,
            debug_enabled,
        } = self;

        if debug_enabled {
            match client.resolve(method.clone(), uri, &options) {
                Ok(resolved) => log::debug!(
                    "{} {} headers={:?} body_len={}",
                    resolved.method,
                    resolved.url,
                    resolved.headers,
                    resolved.body.len()
                ),
                Err(errors) => log::debug!("{method} {uri} will fail: {errors}"),
            }
        }

        let result = client.request(method, uri, options).await;

        if debug_enabled {
            match &result {
                Ok(response) => log::debug!(
                    "{} HTTP/{} from {} ({} bytes)",
                    response.status(),
                    response.protocol_version(),
                    response.url(),
                    response.bytes().len()
                ),
                Err(errors) => log::debug!("call failed: {errors}"),
            }
        }

        result
    }
}
