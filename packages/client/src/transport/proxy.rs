//! HTTP proxy settings and `CONNECT` tunnelling.

use base64::{Engine as _, engine::general_purpose};
use http::HeaderValue;
use percent_encoding::percent_decode_str;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use url::Url;

use crate::error::{self, Error};

const MAX_CONNECT_RESPONSE: usize = 8 * 1024;

#[derive(Debug, thiserror::Error)]
pub(crate) enum ProxyError {
    #[error("unsupported proxy scheme `{0}`, only http is supported")]
    Scheme(String),
    #[error("proxy url has no host")]
    MissingHost,
    #[error("proxy refused tunnel: {0}")]
    Refused(String),
    #[error("proxy closed the connection during CONNECT")]
    UnexpectedEof,
    #[error("proxy CONNECT response exceeds {MAX_CONNECT_RESPONSE} bytes")]
    ResponseTooLarge,
}

/// A parsed `http://[user:pass@]host:port` proxy.
#[derive(Debug, Clone)]
pub(crate) struct Proxy {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) authorization: Option<HeaderValue>,
}

impl Proxy {
    pub(crate) fn parse(proxy: &str) -> Result<Self, Error> {
        let url = Url::parse(proxy).map_err(error::proxy)?;
        if url.scheme() != "http" {
            return Err(error::proxy(ProxyError::Scheme(url.scheme().to_owned())));
        }
        let host = url
            .host_str()
            .ok_or_else(|| error::proxy(ProxyError::MissingHost))?
            .to_owned();
        let port = url.port_or_known_default().unwrap_or(80);

        let authorization = if url.username().is_empty() {
            None
        } else {
            // userinfo comes back percent-encoded from `Url`
            let username = decode_userinfo(url.username())?;
            let password = decode_userinfo(url.password().unwrap_or(""))?;
            let credentials = format!("{username}:{password}");
            let encoded = general_purpose::STANDARD.encode(credentials);
            let mut value =
                HeaderValue::from_str(&format!("Basic {encoded}")).map_err(error::proxy)?;
            value.set_sensitive(true);
            Some(value)
        };

        Ok(Self {
            host,
            port,
            authorization,
        })
    }
}

fn decode_userinfo(part: &str) -> Result<String, Error> {
    percent_decode_str(part)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(error::proxy)
}

/// Asks the proxy on `stream` to open a tunnel to `host:port`.
///
/// On success the stream carries raw bytes to the target.
pub(crate) async fn tunnel<S>(
    stream: &mut S,
    host: &str,
    port: u16,
    authorization: Option<&HeaderValue>,
) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut request =
        format!("CONNECT {host}:{port} HTTP/1.1\r\nHost: {host}:{port}\r\n").into_bytes();
    if let Some(authorization) = authorization {
        request.extend_from_slice(b"Proxy-Authorization: ");
        request.extend_from_slice(authorization.as_bytes());
        request.extend_from_slice(b"\r\n");
    }
    request.extend_from_slice(b"\r\n");

    stream.write_all(&request).await.map_err(error::proxy)?;

    let mut response = Vec::with_capacity(256);
    let mut chunk = [0u8; 512];
    loop {
        let n = stream.read(&mut chunk).await.map_err(error::proxy)?;
        if n == 0 {
            return Err(error::proxy(ProxyError::UnexpectedEof));
        }
        response.extend_from_slice(&chunk[..n]);
        if response.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if response.len() > MAX_CONNECT_RESPONSE {
            return Err(error::proxy(ProxyError::ResponseTooLarge));
        }
    }

    let status_line = response
        .split(|&b| b == b'\n')
        .next()
        .map(|line| String::from_utf8_lossy(line).trim().to_owned())
        .unwrap_or_default();

    if status_line.starts_with("HTTP/1.1 200") || status_line.starts_with("HTTP/1.0 200") {
        tracing::debug!("proxy tunnel to {host}:{port} established");
        Ok(())
    } else {
        Err(error::proxy(ProxyError::Refused(status_line)))
    }
}
