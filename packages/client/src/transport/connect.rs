//! The connector handed to the hyper-util client.
//!
//! TCP comes from `HttpConnector`; this layer adds the proxy hop, the
//! `CONNECT` tunnel for HTTPS targets and the rustls handshake, and reports
//! what was negotiated so the client picks HTTP/2 and the request form.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use http::Uri;
use http::uri::Scheme;
use hyper::rt::{Read, ReadBufCursor, Write};
use hyper_util::client::legacy::connect::{Connected, Connection, HttpConnector};
use hyper_util::rt::TokioIo;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tower_service::Service;

use super::proxy::{self, Proxy};
use super::tls;
use crate::error::{self, Error};

/// A connection that may or may not be wrapped in TLS.
#[derive(Debug)]
pub(crate) enum MaybeTls {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

/// An established connection and what was negotiated on it.
#[derive(Debug)]
pub(crate) struct Conn {
    io: TokioIo<MaybeTls>,
    h2: bool,
    /// The peer is a forwarding proxy, requests go out in absolute form.
    proxied: bool,
}

#[derive(Clone)]
pub(crate) struct Connector {
    http: HttpConnector,
    tls: TlsConnector,
    proxy: Option<Arc<Proxy>>,
}

impl Connector {
    pub(crate) fn new(tls: TlsConnector, proxy: Option<Proxy>, connect_timeout: Duration) -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_nodelay(true);
        http.set_connect_timeout(Some(connect_timeout));
        Self {
            http,
            tls,
            proxy: proxy.map(Arc::new),
        }
    }

    pub(crate) async fn connect(mut self, dst: Uri) -> Result<Conn, Error> {
        let host = dst
            .host()
            .ok_or_else(|| error::invalid_uri(&dst.to_string(), "missing host"))?
            .to_owned();
        let https = dst.scheme() == Some(&Scheme::HTTPS);
        let port = dst.port_u16().unwrap_or(if https { 443 } else { 80 });

        let mut tcp = match self.proxy.clone() {
            Some(proxy) => {
                let proxy_uri = format!("http://{}:{}", proxy.host, proxy.port)
                    .parse::<Uri>()
                    .map_err(error::proxy)?;
                self.tcp(proxy_uri).await.map_err(error::proxy)?
            }
            None => self.tcp(dst).await.map_err(error::connect)?,
        };

        if !https {
            return Ok(Conn {
                io: TokioIo::new(MaybeTls::Plain(tcp)),
                h2: false,
                proxied: self.proxy.is_some(),
            });
        }

        if let Some(proxy) = &self.proxy {
            proxy::tunnel(&mut tcp, &host, port, proxy.authorization.as_ref()).await?;
        }

        let server_name =
            ServerName::try_from(unbracket(&host).to_owned()).map_err(error::tls)?;
        let stream = self
            .tls
            .connect(server_name, tcp)
            .await
            .map_err(error::tls)?;
        let h2 = tls::negotiated_h2(stream.get_ref().1.alpn_protocol());
        tracing::debug!(host, port, h2, "tls connection established");

        Ok(Conn {
            io: TokioIo::new(MaybeTls::Tls(Box::new(stream))),
            h2,
            proxied: false,
        })
    }

    async fn tcp(&mut self, uri: Uri) -> Result<TcpStream, BoxError> {
        let io = self.http.call(uri).await?;
        Ok(io.into_inner())
    }
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

impl Service<Uri> for Connector {
    type Response = Conn;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Conn, Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, dst: Uri) -> Self::Future {
        Box::pin(self.clone().connect(dst))
    }
}

/// IPv6 literals come bracketed out of `Uri::host`.
fn unbracket(host: &str) -> &str {
    host.strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host)
}

impl Connection for Conn {
    fn connected(&self) -> Connected {
        let connected = Connected::new().proxy(self.proxied);
        if self.h2 {
            connected.negotiated_h2()
        } else {
            connected
        }
    }
}

impl Read for Conn {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: ReadBufCursor<'_>,
    ) -> Poll<io::Result<()>> {
        Read::poll_read(Pin::new(&mut self.get_mut().io), cx, buf)
    }
}

impl Write for Conn {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Write::poll_write(Pin::new(&mut self.get_mut().io), cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Write::poll_flush(Pin::new(&mut self.get_mut().io), cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Write::poll_shutdown(Pin::new(&mut self.get_mut().io), cx)
    }

    fn is_write_vectored(&self) -> bool {
        Write::is_write_vectored(&self.io)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Write::poll_write_vectored(Pin::new(&mut self.get_mut().io), cx, bufs)
    }
}

impl AsyncRead for MaybeTls {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTls::Plain(s) => Pin::new(s).poll_read(cx, buf),
            MaybeTls::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for MaybeTls {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            MaybeTls::Plain(s) => Pin::new(s).poll_write(cx, buf),
            MaybeTls::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTls::Plain(s) => Pin::new(s).poll_flush(cx),
            MaybeTls::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            MaybeTls::Plain(s) => Pin::new(s).poll_shutdown(cx),
            MaybeTls::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportConfig;
    use crate::error::Kind;

    fn connector(proxy: Option<Proxy>) -> Connector {
        let tls = tls::connector(&TransportConfig::default()).expect("tls config");
        Connector::new(tls, proxy, Duration::from_secs(2))
    }

    async fn closed_port() -> std::net::SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        listener.local_addr().expect("addr")
    }

    #[test]
    fn strips_ipv6_brackets() {
        assert_eq!(unbracket("[::1]"), "::1");
        assert_eq!(unbracket("example.com"), "example.com");
    }

    #[tokio::test]
    async fn plain_connection_to_local_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let uri: Uri = format!("http://{addr}/").parse().expect("uri");

        let conn = connector(None).connect(uri).await.expect("connected");
        let connected = conn.connected();
        assert!(!connected.is_negotiated_h2());
        assert!(!connected.is_proxied());
    }

    #[tokio::test]
    async fn plain_target_through_proxy_is_marked_proxied() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        let proxy = Proxy::parse(&format!("http://{addr}")).expect("proxy");
        let uri: Uri = "http://upstream.invalid/".parse().expect("uri");

        let conn = connector(Some(proxy)).connect(uri).await.expect("connected");
        assert!(conn.connected().is_proxied());
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        let addr = closed_port().await;
        let uri: Uri = format!("http://{addr}/").parse().expect("uri");
        let err = connector(None).connect(uri).await.expect_err("refused");
        assert_eq!(err.kind(), Kind::Connect);
    }

    #[tokio::test]
    async fn unreachable_proxy_is_a_proxy_error() {
        let addr = closed_port().await;
        let proxy = Proxy::parse(&format!("http://{addr}")).expect("proxy");
        let uri: Uri = "http://example.com/".parse().expect("uri");
        let err = connector(Some(proxy)).connect(uri).await.expect_err("refused");
        assert_eq!(err.kind(), Kind::Proxy);
    }
}
