//! rustls client configuration.

use std::sync::Arc;

use rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;

use crate::config::TransportConfig;
use crate::error::{self, Error};

const ALPN_H2: &[u8] = b"h2";
const ALPN_HTTP11: &[u8] = b"http/1.1";

/// Builds the connector shared by every TLS connection of a client.
pub(crate) fn connector(config: &TransportConfig) -> Result<TlsConnector, Error> {
    let roots = root_store(config.use_native_certs);

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut client_config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(error::tls)?
        .with_root_certificates(roots)
        .with_no_client_auth();

    client_config.alpn_protocols = if config.http2 {
        vec![ALPN_H2.to_vec(), ALPN_HTTP11.to_vec()]
    } else {
        vec![ALPN_HTTP11.to_vec()]
    };

    Ok(TlsConnector::from(Arc::new(client_config)))
}

fn root_store(use_native_certs: bool) -> RootCertStore {
    let mut roots = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    if use_native_certs {
        let loaded = rustls_native_certs::load_native_certs();
        for err in &loaded.errors {
            tracing::warn!("native certificate load error: {err}");
        }
        let (added, ignored) = roots.add_parsable_certificates(loaded.certs);
        tracing::debug!(added, ignored, "loaded native certificates");
    }

    roots
}

/// Whether the peer selected HTTP/2 during the handshake.
pub(crate) fn negotiated_h2(alpn: Option<&[u8]>) -> bool {
    alpn == Some(ALPN_H2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_roots_are_loaded() {
        assert!(!root_store(false).is_empty());
    }

    #[test]
    fn builds_with_and_without_h2() {
        let http1 = TransportConfig::default();
        assert!(connector(&http1).is_ok());

        let http2 = TransportConfig::default().with_http2(true);
        assert!(connector(&http2).is_ok());
    }

    #[test]
    fn only_h2_counts_as_h2() {
        assert!(negotiated_h2(Some(b"h2")));
        assert!(!negotiated_h2(Some(b"http/1.1")));
        assert!(!negotiated_h2(None));
    }
}
