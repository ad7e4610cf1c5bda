//! Opening the socket.

#![allow(clippy::missing_errors_doc)]

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use super::config::{Config, Security};
use crate::{Error, Result};

trait Transport: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Transport for T {}

/// A connected socket, with or without TLS on top.
pub struct ImapStream {
    io: Box<dyn Transport>,
    encrypted: bool,
}

impl ImapStream {
    fn new(io: impl Transport + 'static, encrypted: bool) -> Self {
        Self {
            io: Box::new(io),
            encrypted,
        }
    }

    /// Whether traffic goes through TLS.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        self.encrypted
    }
}

impl fmt::Debug for ImapStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImapStream")
            .field("encrypted", &self.encrypted)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for ImapStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().io).poll_read(cx, buf)
    }
}

impl AsyncWrite for ImapStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().io).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().io).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().io).poll_shutdown(cx)
    }
}

/// TLS connector that trusts the Mozilla root set shipped in `webpki-roots`.
pub fn create_tls_connector() -> Result<TlsConnector> {
    let roots = rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls = rustls::ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(TlsConnector::from(Arc::new(tls)))
}

/// Connects to the configured server. The TCP connect and TLS handshake
/// together must finish within `config.connect_timeout`.
pub async fn connect(config: &Config) -> Result<ImapStream> {
    debug!(host = %config.host, port = config.port, security = ?config.security, "connecting");
    match tokio::time::timeout(config.connect_timeout, open(config)).await {
        Ok(stream) => stream,
        Err(_) => Err(Error::Timeout(config.connect_timeout)),
    }
}

async fn open(config: &Config) -> Result<ImapStream> {
    let tcp = TcpStream::connect((config.host.as_str(), config.port)).await?;
    if config.security == Security::None {
        return Ok(ImapStream::new(tcp, false));
    }
    let name = ServerName::try_from(config.host.clone())?;
    let tls = create_tls_connector()?.connect(name, tcp).await?;
    Ok(ImapStream::new(tls, true))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    fn local(port: u16) -> Config {
        let mut config = Config::new("127.0.0.1").with_security(Security::None);
        config.port = port;
        config
    }

    #[test]
    fn test_tls_connector_builds() {
        assert!(create_tls_connector().is_ok());
    }

    #[tokio::test]
    async fn test_refused_connection_is_io_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(matches!(connect(&local(port)).await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_plain_connection() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = local(listener.local_addr().unwrap().port());

        let (stream, accepted) = tokio::join!(connect(&config), listener.accept());
        let stream = stream.unwrap();
        assert!(!stream.is_tls());
        assert!(format!("{stream:?}").contains("encrypted: false"));
        assert!(accepted.is_ok());
    }
}
