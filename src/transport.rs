//! Transport abstraction between the transfer engine and the network.
//!
//! Connections are produced by a factory handed to the manager at
//! construction, so tests can substitute in-memory pipes for real TCP
//! without touching the protocol code.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

/// A bidirectional byte stream to one master server.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T: AsyncRead + AsyncWrite + Unpin + Send> Transport for T {}

/// Produces one transport per transfer attempt.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn connect(&self, master: SocketAddr) -> std::io::Result<Box<dyn Transport>>;
}

/// Production factory: plain TCP. The socket family (IPv4/IPv6) follows
/// the resolved master address; nothing here assumes one family.
pub struct TcpTransportFactory {
    connect_timeout: Duration,
}

impl TcpTransportFactory {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl TransportFactory for TcpTransportFactory {
    async fn connect(&self, master: SocketAddr) -> std::io::Result<Box<dyn Transport>> {
        let stream = timeout(self.connect_timeout, TcpStream::connect(master))
            .await
            .map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out")
            })??;
        debug!("connected to master {}", master);
        Ok(Box::new(stream))
    }
}
