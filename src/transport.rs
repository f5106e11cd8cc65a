use crate::config::TransportConfig;
use crate::error::DnsError;
use async_trait::async_trait;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::trace;

/// Carries one query to a nameserver and brings back its reply.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `query` to `server` and returns the first reply payload.
    async fn exchange(&self, server: Ipv4Addr, query: &[u8]) -> Result<Vec<u8>, DnsError>;
}

/// Plain DNS over UDP, one fresh socket per exchange.
#[derive(Debug, Clone, Default)]
pub struct UdpTransport {
    config: TransportConfig,
}

impl UdpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    async fn contact(&self, addr: SocketAddr, query: &[u8]) -> io::Result<Vec<u8>> {
        // Bind on a random available local port
        let sock = UdpSocket::bind("0.0.0.0:0").await?;
        sock.send_to(query, addr).await?;

        let mut buffer = vec![0u8; self.config.recv_buffer];
        let (size, from) = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, sock.recv_from(&mut buffer))
                .await
                .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "no reply before timeout"))??,
            None => sock.recv_from(&mut buffer).await?,
        };
        trace!(%from, size, "datagram received");

        // Return the portion of the buffer that contains the DNS response
        buffer.truncate(size);
        Ok(buffer)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn exchange(&self, server: Ipv4Addr, query: &[u8]) -> Result<Vec<u8>, DnsError> {
        let addr = SocketAddr::from((server, self.config.port));
        self.contact(addr, query)
            .await
            .map_err(|source| DnsError::Transport { server, source })
    }
}
