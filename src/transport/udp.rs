//! UDP transport

use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::core::config::NetworkConfig;
use crate::core::{Error, Result, Transport};

/// Receives on a bound socket and sends every datagram to one fixed peer.
pub struct UdpTransport {
    socket: UdpSocket,
    dest: SocketAddr,
    recv_timeout: Duration,
    buf: Vec<u8>,
}

impl UdpTransport {
    pub async fn bind(
        listen_addr: &str,
        response_addr: &str,
        recv_timeout: Duration,
        max_datagram: usize,
    ) -> Result<Self> {
        let socket = UdpSocket::bind(listen_addr).await?;
        let dest = tokio::net::lookup_host(response_addr)
            .await?
            .next()
            .ok_or_else(|| Error::Transport(format!("cannot resolve {}", response_addr)))?;

        info!("UDP receiver listening on {}, replying to {}", socket.local_addr()?, dest);

        Ok(Self {
            socket,
            dest,
            recv_timeout,
            buf: vec![0u8; max_datagram],
        })
    }

    pub async fn from_config(config: &NetworkConfig) -> Result<Self> {
        Self::bind(
            &config.listen_addr(),
            &config.response_addr(),
            config.recv_timeout(),
            config.max_datagram,
        )
        .await
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        match tokio::time::timeout(self.recv_timeout, self.socket.recv_from(&mut self.buf)).await {
            Err(_) => Ok(None),
            Ok(Err(e)) => Err(e.into()),
            Ok(Ok((n, from))) => {
                if n == self.buf.len() {
                    warn!("datagram from {} filled the {}-byte buffer, may be truncated", from, n);
                }
                debug!("received {} bytes from {}", n, from);
                Ok(Some(self.buf[..n].to_vec()))
            }
        }
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let sent = self.socket.send_to(bytes, self.dest).await?;
        if sent != bytes.len() {
            return Err(Error::Transport(format!(
                "short send to {}: {} of {} bytes",
                self.dest,
                sent,
                bytes.len()
            )));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "udp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loopback_round_trip() {
        let exchange = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let exchange_addr = exchange.local_addr().unwrap();

        let mut transport = UdpTransport::bind(
            "127.0.0.1:0",
            &exchange_addr.to_string(),
            Duration::from_millis(500),
            1024,
        )
        .await
        .unwrap();
        let engine_addr = transport.local_addr().unwrap();

        exchange.send_to(b"35=0\x01", engine_addr).await.unwrap();
        let got = transport.recv().await.unwrap();
        assert_eq!(got.as_deref(), Some(&b"35=0\x01"[..]));

        transport.send(b"35=A\x01").await.unwrap();
        let mut buf = [0u8; 64];
        let (n, _) = exchange.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"35=A\x01");
    }

    #[tokio::test]
    async fn test_recv_times_out() {
        let mut transport = UdpTransport::bind(
            "127.0.0.1:0",
            "127.0.0.1:9",
            Duration::from_millis(20),
            1024,
        )
        .await
        .unwrap();
        assert!(transport.recv().await.unwrap().is_none());
    }
}
