//! In-memory transport over flume channels.

use async_trait::async_trait;
use std::time::Duration;

use crate::core::{Error, Result, Transport};

pub struct ChannelTransport {
    inbound: flume::Receiver<Vec<u8>>,
    outbound: flume::Sender<Vec<u8>>,
    recv_timeout: Duration,
}

/// The far end of a [`ChannelTransport`].
pub struct ChannelPeer {
    pub to_engine: flume::Sender<Vec<u8>>,
    pub from_engine: flume::Receiver<Vec<u8>>,
}

impl ChannelTransport {
    pub fn new(
        inbound: flume::Receiver<Vec<u8>>,
        outbound: flume::Sender<Vec<u8>>,
        recv_timeout: Duration,
    ) -> Self {
        Self { inbound, outbound, recv_timeout }
    }

    /// Connected transport and peer with unbounded queues.
    pub fn pair(recv_timeout: Duration) -> (Self, ChannelPeer) {
        let (to_engine, inbound) = flume::unbounded();
        let (outbound, from_engine) = flume::unbounded();
        (Self::new(inbound, outbound, recv_timeout), ChannelPeer { to_engine, from_engine })
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        match tokio::time::timeout(self.recv_timeout, self.inbound.recv_async()).await {
            Err(_) => Ok(None),
            Ok(Ok(bytes)) => Ok(Some(bytes)),
            Ok(Err(_)) => Err(Error::Transport("inbound channel closed".to_string())),
        }
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.outbound
            .send(bytes.to_vec())
            .map_err(|_| Error::Transport("outbound channel closed".to_string()))
    }

    fn name(&self) -> &str {
        "channel"
    }
}
