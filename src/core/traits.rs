//! Core traits - seams to the outside world

use async_trait::async_trait;
use crate::core::Result;

/// Datagram transport collaborator.
///
/// The engine never opens or binds sockets itself; whoever builds the
/// transport owns that.
#[async_trait]
pub trait Transport: Send {
    /// Wait for the next datagram.
    ///
    /// Returns `Ok(None)` when the receive timeout elapses without data so
    /// the caller can check its shutdown token.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>>;

    /// Send one datagram to the configured destination.
    async fn send(&mut self, bytes: &[u8]) -> Result<()>;

    /// Transport name for logging
    fn name(&self) -> &str;
}
