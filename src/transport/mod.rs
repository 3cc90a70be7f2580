//! Datagram transports - UDP sockets and in-memory channels

pub mod channel;
pub mod udp;

pub use channel::{ChannelPeer, ChannelTransport};
pub use udp::UdpTransport;
