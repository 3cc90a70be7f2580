//! FIX tag/value wire format - message container, tag table and codec

pub mod codec;
pub mod message;
pub mod tags;

pub use codec::{decode, encode, SOH};
pub use message::Message;
pub use tags::MsgType;
