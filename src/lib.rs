//! Wire-format codec for Bitcoin-style p2p greeting messages
//!
//! This crate encodes and decodes the message frame (magic, command,
//! payload length, checksum) and the payloads of the `version`, `verack`
//! and `addr` messages. It is a pure codec: no sockets, no handshake
//! state, just bytes in and typed values out.

mod command;
mod encode;
mod errors;
mod message;
mod netaddr;
mod network;
mod payload;
mod varint;
mod varstr;

pub use command::Command;
pub use encode::{decode, encode, Decodable, Encodable};
pub use errors::{Result, WireError};
pub use message::Message;
pub use netaddr::NetAddr;
pub use network::{Network, NetworkConfig};
pub use payload::{Payload, ServiceFlags, VersionPayload};
pub use varint::VarInt;
pub use varstr::VarStr;

/// Default protocol version advertised in `version` payloads.
pub const PROTOCOL_VERSION: u32 = 70001;
