use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::{io::Write, time::SystemTime};

use super::{
    command::Command,
    errors::{Result, WireError},
    netaddr::{self, NetAddr},
    network::NetworkConfig,
    varint::VarInt,
    varstr::VarStr,
};

/// Most entries an encoded `addr` payload may carry.
/// Protocol-level anti-abuse cap, not an implementation limit.
pub const MAX_ADDR_COUNT: usize = 2500;

/// Minimum encoded size of a version payload (empty user agent)
const VERSION_MIN_LEN: usize = 4 + 8 + 8 + 2 * netaddr::ENCODED_LEN + 8 + 1 + 4 + 1;

/// Payload represents the payload of a message
/// The inner type encapsulates all the different payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Version(VersionPayload),
    Verack,
    Addr(Vec<NetAddr>),
    /// Raw bytes of a payload whose command has no registered codec
    Unknown(Vec<u8>),
}

impl Payload {
    /// to_bytes converts the payload to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Payload::Version(version_payload) => version_payload.to_bytes(),
            // verack never carries data
            Payload::Verack => Ok(vec![]),
            Payload::Addr(addr_list) => encode_addr_list(addr_list),
            Payload::Unknown(raw) => Ok(raw.clone()),
        }
    }

    /// from_bytes converts bytes to a payload
    /// the command is needed to determine the payload type
    pub fn from_bytes(command: &Command, bytes: &[u8]) -> Result<Self> {
        match command {
            Command::Version => Ok(Payload::Version(VersionPayload::from_bytes(bytes)?)),
            // whatever a verack carries is discarded
            Command::Verack => Ok(Payload::Verack),
            Command::Addr => Ok(Payload::Addr(decode_addr_list(bytes)?)),
            Command::Unknown(_) => Ok(Payload::Unknown(bytes.to_vec())),
        }
    }
}

/// Entries are sorted most-recently-seen first and capped at
/// [`MAX_ADDR_COUNT`] before the count prefix is written.
fn encode_addr_list(addr_list: &[NetAddr]) -> Result<Vec<u8>> {
    let mut entries = addr_list.to_vec();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(MAX_ADDR_COUNT);

    let mut buffer = VarInt(entries.len() as u64).to_bytes();
    for addr in &entries {
        buffer.extend(addr.to_bytes(true)?);
    }

    Ok(buffer)
}

fn decode_addr_list(bytes: &[u8]) -> Result<Vec<NetAddr>> {
    let (count, prefix) = VarInt::from_bytes(bytes)?;

    let mut addr_list = Vec::with_capacity(count.min(MAX_ADDR_COUNT as u64) as usize);
    let mut offset = prefix;

    for _ in 0..count {
        let end = offset + netaddr::ENCODED_LEN_WITH_TS;
        let entry = bytes.get(offset..end).ok_or(WireError::TruncatedInput)?;
        addr_list.push(NetAddr::decode_with_timestamp(entry)?);
        offset = end;
    }

    Ok(addr_list)
}

/// ServiceFlags represents the service flags of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceFlags(u64);

impl ServiceFlags {
    /// This node is not a full node. It may not be able to provide any data except for the transactions it originates.
    pub const UNNAMED: ServiceFlags = ServiceFlags(0);

    /// This is a full node and can be asked for full blocks.
    pub const NODE_NETWORK: ServiceFlags = ServiceFlags(0x1);

    /// This is a full node capable of responding to the getutxo protocol request.
    pub const NODE_GETUTXO: ServiceFlags = ServiceFlags(0x2);

    /// This is a full node capable and willing to handle bloom-filtered connections.
    pub const NODE_BLOOM: ServiceFlags = ServiceFlags(0x4);

    /// This is a full node that can be asked for blocks and transactions including witness data.
    pub const NODE_WITNESS: ServiceFlags = ServiceFlags(0x8);

    /// This is the same as NODE_NETWORK but the node has at least the last 288 blocks.
    pub const NODE_NETWORK_LIMITED: ServiceFlags = ServiceFlags(0x0400);

    /// Gets the integer representation of this ServiceFlags
    pub fn to_u64(self) -> u64 {
        self.0
    }

    /// Gets the ServiceFlags from an integer representation
    pub fn from_u64(n: u64) -> Self {
        ServiceFlags(n)
    }
}

impl From<u64> for ServiceFlags {
    fn from(n: u64) -> Self {
        ServiceFlags(n)
    }
}

/// VersionPayload represents the payload of a version message, the
/// greeting a node sends when opening a connection.
///
/// The two embedded addresses are always encoded in the 26-byte form:
/// address age does not apply inside the handshake, so any timestamp
/// they carry is cleared before encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPayload {
    /// The highest protocol version understood by the transmitting node.
    pub version: u32,

    /// The services supported by the transmitting node encoded as a bitfield.
    pub services: u64,

    /// The current Unix epoch time according to the transmitting node's clock.
    pub timestamp: i64,

    /// The endpoint of the receiving node as perceived by the transmitting node.
    pub addr_recv: NetAddr,

    /// The endpoint of the transmitting node.
    pub addr_from: NetAddr,

    /// A random nonce which can help a node detect a connection to itself.
    pub nonce: u64,

    /// User agent string, e.g. `/coinwire:0.1.0/`.
    pub user_agent: String,

    /// The height of the transmitting node's best block chain.
    pub start_height: i32,

    /// Transaction relay flag as described by BIP37.
    pub relay: bool,
}

impl VersionPayload {
    /// build assembles a version payload with the protocol version taken
    /// from the config, the current time and this crate's user agent
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        config: &NetworkConfig,
        services: ServiceFlags,
        addr_recv: NetAddr,
        addr_from: NetAddr,
        nonce: u64,
        start_height: i32,
        relay: bool,
    ) -> Payload {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .expect("get timestamp since unix epoch")
            .as_secs() as i64;

        const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
        const CARGO_PKG_NAME: &str = env!("CARGO_PKG_NAME");

        let user_agent = format!("/{}:{}/", CARGO_PKG_NAME, CARGO_PKG_VERSION);

        Payload::Version(VersionPayload {
            version: config.protocol_version,
            services: services.to_u64(),
            timestamp,
            addr_recv,
            addr_from,
            nonce,
            user_agent,
            start_height,
            relay,
        })
    }

    /// to_bytes converts the payload to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer: Vec<u8> = vec![];
        buffer.write_u32::<LittleEndian>(self.version)?;
        buffer.write_u64::<LittleEndian>(self.services)?;
        buffer.write_i64::<LittleEndian>(self.timestamp)?;
        buffer.write_all(&self.addr_recv.to_bytes(false)?)?;
        buffer.write_all(&self.addr_from.to_bytes(false)?)?;
        buffer.write_u64::<LittleEndian>(self.nonce)?;
        buffer.write_all(&VarStr::from(self.user_agent.as_str()).to_bytes())?;
        buffer.write_i32::<LittleEndian>(self.start_height)?;
        buffer.write_u8(self.relay.into())?;
        Ok(buffer)
    }

    /// from_bytes converts bytes to a payload
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < VERSION_MIN_LEN {
            return Err(WireError::TruncatedInput);
        }

        let mut cursor = bytes;
        let version = cursor.read_u32::<LittleEndian>()?;
        let services = cursor.read_u64::<LittleEndian>()?;
        let timestamp = cursor.read_i64::<LittleEndian>()?;

        let addr_recv = NetAddr::decode_without_timestamp(cursor)?;
        cursor = &cursor[netaddr::ENCODED_LEN..];
        let addr_from = NetAddr::decode_without_timestamp(cursor)?;
        cursor = &cursor[netaddr::ENCODED_LEN..];

        let nonce = cursor.read_u64::<LittleEndian>()?;
        let (user_agent, consumed) = VarStr::from_bytes(cursor)?;
        cursor = &cursor[consumed..];

        let start_height = cursor.read_i32::<LittleEndian>()?;
        let relay = cursor.read_u8()? != 0x00;

        Ok(VersionPayload {
            version,
            services,
            timestamp,
            addr_recv,
            addr_from,
            nonce,
            user_agent,
            start_height,
            relay,
        })
    }
}
