use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use sha2::{Digest, Sha256};
use std::io::Write;

use super::{
    command::{self, Command},
    encode::{Decodable, Encodable},
    errors::{Result, WireError},
    network::NetworkConfig,
    payload::Payload,
};

const START_STRING_SIZE: usize = 4;
const PAYLOAD_LEN_SIZE: usize = 4;
const CHECKSUM_SIZE: usize = 4;
const HEADER_SIZE: usize =
    START_STRING_SIZE + command::ENCODED_LEN + PAYLOAD_LEN_SIZE + CHECKSUM_SIZE;

// 32 MB
const MAX_PAYLOAD_SIZE: usize = 32 * 1024 * 1024;

const HEADER_START_STRING_RANGE: std::ops::Range<usize> = 0..4;
const HEADER_COMMAND_NAME_RANGE: std::ops::Range<usize> = 4..16;
const HEADER_PAYLOAD_LEN_RANGE: std::ops::Range<usize> = 16..20;
const HEADER_CHECKSUM_RANGE: std::ops::Range<usize> = 20..24;

/// Message is a complete frame: the 24-byte header and its payload.
///
/// Decoding parses the frame but deliberately does not check the
/// checksum; integrity is a separate, explicit step via
/// [`Message::verify_checksum`]. The exact payload bytes are kept
/// alongside the typed payload, so verification and re-encoding always
/// operate on what actually arrived on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub magic: u32,
    pub command: Command,
    pub payload: Payload,
    pub checksum: [u8; CHECKSUM_SIZE],
    payload_bytes: Vec<u8>,
}

impl Message {
    /// new builds an outbound message, stamping the config's magic and
    /// computing the payload checksum
    pub fn new(config: &NetworkConfig, command: Command, payload: Payload) -> Result<Self> {
        let payload_bytes = payload.to_bytes()?;
        let checksum = Message::checksum(&payload_bytes);

        Ok(Self {
            magic: config.magic,
            command,
            payload,
            checksum,
            payload_bytes,
        })
    }

    /// from_parts rebuilds a message from already-parsed fields, keeping
    /// the supplied checksum instead of recomputing it
    pub fn from_parts(
        magic: u32,
        command: Command,
        payload: Payload,
        checksum: [u8; CHECKSUM_SIZE],
    ) -> Result<Self> {
        let payload_bytes = payload.to_bytes()?;

        Ok(Self {
            magic,
            command,
            payload,
            checksum,
            payload_bytes,
        })
    }

    /// payload_bytes is the encoded payload: the wire slice for decoded
    /// messages, the canonical encoding for constructed ones
    pub fn payload_bytes(&self) -> &[u8] {
        &self.payload_bytes
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload_bytes = &self.payload_bytes;
        let mut buffer = Vec::with_capacity(HEADER_SIZE + payload_bytes.len());

        // start string char[4]
        buffer.write_u32::<LittleEndian>(self.magic)?;

        // command name char[12], lowercase and null-padded
        buffer.write_all(&self.command.to_bytes())?;

        // payload length uint32 (4 bytes)
        buffer.write_u32::<LittleEndian>(payload_bytes.len() as u32)?;

        // checksum char[4]
        buffer.extend(&self.checksum);

        // 24 bytes written so far

        // payload char[..] (variable length)
        buffer.extend(payload_bytes);

        Ok(buffer)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(WireError::TruncatedInput);
        }

        // start string char[4]
        let magic = (&bytes[HEADER_START_STRING_RANGE]).read_u32::<LittleEndian>()?;

        // command name char[12]
        let command = Command::from_bytes(&bytes[HEADER_COMMAND_NAME_RANGE])?;

        // payload length uint32 (4 bytes)
        let payload_len = (&bytes[HEADER_PAYLOAD_LEN_RANGE]).read_u32::<LittleEndian>()? as usize;
        if payload_len > MAX_PAYLOAD_SIZE {
            return Err(WireError::PayloadTooLarge);
        }

        // checksum char[4], carried as-is; see verify_checksum
        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(&bytes[HEADER_CHECKSUM_RANGE]);

        // payload char[..], exactly payload_len bytes
        let payload_bytes = bytes
            .get(HEADER_SIZE..HEADER_SIZE + payload_len)
            .ok_or(WireError::TruncatedInput)?;

        let payload = Payload::from_bytes(&command, payload_bytes)?;

        Ok(Self {
            magic,
            command,
            payload,
            checksum,
            payload_bytes: payload_bytes.to_vec(),
        })
    }

    /// verify_checksum recomputes the checksum over the payload bytes as
    /// they arrived (or were encoded) and compares it against the
    /// carried one
    pub fn verify_checksum(&self) -> Result<()> {
        if self.checksum != Message::checksum(&self.payload_bytes) {
            return Err(WireError::InvalidChecksum);
        }

        Ok(())
    }

    /// checksum is the first 4 bytes of sha256(sha256(data))
    pub fn checksum(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let hash = hasher.finalize();

        let mut hasher = Sha256::new();
        hasher.update(hash);
        let hash = hasher.finalize();

        let mut buffer = [0u8; CHECKSUM_SIZE];
        buffer.clone_from_slice(&hash[..CHECKSUM_SIZE]);

        buffer
    }
}

impl Encodable for Message {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        Message::to_bytes(self)
    }
}

impl Decodable for Message {
    fn from_bytes(bytes: &[u8]) -> Result<Self>
    where
        Self: Sized,
    {
        Message::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netaddr::NetAddr;
    use crate::network::Network;
    use crate::payload::VersionPayload;
    use crate::varint::VarInt;
    use std::net::Ipv4Addr;

    fn config() -> NetworkConfig {
        NetworkConfig::for_network(Network::MainNet)
    }

    fn sample_version_message() -> Message {
        let addr = NetAddr::new(1, Ipv4Addr::new(8, 8, 8, 8), 8333, None);
        let payload = Payload::Version(VersionPayload {
            version: 70001,
            services: 1,
            timestamp: 1700000000,
            addr_recv: addr,
            addr_from: addr,
            nonce: 42,
            user_agent: "/coinwire:0.1.0/".to_string(),
            start_height: 0,
            relay: true,
        });

        Message::new(&config(), Command::Version, payload).unwrap()
    }

    #[test]
    fn test_checksum_known_values() {
        assert_eq!(Message::checksum(b""), [0x5d, 0xf6, 0xe0, 0xe2]);
        assert_eq!(Message::checksum(b"sometests"), [0x5b, 0x2d, 0x71, 0xb1]);
    }

    #[test]
    fn test_round_trip() {
        let message = sample_version_message();
        let bytes = message.to_bytes().unwrap();

        let decoded = Message::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, message);
        decoded.verify_checksum().unwrap();
    }

    #[test]
    fn test_header_layout() {
        let message = Message::new(&config(), Command::Verack, Payload::Verack).unwrap();
        let bytes = message.to_bytes().unwrap();

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[HEADER_START_STRING_RANGE], &[0xf9, 0xbe, 0xb4, 0xd9]);
        assert_eq!(&bytes[HEADER_COMMAND_NAME_RANGE], b"verack\0\0\0\0\0\0");
        assert_eq!(&bytes[HEADER_PAYLOAD_LEN_RANGE], &[0, 0, 0, 0]);
        // checksum of the empty payload
        assert_eq!(&bytes[HEADER_CHECKSUM_RANGE], &[0x5d, 0xf6, 0xe0, 0xe2]);
    }

    #[test]
    fn test_command_case_folded_on_encode() {
        let message = Message::new(
            &config(),
            Command::Unknown("Version".to_string()),
            Payload::Unknown(vec![]),
        )
        .unwrap();

        let bytes = message.to_bytes().unwrap();
        let decoded = Message::from_bytes(&bytes).unwrap();

        assert_eq!(decoded.command.name(), "version");
        assert!(!decoded.command.name().contains('\0'));
        assert_eq!(decoded.command, Command::Version);
    }

    #[test]
    fn test_unknown_command_decodes() {
        let message = Message::new(
            &config(),
            Command::Unknown("getheaders".to_string()),
            Payload::Unknown(vec![0xaa, 0xbb]),
        )
        .unwrap();

        let decoded = Message::from_bytes(&message.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.command, Command::Unknown("getheaders".to_string()));
        assert_eq!(decoded.payload, Payload::Unknown(vec![0xaa, 0xbb]));
        decoded.verify_checksum().unwrap();
    }

    #[test]
    fn test_decode_does_not_verify_checksum() {
        let message = sample_version_message();
        let mut bytes = message.to_bytes().unwrap();

        // corrupt the checksum field only
        bytes[20] ^= 0xff;

        let decoded = Message::from_bytes(&bytes).unwrap();
        assert_eq!(decoded.payload, message.payload);
        assert!(matches!(
            decoded.verify_checksum(),
            Err(WireError::InvalidChecksum)
        ));
    }

    #[test]
    fn test_verify_checksum_uses_wire_bytes() {
        // addr entries in ascending-timestamp order, which the encoder
        // would never produce; the frame is still valid on the wire
        let addr = NetAddr::new(1, Ipv4Addr::new(10, 0, 0, 1), 8333, Some(100));
        let later = NetAddr::new(1, Ipv4Addr::new(10, 0, 0, 2), 8333, Some(200));

        let mut payload_bytes = VarInt(2).to_bytes();
        payload_bytes.extend(addr.to_bytes(true).unwrap());
        payload_bytes.extend(later.to_bytes(true).unwrap());

        let mut bytes = vec![];
        bytes.extend_from_slice(&config().magic.to_le_bytes());
        bytes.extend_from_slice(b"addr\0\0\0\0\0\0\0\0");
        bytes.extend_from_slice(&(payload_bytes.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&Message::checksum(&payload_bytes));
        bytes.extend_from_slice(&payload_bytes);

        let decoded = Message::from_bytes(&bytes).unwrap();
        decoded.verify_checksum().unwrap();

        assert_eq!(decoded.payload, Payload::Addr(vec![addr, later]));
        assert_eq!(decoded.payload_bytes(), payload_bytes.as_slice());
        // re-encoding reproduces the frame as received
        assert_eq!(decoded.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_checksum_override_survives_round_trip() {
        let message = sample_version_message();
        let rebuilt = Message::from_parts(
            message.magic,
            message.command.clone(),
            message.payload.clone(),
            [0xde, 0xad, 0xbe, 0xef],
        )
        .unwrap();

        let bytes = rebuilt.to_bytes().unwrap();
        assert_eq!(&bytes[HEADER_CHECKSUM_RANGE], &[0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn test_truncated_frames() {
        let message = sample_version_message();
        let bytes = message.to_bytes().unwrap();

        // shorter than the header
        assert!(matches!(
            Message::from_bytes(&bytes[..HEADER_SIZE - 1]),
            Err(WireError::TruncatedInput)
        ));

        // header present, payload shorter than the declared length
        assert!(matches!(
            Message::from_bytes(&bytes[..bytes.len() - 1]),
            Err(WireError::TruncatedInput)
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let message = sample_version_message();
        let mut bytes = message.to_bytes().unwrap();
        bytes.extend_from_slice(&[0u8; 16]);

        assert_eq!(Message::from_bytes(&bytes).unwrap(), message);
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let mut bytes = Message::new(&config(), Command::Verack, Payload::Verack)
            .unwrap()
            .to_bytes()
            .unwrap();
        bytes[HEADER_PAYLOAD_LEN_RANGE].copy_from_slice(&(u32::MAX).to_le_bytes());

        assert!(matches!(
            Message::from_bytes(&bytes),
            Err(WireError::PayloadTooLarge)
        ));
    }
}
