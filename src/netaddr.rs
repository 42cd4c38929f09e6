use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};
use std::net::Ipv4Addr;

use super::errors::{Result, WireError};

/// Encoded size without the leading timestamp field
pub const ENCODED_LEN: usize = 26;

/// Encoded size with the leading timestamp field
pub const ENCODED_LEN_WITH_TS: usize = 30;

/// The fixed IPv6 padding of an IPv4-mapped address
const IPV4_MAPPED_PREFIX: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff];

/// NetAddr represents a network endpoint as carried inside protocol
/// payloads: a services bitfield, an IPv4 address and a port, plus an
/// optional last-seen timestamp.
///
/// The address is written as an IPv4-mapped IPv6 address in network byte
/// order. The timestamp is present in `addr` payload entries (30-byte
/// form) and absent in `version` payload addresses (26-byte form).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetAddr {
    pub services: u64,
    pub ip: Ipv4Addr,
    pub port: u16,
    pub timestamp: Option<u32>,
}

impl NetAddr {
    pub fn new(services: u64, ip: Ipv4Addr, port: u16, timestamp: Option<u32>) -> Self {
        Self {
            services,
            ip,
            port,
            timestamp,
        }
    }

    /// without_timestamp returns a copy with the timestamp cleared
    pub fn without_timestamp(&self) -> Self {
        Self {
            timestamp: None,
            ..*self
        }
    }

    /// to_bytes encodes the address; a missing timestamp encodes as 0
    /// when the 30-byte form is requested
    pub fn to_bytes(&self, with_timestamp: bool) -> Result<Vec<u8>> {
        let mut buffer = Vec::with_capacity(if with_timestamp {
            ENCODED_LEN_WITH_TS
        } else {
            ENCODED_LEN
        });

        if with_timestamp {
            buffer.write_u32::<LittleEndian>(self.timestamp.unwrap_or(0))?;
        }

        buffer.write_u64::<LittleEndian>(self.services)?;
        buffer.write_all(&IPV4_MAPPED_PREFIX)?;
        buffer.write_all(&self.ip.octets())?;
        buffer.write_u16::<BigEndian>(self.port)?;

        Ok(buffer)
    }

    /// from_bytes decodes a standalone address buffer, inferring the
    /// presence of the timestamp from the total length
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match bytes.len() {
            ENCODED_LEN => Self::decode_without_timestamp(bytes),
            ENCODED_LEN_WITH_TS => Self::decode_with_timestamp(bytes),
            n => Err(WireError::InvalidLength(n)),
        }
    }

    /// decode_with_timestamp reads the 30-byte form from the start of `bytes`
    pub fn decode_with_timestamp(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ENCODED_LEN_WITH_TS {
            return Err(WireError::TruncatedInput);
        }

        let timestamp = (&bytes[..4]).read_u32::<LittleEndian>()?;
        let mut addr = Self::decode_without_timestamp(&bytes[4..])?;
        addr.timestamp = Some(timestamp);

        Ok(addr)
    }

    /// decode_without_timestamp reads the 26-byte form from the start of `bytes`
    pub fn decode_without_timestamp(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < ENCODED_LEN {
            return Err(WireError::TruncatedInput);
        }

        let mut cursor = bytes;
        let services = cursor.read_u64::<LittleEndian>()?;

        // IPv6 padding, only IPv4-mapped addresses are supported
        let mut prefix = [0u8; 12];
        cursor.read_exact(&mut prefix)?;

        let mut octets = [0u8; 4];
        cursor.read_exact(&mut octets)?;
        let port = cursor.read_u16::<BigEndian>()?;

        Ok(Self {
            services,
            ip: Ipv4Addr::from(octets),
            port,
            timestamp: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NetAddr {
        NetAddr::new(0x0401, Ipv4Addr::new(8, 8, 8, 8), 8333, Some(1500000000))
    }

    #[test]
    fn test_round_trip_with_timestamp() {
        let addr = sample();
        let bytes = addr.to_bytes(true).unwrap();

        assert_eq!(bytes.len(), ENCODED_LEN_WITH_TS);
        assert_eq!(NetAddr::from_bytes(&bytes).unwrap(), addr);
    }

    #[test]
    fn test_round_trip_without_timestamp() {
        let addr = sample();
        let bytes = addr.to_bytes(false).unwrap();

        assert_eq!(bytes.len(), ENCODED_LEN);
        assert_eq!(NetAddr::from_bytes(&bytes).unwrap(), addr.without_timestamp());
    }

    #[test]
    fn test_layout() {
        let addr = NetAddr::new(1, Ipv4Addr::new(127, 0, 0, 1), 8333, None);
        let bytes = addr.to_bytes(false).unwrap();

        // services, little-endian
        assert_eq!(&bytes[..8], &[1, 0, 0, 0, 0, 0, 0, 0]);
        // IPv4-mapped padding
        assert_eq!(&bytes[8..20], &IPV4_MAPPED_PREFIX);
        // address and port, network byte order
        assert_eq!(&bytes[20..24], &[127, 0, 0, 1]);
        assert_eq!(&bytes[24..26], &8333u16.to_be_bytes());
    }

    #[test]
    fn test_missing_timestamp_encodes_as_zero() {
        let addr = NetAddr::new(0, Ipv4Addr::LOCALHOST, 0, None);
        let bytes = addr.to_bytes(true).unwrap();

        assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
        assert_eq!(NetAddr::from_bytes(&bytes).unwrap().timestamp, Some(0));
    }

    #[test]
    fn test_invalid_length() {
        assert!(matches!(
            NetAddr::from_bytes(&[0u8; 27]),
            Err(WireError::InvalidLength(27))
        ));
        assert!(matches!(
            NetAddr::from_bytes(&[]),
            Err(WireError::InvalidLength(0))
        ));
    }

    #[test]
    fn test_explicit_decoders() {
        let addr = sample();

        let with_ts = addr.to_bytes(true).unwrap();
        assert_eq!(NetAddr::decode_with_timestamp(&with_ts).unwrap(), addr);

        let without_ts = addr.to_bytes(false).unwrap();
        assert_eq!(
            NetAddr::decode_without_timestamp(&without_ts).unwrap(),
            addr.without_timestamp()
        );

        assert!(NetAddr::decode_with_timestamp(&without_ts).is_err());
    }
}
