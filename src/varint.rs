use super::errors::{Result, WireError};

/// VarInt is the variable length integer used throughout the protocol.
///
/// The marker byte selects the width of the rest of the encoding. The
/// boundary values themselves (0xfd, 0xffff, 0xffffffff) fall into the
/// next wider tier: the tier test is strictly less-than.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt(pub u64);

impl VarInt {
    /// to_bytes encodes the integer in its narrowest applicable tier
    pub fn to_bytes(&self) -> Vec<u8> {
        let n = self.0;
        let mut buffer = vec![];

        if n < 0xfd {
            buffer.push(n as u8);
        } else if n < 0xffff {
            buffer.push(0xfd);
            buffer.extend_from_slice(&(n as u16).to_le_bytes());
        } else if n < 0xffff_ffff {
            buffer.push(0xfe);
            buffer.extend_from_slice(&(n as u32).to_le_bytes());
        } else {
            buffer.push(0xff);
            buffer.extend_from_slice(&n.to_le_bytes());
        }

        buffer
    }

    /// from_bytes decodes the integer and reports how many bytes it consumed
    pub fn from_bytes(bytes: &[u8]) -> Result<(u64, usize)> {
        let marker = *bytes.first().ok_or(WireError::TruncatedInput)?;

        match marker {
            n if n < 0xfd => Ok((n as u64, 1)),
            0xfd => {
                let raw: [u8; 2] = bytes
                    .get(1..3)
                    .ok_or(WireError::TruncatedInput)?
                    .try_into()
                    .map_err(|_| WireError::TruncatedInput)?;
                Ok((u16::from_le_bytes(raw) as u64, 3))
            }
            0xfe => {
                let raw: [u8; 4] = bytes
                    .get(1..5)
                    .ok_or(WireError::TruncatedInput)?
                    .try_into()
                    .map_err(|_| WireError::TruncatedInput)?;
                Ok((u32::from_le_bytes(raw) as u64, 5))
            }
            _ => {
                let raw: [u8; 8] = bytes
                    .get(1..9)
                    .ok_or(WireError::TruncatedInput)?
                    .try_into()
                    .map_err(|_| WireError::TruncatedInput)?;
                Ok((u64::from_le_bytes(raw), 9))
            }
        }
    }
}

impl From<u64> for VarInt {
    fn from(n: u64) -> Self {
        VarInt(n)
    }
}
