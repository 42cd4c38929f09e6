use super::errors::{Result, WireError};
use super::varint::VarInt;

/// VarStr is a UTF-8 string prefixed with its byte length as a [`VarInt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarStr(pub String);

impl VarStr {
    /// to_bytes encodes the length prefix followed by the UTF-8 content
    pub fn to_bytes(&self) -> Vec<u8> {
        let content = self.0.as_bytes();
        let mut buffer = VarInt(content.len() as u64).to_bytes();
        buffer.extend_from_slice(content);
        buffer
    }

    /// from_bytes decodes the string and reports how many bytes it
    /// consumed, prefix included
    pub fn from_bytes(bytes: &[u8]) -> Result<(String, usize)> {
        let (length, prefix) = VarInt::from_bytes(bytes)?;
        let end = prefix
            .checked_add(length as usize)
            .ok_or(WireError::TruncatedInput)?;

        let content = bytes.get(prefix..end).ok_or(WireError::TruncatedInput)?;
        let content = String::from_utf8(content.to_vec())?;

        Ok((content, end))
    }
}

impl From<&str> for VarStr {
    fn from(s: &str) -> Self {
        VarStr(s.to_string())
    }
}
