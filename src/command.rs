use super::errors::Result;

/// Encoded command size inside the frame header
pub const ENCODED_LEN: usize = 12;

/// Command identifies which payload codec applies to a frame.
///
/// Unrecognized command names are carried in `Unknown` rather than
/// rejected, so a frame with an unregistered command still decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Version,
    Verack,
    Addr,
    Unknown(String),
}

impl Command {
    pub fn name(&self) -> &str {
        match self {
            Command::Version => "version",
            Command::Verack => "verack",
            Command::Addr => "addr",
            Command::Unknown(name) => name,
        }
    }

    /// to_bytes produces the wire form: lowercase ASCII, null-padded
    /// and truncated to exactly 12 bytes
    pub fn to_bytes(&self) -> [u8; ENCODED_LEN] {
        let name = self.name().to_lowercase();
        let name = name.as_bytes();
        let len = name.len().min(ENCODED_LEN);

        let mut buffer = [0u8; ENCODED_LEN];
        buffer[..len].copy_from_slice(&name[..len]);
        buffer
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let name = String::from_utf8(bytes.to_vec())?.replace('\0', "");

        Ok(match name.as_str() {
            "version" => Self::Version,
            "verack" => Self::Verack,
            "addr" => Self::Addr,
            _ => Self::Unknown(name),
        })
    }
}
