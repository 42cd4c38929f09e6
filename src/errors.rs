use thiserror::Error;

pub type Result<T> = std::result::Result<T, WireError>;

/// WireError represents a structural failure while encoding or decoding
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Input buffer shorter than the structure requires")]
    TruncatedInput,

    #[error("Invalid netaddr length: {0} (expected 26 or 30)")]
    InvalidLength(usize),

    #[error("Invalid UTF-8 content")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid payload size")]
    PayloadTooLarge,

    #[error("Invalid checksum")]
    InvalidChecksum,

    #[error("Failed to read or write buffer")]
    BufferIo(std::io::Error),
}

// Short reads are truncation, not I/O trouble; byteorder reports them
// as UnexpectedEof.
impl From<std::io::Error> for WireError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            WireError::TruncatedInput
        } else {
            WireError::BufferIo(err)
        }
    }
}
